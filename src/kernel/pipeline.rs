use std::sync::Arc;

use serde::Serialize;

use super::context::ContextManager;
use super::dispatcher::Dispatcher;
use super::intent::IntentParser;
use super::response::ResponseRecord;
use super::time::SystemClock;
use crate::config::Config;
use crate::domains::{ClimateHandler, LightHandler, SensorHandler};
use crate::logging::{log_command, log_separator};
use crate::services::hub::DeviceApi;

/// What one utterance produced, as reported to front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub intent: &'static str,
    pub domain: &'static str,
    pub response: ResponseRecord,
}

/// Parser plus dispatcher: one utterance in, one response out. Owns the
/// single conversation context, so callers serialize access.
pub struct Assistant {
    parser: IntentParser,
    dispatcher: Dispatcher,
}

impl Assistant {
    pub fn new(parser: IntentParser, dispatcher: Dispatcher) -> Self {
        Self { parser, dispatcher }
    }

    /// Standard wiring: every domain handler against one hub.
    pub fn with_hub(config: &Config, hub: Arc<dyn DeviceApi>) -> Self {
        let context = ContextManager::new(Arc::new(SystemClock), config.context_ttl);
        let mut dispatcher = Dispatcher::new(context);
        dispatcher
            .register(Box::new(LightHandler::new(hub.clone(), config.multi_pause)))
            .register(Box::new(ClimateHandler::new(hub.clone())))
            .register(Box::new(SensorHandler::new(hub)));
        Self::new(IntentParser::new(), dispatcher)
    }

    pub fn process(&mut self, text: &str) -> CommandOutcome {
        log_separator();
        log_command(text);

        let intent = self.parser.parse(text);
        let response = self.dispatcher.dispatch(&intent);

        CommandOutcome {
            intent: intent.tag(),
            domain: intent.domain().as_str(),
            response,
        }
    }

    pub fn context(&self) -> &ContextManager {
        self.dispatcher.context()
    }
}
