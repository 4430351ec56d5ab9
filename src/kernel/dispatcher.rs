use std::collections::HashMap;

use serde_json::json;
use tracing::{error, info, warn};

use super::context::ContextManager;
use super::intent::{Domain, IntentRecord};
use super::response::ResponseRecord;
use crate::error::HubError;

pub type HandlerResult = Result<ResponseRecord, HubError>;

pub const FALLBACK_MESSAGE: &str = "Não entendi. Pode repetir?";
pub const DOWNSTREAM_MESSAGE: &str = "Não consegui falar com a central. Tente novamente.";

/// A device-control domain. Handlers that resolve a pending question must
/// clear the context themselves, whatever the outcome.
pub trait DomainHandler: Send {
    fn domain(&self) -> Domain;

    fn handle(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult;

    /// Called only while the context is valid and owned by this domain.
    fn handle_confirmation(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult {
        Ok(context.handle(intent))
    }
}

/// Routes parsed intents to domain handlers, giving a pending question first
/// claim on the utterance.
pub struct Dispatcher {
    handlers: HashMap<Domain, Box<dyn DomainHandler>>,
    context: ContextManager,
}

impl Dispatcher {
    pub fn new(context: ContextManager) -> Self {
        Self { handlers: HashMap::new(), context }
    }

    pub fn register(&mut self, handler: Box<dyn DomainHandler>) -> &mut Self {
        self.handlers.insert(handler.domain(), handler);
        self
    }

    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextManager {
        &mut self.context
    }

    pub fn dispatch(&mut self, intent: &IntentRecord) -> ResponseRecord {
        if let Some(pending) = self.context.pending().map(|p| p.domain) {
            match intent.claimed_domain() {
                // Unrelated command: leave the context to expire on its own.
                Some(incoming) if incoming != pending => {
                    info!("Active context: {} | '{}' is a fresh {} command", pending, intent.raw_text, incoming);
                }
                _ => {
                    info!("Active context: {} | Routing confirmation", pending);
                    return self.confirm(pending, intent);
                }
            }
        }

        if let Some(clarification) = intent.clarification() {
            return ResponseRecord::message(clarification);
        }

        let domain = intent.domain();
        info!("Dispatching: {}.{}", domain, intent.tag());
        match self.handlers.get(&domain) {
            Some(handler) => settle(handler.handle(intent, &mut self.context)),
            None => {
                warn!("Unknown domain: {}", domain);
                ResponseRecord::message(FALLBACK_MESSAGE)
            }
        }
    }

    fn confirm(&mut self, domain: Domain, intent: &IntentRecord) -> ResponseRecord {
        match self.handlers.get(&domain) {
            Some(handler) => settle(handler.handle_confirmation(intent, &mut self.context)),
            None => self.context.handle(intent),
        }
    }
}

/// A downstream failure is reported, never retried.
fn settle(result: HandlerResult) -> ResponseRecord {
    result.unwrap_or_else(|err| {
        error!("Downstream failure: {}", err);
        ResponseRecord::message(DOWNSTREAM_MESSAGE).with_debug(json!({ "error": err.to_string() }))
    })
}
