#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Map, Value};

use friday::error::HubError;
use friday::kernel::context::ContextManager;
use friday::kernel::dispatcher::Dispatcher;
use friday::kernel::intent::IntentParser;
use friday::kernel::time::ManualClock;
use friday::services::hub::{DeviceApi, EntityState};
use friday::domains::{ClimateHandler, LightHandler, SensorHandler};
use friday::Assistant;

/// One recorded `call_service`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: Value,
}

/// In-memory hub: a state table plus a log of every service call.
#[derive(Default)]
pub struct FakeHub {
    entities: Mutex<Vec<EntityState>>,
    calls: Mutex<Vec<ServiceCall>>,
    failing: Mutex<bool>,
    rejected: Mutex<Vec<String>>,
}

impl FakeHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_light(&self, entity_id: &str, friendly_name: &str, state: &str) -> &Self {
        let mut attributes = Map::new();
        attributes.insert("friendly_name".into(), json!(friendly_name));
        self.insert(EntityState { entity_id: entity_id.into(), state: state.into(), attributes });
        self
    }

    pub fn with_state(&self, entity_id: &str, state: &str) -> &Self {
        self.insert(EntityState { entity_id: entity_id.into(), state: state.into(), attributes: Map::new() });
        self
    }

    fn insert(&self, entity: EntityState) {
        let mut entities = self.entities.lock().unwrap();
        entities.retain(|e| e.entity_id != entity.entity_id);
        entities.push(entity);
    }

    /// Every later call fails as if the hub were unreachable.
    pub fn go_offline(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Service calls naming `entity_id` fail; everything else still works.
    pub fn reject_calls_for(&self, entity_id: &str) {
        self.rejected.lock().unwrap().push(entity_id.to_string());
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), HubError> {
        if *self.failing.lock().unwrap() {
            Err(HubError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl DeviceApi for FakeHub {
    fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<(), HubError> {
        self.check_online()?;
        let payload = data.to_string();
        if self.rejected.lock().unwrap().iter().any(|id| payload.contains(id.as_str())) {
            return Err(HubError::Status { code: 500, url: format!("/api/services/{}/{}", domain, service) });
        }
        self.calls.lock().unwrap().push(ServiceCall { domain: domain.into(), service: service.into(), data });
        Ok(())
    }

    fn get_state(&self, entity_id: &str) -> Result<Option<String>, HubError> {
        self.check_online()?;
        let entities = self.entities.lock().unwrap();
        Ok(entities.iter().find(|e| e.entity_id == entity_id).map(|e| e.state.clone()))
    }

    fn get_all_states(&self) -> Result<Vec<EntityState>, HubError> {
        self.check_online()?;
        Ok(self.entities.lock().unwrap().clone())
    }
}

/// Dispatcher with every domain registered against `hub`, on a manual clock.
pub fn dispatcher(hub: Arc<FakeHub>, clock: &ManualClock) -> Dispatcher {
    let context = ContextManager::new(Arc::new(clock.clone()), Duration::from_secs(10));
    let mut dispatcher = Dispatcher::new(context);
    dispatcher
        .register(Box::new(LightHandler::new(hub.clone(), Duration::ZERO)))
        .register(Box::new(ClimateHandler::new(hub.clone())))
        .register(Box::new(SensorHandler::new(hub)));
    dispatcher
}

pub fn assistant(hub: Arc<FakeHub>, clock: &ManualClock) -> Assistant {
    Assistant::new(IntentParser::new(), dispatcher(hub, clock))
}
