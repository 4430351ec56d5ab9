use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::HubError;
use crate::logging::log_api_call;

/// The three hub operations the domain handlers need.
pub trait DeviceApi: Send + Sync {
    fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<(), HubError>;

    /// `None` when the hub does not know the entity.
    fn get_state(&self, entity_id: &str) -> Result<Option<String>, HubError>;

    fn get_all_states(&self) -> Result<Vec<EntityState>, HubError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn friendly_name(&self) -> &str {
        self.attributes
            .get("friendly_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Hub groups list their members under an `entity_id` attribute.
    pub fn is_group(&self) -> bool {
        self.attributes.contains_key("entity_id")
    }
}

/// Blocking REST client for the hub. One attempt per call, fixed timeout.
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self, HubError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn check(url: &str, method: &str, response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, HubError> {
        let status = response.status();
        if status.is_success() {
            log_api_call(method, url, Some(status.as_u16()), None);
            Ok(response)
        } else {
            let err = HubError::Status { code: status.as_u16(), url: url.to_string() };
            log_api_call(method, url, None, Some(&err.to_string()));
            Err(err)
        }
    }

    fn send(&self, method: &str, url: &str, request: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, HubError> {
        match request.bearer_auth(&self.token).send() {
            Ok(response) => Self::check(url, method, response),
            Err(e) => {
                let err = HubError::from(e);
                log_api_call(method, url, None, Some(&err.to_string()));
                Err(err)
            }
        }
    }
}

impl DeviceApi for HubClient {
    fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<(), HubError> {
        let url = format!("{}/api/services/{}/{}", self.base_url, domain, service);
        debug!("Calling service: {}.{} | Data: {}", domain, service, data);
        self.send("POST", &url, self.client.post(&url).json(&data))?;
        Ok(())
    }

    fn get_state(&self, entity_id: &str) -> Result<Option<String>, HubError> {
        let url = format!("{}/api/states/{}", self.base_url, entity_id);
        match self.send("GET", &url, self.client.get(&url)) {
            Ok(response) => {
                let entity: EntityState = response.json()?;
                Ok(Some(entity.state))
            }
            Err(HubError::Status { code: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn get_all_states(&self) -> Result<Vec<EntityState>, HubError> {
        let url = format!("{}/api/states", self.base_url);
        let states: Vec<EntityState> = self.send("GET", &url, self.client.get(&url))?.json()?;
        debug!("Fetched {} states", states.len());
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_state_decodes_hub_shape() {
        let entity: EntityState = serde_json::from_value(json!({
            "entity_id": "light.sala",
            "state": "on",
            "attributes": { "friendly_name": "Luz Sala" },
            "last_changed": "2026-01-02T14:30:15+00:00"
        }))
        .unwrap();

        assert_eq!(entity.friendly_name(), "Luz Sala");
        assert!(!entity.is_group());
    }

    #[test]
    fn test_groups_are_recognized() {
        let entity: EntityState = serde_json::from_value(json!({
            "entity_id": "light.all_light_entities",
            "state": "on",
            "attributes": { "entity_id": ["light.sala", "light.quarto"] }
        }))
        .unwrap();

        assert!(entity.is_group());
        assert_eq!(entity.friendly_name(), "");
    }

    #[test]
    fn test_base_url_loses_trailing_slash() {
        let client = HubClient::new("http://hub.local:8123/", "token", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://hub.local:8123");
    }
}
