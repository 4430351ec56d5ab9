use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use super::{pick_candidate, wants_all};
use crate::error::HubError;
use crate::kernel::context::{Candidate, ContextManager, ContextPayload, PendingAction};
use crate::kernel::dispatcher::{DomainHandler, HandlerResult};
use crate::kernel::intent::vocab::{is_power_verb, CONJUNCTION, LED_NOUNS, LIGHT_NOUNS};
use crate::kernel::intent::{Domain, IntentKind, IntentParser, IntentRecord, LightingIntent, Power};
use crate::kernel::normalize::{is_denial, normalize, normalize_name, tokens};
use crate::kernel::response::ResponseRecord;
use crate::logging::log_action;
use crate::services::hub::{DeviceApi, EntityState};

pub const ALL_LIGHTS_GROUP: &str = "light.all_light_entities";

/// Helper and strip entities that never count as "a light that is on".
pub const IGNORED_LIGHT_ENTITIES: &[&str] = &[
    ALL_LIGHTS_GROUP,
    "light.esp32banheiro_led_banheiro",
    "light.esp32banheiro_led_noturno",
    "light.esp32banheiro_luz_banheiro",
    "light.esp32banheiro_spot_box",
    "light.led_mesa_will",
    "light.esp32ledstrip_zona_bah",
    "light.esp32ledstrip_zona_pe_da_cama",
    "light.esp32ledstrip_zona_will",
    "light.esp32ledstrip_fita_led_quarto",
];

pub struct LightHandler {
    hub: Arc<dyn DeviceApi>,
    parser: IntentParser,
    multi_pause: Duration,
}

impl LightHandler {
    pub fn new(hub: Arc<dyn DeviceApi>, multi_pause: Duration) -> Self {
        Self { hub, parser: IntentParser::new(), multi_pause }
    }

    fn all_lights(&self) -> Result<Vec<EntityState>, HubError> {
        Ok(self
            .hub
            .get_all_states()?
            .into_iter()
            .filter(|e| e.entity_id.starts_with("light."))
            .collect())
    }

    /// Lights currently on, minus helpers and groups.
    pub fn lights_on(&self) -> Result<Vec<EntityState>, HubError> {
        Ok(self
            .all_lights()?
            .into_iter()
            .filter(|e| {
                e.state == "on" && !IGNORED_LIGHT_ENTITIES.contains(&e.entity_id.as_str()) && !e.is_group()
            })
            .collect())
    }

    pub fn find_entities(&self, search: &str) -> Result<Vec<String>, HubError> {
        let search = normalize_name(search);
        let matches: Vec<String> = self
            .all_lights()?
            .into_iter()
            .filter(|e| normalize_name(e.friendly_name()).contains(&search))
            .map(|e| e.entity_id)
            .collect();
        debug!("Search '{}': {} light(s) found", search, matches.len());
        Ok(matches)
    }

    fn switch(&self, power: Power, search: &str, from_multi: bool, context: &mut ContextManager) -> HandlerResult {
        if power == Power::Off && search == "luz" && !from_multi {
            return self.generic_off(context);
        }

        let entities = self.find_entities(search)?;
        if entities.is_empty() {
            warn!("Light not found: '{}'", search);
            return Ok(ResponseRecord::message("Não encontrei essa luz."));
        }

        self.hub.call_service("light", power.service(), json!({ "entity_id": entities }))?;
        log_action("light", power.service(), Some(search));

        let state = if power == Power::On { "ligada" } else { "desligada" };
        Ok(ResponseRecord::message(format!("{} {}.", search, state)).with_entities(entities))
    }

    /// "apagar luz" with nothing else: act directly when only one light is on,
    /// otherwise ask which one.
    fn generic_off(&self, context: &mut ContextManager) -> HandlerResult {
        let lights_on = self.lights_on()?;

        match lights_on.as_slice() {
            [] => Ok(ResponseRecord::message("Nenhuma luz está ligada.")),
            [only] => {
                self.hub.call_service("light", "turn_off", json!({ "entity_id": only.entity_id }))?;
                log_action("light", "turn_off", Some(&only.entity_id));
                Ok(ResponseRecord::message("Luz desligada.").with_entities([only.entity_id.clone()]))
            }
            many => {
                let candidates: Vec<Candidate> = many
                    .iter()
                    .map(|e| Candidate::new(&e.entity_id, display_name(&e.entity_id)))
                    .collect();
                info!("Multiple lights on: {} light(s)", candidates.len());

                let names = candidates.iter().map(|c| c.display_name.as_str()).collect::<Vec<_>>().join(", ");
                let ids = candidates.iter().map(|c| c.identifier.clone()).collect::<Vec<_>>();
                context.set(ContextPayload { domain: Domain::Lighting, action: PendingAction::TurnOff, candidates });

                Ok(ResponseRecord::message(format!("Mais de uma luz está ligada: {}. Qual luz?", names))
                    .with_entities(ids))
            }
        }
    }

    fn all(&self, power: Power) -> HandlerResult {
        self.hub.call_service("light", power.service(), json!({ "entity_id": ALL_LIGHTS_GROUP }))?;
        log_action("light", power.service(), Some(ALL_LIGHTS_GROUP));
        Ok(ResponseRecord::message("Comando executado para todas as luzes."))
    }

    /// Each clause is re-parsed on its own. A clause missing its verb or device
    /// noun borrows them from the clause before ("ligar luz sala e cozinha").
    /// A hub failure in one clause does not stop the others; the error only
    /// propagates when no clause went through.
    fn multi(&self, text: &str, context: &mut ContextManager) -> HandlerResult {
        let mut replies = Vec::new();
        let mut failures = Vec::new();
        let mut first_error: Option<HubError> = None;
        let mut succeeded = 0usize;
        let mut verb: Option<String> = None;
        let mut noun: Option<String> = None;

        for (i, clause) in split_clauses(text).into_iter().enumerate() {
            if i > 0 && !self.multi_pause.is_zero() {
                std::thread::sleep(self.multi_pause);
            }

            let mut words = clause;
            match words.iter().find(|w| is_power_verb(w)) {
                Some(v) => verb = Some(v.clone()),
                None => {
                    if let Some(v) = &verb {
                        words.insert(0, v.clone());
                    }
                }
            }
            match words.iter().find(|w| is_light_noun(w)) {
                Some(n) => noun = Some(n.clone()),
                None => {
                    if let Some(n) = &noun {
                        words.insert(1.min(words.len()), n.clone());
                    }
                }
            }

            let clause_text = words.join(" ");
            let outcome = match self.parser.parse(&clause_text).kind {
                IntentKind::Lighting(LightingIntent::Switch { power, search, .. }) => {
                    self.switch(power, &search, true, context)
                }
                IntentKind::Lighting(LightingIntent::All { power }) => self.all(power),
                _ => Ok(ResponseRecord::message(format!("Não entendi '{}'.", clause_text))),
            };

            // Earlier clauses may already have switched devices: report each one.
            match outcome {
                Ok(response) => {
                    succeeded += 1;
                    replies.push(response.message);
                }
                Err(err) => {
                    warn!("Clause '{}' failed: {}", clause_text, err);
                    replies.push(format!("Falha em '{}': não consegui falar com a central.", clause_text));
                    failures.push(json!({ "clause": clause_text, "error": err.to_string() }));
                    first_error.get_or_insert(err);
                }
            }
        }

        if replies.is_empty() {
            return Ok(ResponseRecord::message("Não entendi o comando."));
        }
        if let (0, Some(err)) = (succeeded, first_error) {
            return Err(err);
        }

        let response = ResponseRecord::message(replies.join(" | "));
        if failures.is_empty() {
            Ok(response)
        } else {
            Ok(response.with_debug(json!({ "errors": failures })))
        }
    }
}

impl DomainHandler for LightHandler {
    fn domain(&self) -> Domain {
        Domain::Lighting
    }

    fn handle(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult {
        info!("Processing light.{}", intent.tag());

        match &intent.kind {
            IntentKind::Lighting(LightingIntent::Switch { power, search, .. }) => {
                self.switch(*power, search, false, context)
            }
            IntentKind::Lighting(LightingIntent::All { power }) => self.all(*power),
            IntentKind::Lighting(LightingIntent::Multi { text }) => self.multi(text, context),
            _ => {
                warn!("Unknown intent for light domain: {}", intent.tag());
                Ok(ResponseRecord::message("Não entendi o comando."))
            }
        }
    }

    fn handle_confirmation(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult {
        let Some(payload) = context.take() else {
            return Ok(ResponseRecord::message("Não há nada para confirmar."));
        };
        if payload.domain != Domain::Lighting {
            return Ok(ResponseRecord::message("Confirmação inválida."));
        }
        if is_denial(&intent.raw_text) {
            return Ok(ResponseRecord::message("Ok, nenhuma luz foi alterada."));
        }

        let service = payload.action.service();
        let done = if payload.action == PendingAction::TurnOn { "ligada" } else { "desligada" };
        let reply = normalize(&intent.raw_text);

        if wants_all(&reply) {
            let ids: Vec<String> = payload.candidates.iter().map(|c| c.identifier.clone()).collect();
            self.hub.call_service("light", service, json!({ "entity_id": ids }))?;
            log_action("light", service, Some("all candidates"));
            return Ok(ResponseRecord::message(format!("Todas as luzes foram {}s.", done)).with_entities(ids));
        }

        match pick_candidate(&payload.candidates, &reply) {
            Some(candidate) => {
                self.hub.call_service("light", service, json!({ "entity_id": candidate.identifier }))?;
                log_action("light", service, Some(&candidate.identifier));
                Ok(ResponseRecord::message(format!("{} {}.", candidate.display_name, done))
                    .with_entities([candidate.identifier.clone()]))
            }
            None => Ok(ResponseRecord::message("Não encontrei essa luz.")),
        }
    }
}

fn display_name(entity_id: &str) -> String {
    entity_id.trim_start_matches("light.").replace('_', " ")
}

fn is_light_noun(word: &str) -> bool {
    LIGHT_NOUNS.contains(&word) || LED_NOUNS.contains(&word)
}

fn split_clauses(text: &str) -> Vec<Vec<String>> {
    tokens(text)
        .split(|w| w == CONJUNCTION)
        .filter(|clause| !clause.is_empty())
        .map(<[String]>::to_vec)
        .collect()
}
