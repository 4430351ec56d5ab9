use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::{pick_candidate, wants_all};
use crate::error::HubError;
use crate::kernel::context::{Candidate, ContextManager, ContextPayload, PendingAction};
use crate::kernel::dispatcher::{DomainHandler, HandlerResult};
use crate::kernel::intent::{ClimateIntent, Domain, IntentKind, IntentRecord, Power, Room};
use crate::kernel::normalize::{is_denial, normalize};
use crate::kernel::response::ResponseRecord;
use crate::logging::log_action;
use crate::services::hub::DeviceApi;

pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<i64> = 18..=26;
pub const SPEED_RANGE: std::ops::RangeInclusive<i64> = 1..=3;

const WHICH_ROOM: &str = "Qual cômodo? Quarto ou closet?";

/// Hub wiring of one air conditioner.
#[derive(Debug)]
pub struct ClimateDevice {
    pub room: Room,
    pub power_on: &'static str,
    pub power_off: &'static str,
    pub fan_on: Option<&'static str>,
    pub fan_off: Option<&'static str>,
    pub heater_on: Option<&'static str>,
    pub heater_off: Option<&'static str>,
    pub temperature: Option<&'static str>,
    pub fan_speed: Option<&'static str>,
    /// IR remote entity and command.
    pub display_off: Option<(&'static str, &'static str)>,
    /// Contact sensor that reads "on" while the unit runs.
    pub state: &'static str,
}

pub const CLIMATE_DEVICES: &[ClimateDevice] = &[
    ClimateDevice {
        room: Room::Bedroom,
        power_on: "script.gelar_ar_lg_quarto",
        power_off: "script.desligar_ar_lg_quarto",
        fan_on: Some("script.ventilar_ar_lg_quarto"),
        fan_off: Some("script.desligar_ar_lg_quarto"),
        heater_on: Some("script.quente_ar_lg_quarto"),
        heater_off: Some("script.desligar_ar_lg_quarto"),
        temperature: Some("input_number.temperature_quarto"),
        fan_speed: Some("input_number.fan_speed_quarto"),
        display_off: Some(("remote.broadlink_remote_bedroom", "DisplayOff")),
        state: "binary_sensor.ar_condicionado_quarto_contact",
    },
    ClimateDevice {
        room: Room::Closet,
        power_on: "script.gelar_ar_lg_closet",
        power_off: "script.desligar_ar_lg_closet",
        fan_on: Some("script.ventilar_ar_lg_closet"),
        fan_off: Some("script.desligar_ar_lg_closet"),
        heater_on: None,
        heater_off: None,
        temperature: Some("input_number.temperature_escritorio"),
        fan_speed: Some("input_number.fan_speed_escritorio"),
        display_off: None,
        state: "binary_sensor.sonoff_10017182d6",
    },
];

impl ClimateDevice {
    pub fn power_script(&self, power: Power) -> &'static str {
        match power {
            Power::On => self.power_on,
            Power::Off => self.power_off,
        }
    }
}

pub fn device(room: Room) -> Option<&'static ClimateDevice> {
    CLIMATE_DEVICES.iter().find(|d| d.room == room)
}

fn device_by_script(script: &str) -> Option<&'static ClimateDevice> {
    CLIMATE_DEVICES.iter().find(|d| d.power_on == script || d.power_off == script)
}

#[derive(Debug, Clone, Copy)]
enum Feature {
    Fan,
    Heater,
}

impl Feature {
    fn script(&self, device: &ClimateDevice, power: Power) -> Option<&'static str> {
        match (self, power) {
            (Feature::Fan, Power::On) => device.fan_on,
            (Feature::Fan, Power::Off) => device.fan_off,
            (Feature::Heater, Power::On) => device.heater_on,
            (Feature::Heater, Power::Off) => device.heater_off,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Feature::Fan => "Ventilador",
            Feature::Heater => "Aquecedor",
        }
    }

    fn tag(&self, power: Power) -> &'static str {
        match (self, power) {
            (Feature::Fan, Power::On) => "fan_on",
            (Feature::Fan, Power::Off) => "fan_off",
            (Feature::Heater, Power::On) => "heater_on",
            (Feature::Heater, Power::Off) => "heater_off",
        }
    }
}

pub struct ClimateHandler {
    hub: Arc<dyn DeviceApi>,
}

impl ClimateHandler {
    pub fn new(hub: Arc<dyn DeviceApi>) -> Self {
        Self { hub }
    }

    fn run_script(&self, script: &str) -> Result<(), HubError> {
        self.hub.call_service("script", script.trim_start_matches("script."), json!({}))
    }

    fn is_on(&self, device: &ClimateDevice) -> Result<bool, HubError> {
        Ok(self.hub.get_state(device.state)?.as_deref() == Some("on"))
    }

    fn switch(&self, power: Power, room: Option<Room>, context: &mut ContextManager) -> HandlerResult {
        let Some(room) = room else {
            return self.generic(power, context);
        };
        let Some(device) = device(room) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };

        let script = device.power_script(power);
        self.run_script(script)?;
        log_action("climate", power.service(), Some(room.as_str()));

        let state = if power == Power::On { "ligado" } else { "desligado" };
        Ok(ResponseRecord::message(format!("Ar do {} {}.", room.as_str(), state)).with_entities([script]))
    }

    /// No room named: act on the only unit that can change, or ask.
    fn generic(&self, power: Power, context: &mut ContextManager) -> HandlerResult {
        let mut eligible = Vec::new();
        for device in CLIMATE_DEVICES {
            if self.is_on(device)? == (power == Power::Off) {
                eligible.push(device);
            }
        }

        let action = match power {
            Power::On => PendingAction::TurnOn,
            Power::Off => PendingAction::TurnOff,
        };

        match eligible.as_slice() {
            [] if power == Power::Off => Ok(ResponseRecord::message("Nenhum ar-condicionado está ligado.")),
            [] => Ok(ResponseRecord::message("Todos os ar-condicionados já estão ligados.")),
            [only] => self.switch(power, Some(only.room), context),
            many => {
                let candidates: Vec<Candidate> = many
                    .iter()
                    .map(|d| Candidate::new(d.power_script(power), d.room.as_str()))
                    .collect();
                let names = candidates.iter().map(|c| c.display_name.as_str()).collect::<Vec<_>>().join(", ");
                info!("Multiple air conditioners eligible: {}", names);
                context.set(ContextPayload { domain: Domain::Climate, action, candidates });

                let message = match power {
                    Power::Off => format!("Mais de um ar está ligado: {}. Qual deles?", names),
                    Power::On => format!("Qual ar devo ligar: {}?", names),
                };
                Ok(ResponseRecord::message(message))
            }
        }
    }

    fn all(&self, power: Power) -> HandlerResult {
        let mut scripts = Vec::new();
        for device in CLIMATE_DEVICES {
            let script = device.power_script(power);
            self.run_script(script)?;
            log_action("climate", power.service(), Some(device.room.as_str()));
            scripts.push(script);
        }
        let state = if power == Power::On { "ligados" } else { "desligados" };
        Ok(ResponseRecord::message(format!("Todos os ar-condicionados foram {}.", state)).with_entities(scripts))
    }

    fn feature(&self, feature: Feature, power: Power, room: Option<Room>) -> HandlerResult {
        let Some(device) = room.and_then(device) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };
        let room = device.room.as_str();
        let Some(script) = feature.script(device, power) else {
            return Ok(ResponseRecord::message(format!("{} não disponível no {}.", feature.label(), room)));
        };

        self.run_script(script)?;
        log_action("climate", feature.tag(power), Some(room));
        let state = if power == Power::On { "ligado" } else { "desligado" };
        Ok(ResponseRecord::message(format!("{} do {} {}.", feature.label(), room, state)))
    }

    fn display_off(&self, room: Option<Room>) -> HandlerResult {
        let Some(device) = room.and_then(device) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };
        let room = device.room.as_str();
        let Some((remote, command)) = device.display_off else {
            return Ok(ResponseRecord::message(format!("Controle remoto não disponível no {}.", room)));
        };

        self.hub.call_service(
            "remote",
            "send_command",
            json!({ "entity_id": remote, "device": "SmartInverter", "command": command }),
        )?;
        log_action("climate", "display_off", Some(room));
        Ok(ResponseRecord::message(format!("Tela do ar do {} apagada.", room)))
    }

    fn set_temperature(&self, value: i64, room: Option<Room>) -> HandlerResult {
        let Some(device) = room.and_then(device) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };
        let room = device.room.as_str();
        if !TEMPERATURE_RANGE.contains(&value) {
            return Ok(ResponseRecord::message(format!(
                "Temperatura deve estar entre {} e {}°C. Você pediu {}°C.",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end(),
                value
            )));
        }
        let Some(entity) = device.temperature else {
            return Ok(ResponseRecord::message(format!("Controle de temperatura não disponível no {}.", room)));
        };

        self.hub.call_service("input_number", "set_value", json!({ "entity_id": entity, "value": value }))?;
        log_action("climate", &format!("temperature_{}", value), Some(room));
        Ok(ResponseRecord::message(format!("Temperatura do {} definida para {}°C.", room, value)))
    }

    fn set_speed(&self, value: i64, room: Option<Room>) -> HandlerResult {
        let Some(device) = room.and_then(device) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };
        let room = device.room.as_str();
        if !SPEED_RANGE.contains(&value) {
            return Ok(ResponseRecord::message(format!(
                "Velocidade deve estar entre {} e {}. Você pediu {}.",
                SPEED_RANGE.start(),
                SPEED_RANGE.end(),
                value
            )));
        }
        let Some(entity) = device.fan_speed else {
            return Ok(ResponseRecord::message(format!("Controle de velocidade não disponível no {}.", room)));
        };

        self.hub.call_service("input_number", "set_value", json!({ "entity_id": entity, "value": value }))?;
        log_action("climate", &format!("speed_{}", value), Some(room));
        Ok(ResponseRecord::message(format!("Velocidade do {} definida para {}.", room, value)))
    }

    /// Relative speed change, clamped to the unit's range.
    fn nudge_speed(&self, step: i64, room: Option<Room>) -> HandlerResult {
        let Some(device) = room.and_then(device) else {
            return Ok(ResponseRecord::message(WHICH_ROOM));
        };
        let room = device.room.as_str();
        let verb = if step > 0 { "aumentar" } else { "diminuir" };
        let Some(entity) = device.fan_speed else {
            return Ok(ResponseRecord::message(format!("Controle de velocidade não disponível no {}.", room)));
        };

        let current = self.hub.get_state(entity)?.and_then(|s| s.trim().parse::<f64>().ok());
        let Some(current) = current else {
            warn!("Unreadable fan speed for {}", entity);
            return Ok(ResponseRecord::message(format!("Não consegui {} a velocidade.", verb)));
        };

        let speed = (current as i64 + step).clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end());
        self.hub.call_service("input_number", "set_value", json!({ "entity_id": entity, "value": speed }))?;
        let (tag, done) = if step > 0 { ("increase_speed", "aumentada") } else { ("decrease_speed", "diminuída") };
        log_action("climate", tag, Some(room));
        Ok(ResponseRecord::message(format!("Velocidade do {} {} para {}.", room, done, speed)))
    }
}

impl DomainHandler for ClimateHandler {
    fn domain(&self) -> Domain {
        Domain::Climate
    }

    fn handle(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult {
        let IntentKind::Climate(climate) = &intent.kind else {
            warn!("Unknown intent for climate domain: {}", intent.tag());
            return Ok(ResponseRecord::message("Não entendi o comando de ar-condicionado."));
        };
        info!("Processing climate.{}", intent.tag());

        match climate {
            ClimateIntent::Switch { power, search, room } => {
                debug!("Climate search '{}' -> {:?}", search, room);
                self.switch(*power, *room, context)
            }
            ClimateIntent::All { power } => self.all(*power),
            ClimateIntent::Fan { power, room } => self.feature(Feature::Fan, *power, *room),
            ClimateIntent::Heater { power, room } => self.feature(Feature::Heater, *power, *room),
            ClimateIntent::DisplayOff { room } => self.display_off(*room),
            ClimateIntent::SetTemperature { value, room, .. } => self.set_temperature(*value, *room),
            ClimateIntent::SetSpeed { value, room } => self.set_speed(*value, *room),
            ClimateIntent::IncreaseSpeed { room } => self.nudge_speed(1, *room),
            ClimateIntent::DecreaseSpeed { room } => self.nudge_speed(-1, *room),
        }
    }

    fn handle_confirmation(&self, intent: &IntentRecord, context: &mut ContextManager) -> HandlerResult {
        let Some(payload) = context.take() else {
            return Ok(ResponseRecord::message("Não há nada para confirmar."));
        };
        if payload.domain != Domain::Climate {
            return Ok(ResponseRecord::message("Confirmação inválida."));
        }
        if is_denial(&intent.raw_text) {
            return Ok(ResponseRecord::message("Ok, nenhum ar foi alterado."));
        }

        let (verb, done, done_plural) = match payload.action {
            PendingAction::TurnOn => ("ligar", "ligado", "ligados"),
            PendingAction::TurnOff => ("desligar", "desligado", "desligados"),
        };
        let reply = normalize(&intent.raw_text);

        if wants_all(&reply) {
            for candidate in &payload.candidates {
                self.run_script(&candidate.identifier)?;
                log_action("climate", payload.action.service(), Some(&candidate.display_name));
            }
            return Ok(ResponseRecord::message(format!("Todos os ar-condicionados foram {}.", done_plural)));
        }

        match pick_candidate(&payload.candidates, &reply) {
            Some(candidate) => {
                self.run_script(&candidate.identifier)?;
                let room = device_by_script(&candidate.identifier)
                    .map(|d| d.room.as_str())
                    .unwrap_or(candidate.display_name.as_str());
                log_action("climate", payload.action.service(), Some(room));
                Ok(ResponseRecord::message(format!("Ar do {} {}.", room, done)))
            }
            None => Ok(ResponseRecord::message(format!("Não entendi qual ar {}.", verb))),
        }
    }
}
