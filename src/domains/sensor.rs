use std::sync::Arc;

use tracing::{info, warn};

use crate::kernel::context::ContextManager;
use crate::kernel::dispatcher::{DomainHandler, HandlerResult};
use crate::kernel::intent::{Domain, Extreme, IntentKind, IntentRecord, Room, SensorIntent, SensorKind, WindowState};
use crate::kernel::response::ResponseRecord;
use crate::services::hub::DeviceApi;

/// Rooms with climate sensors, in reporting order.
pub const CLIMATE_SENSORS: &[(Room, &str, &str)] = &[
    (Room::Outside, "sensor.sensor_temp_outside_temperature", "sensor.sensor_temp_outside_humidity"),
    (Room::Closet, "sensor.esp32relaysmesas_closet_room_temperature", "sensor.esp32relaysmesas_closet_room_humidity"),
    (Room::Bedroom, "sensor.sensor_temp_quarto_temperature", "sensor.sensor_temp_quarto_humidity"),
];

/// Window contacts read "on" while open.
pub const WINDOW_SENSORS: &[(Room, &str)] = &[
    (Room::Closet, "binary_sensor.janela_closet_contact"),
    (Room::Bedroom, "binary_sensor.janela_quarto_contact"),
    (Room::Bathroom, "binary_sensor.sonoff_1001879d3a"),
];

pub fn sensor_entity(kind: SensorKind, room: Room) -> Option<&'static str> {
    CLIMATE_SENSORS
        .iter()
        .find(|(r, _, _)| *r == room)
        .map(|(_, temperature, humidity)| match kind {
            SensorKind::Temperature => *temperature,
            SensorKind::Humidity => *humidity,
        })
}

fn window_entity(room: Room) -> Option<&'static str> {
    WINDOW_SENSORS.iter().find(|(r, _)| *r == room).map(|(_, e)| *e)
}

fn room_name(room: Room) -> &'static str {
    match room {
        Room::Outside => "externa/sacada",
        other => other.as_str(),
    }
}

pub fn format_value(kind: SensorKind, value: f64) -> String {
    match kind {
        SensorKind::Temperature => format!("{} graus", value.trunc() as i64),
        SensorKind::Humidity => format!("{} %", value),
    }
}

/// Read-only answers about temperature, humidity and windows.
pub struct SensorHandler {
    hub: Arc<dyn DeviceApi>,
}

impl SensorHandler {
    pub fn new(hub: Arc<dyn DeviceApi>) -> Self {
        Self { hub }
    }

    /// Raw state; hub failures count as missing data.
    fn read(&self, entity_id: &str) -> Option<String> {
        match self.hub.get_state(entity_id) {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not read {}: {}", entity_id, e);
                None
            }
        }
    }

    fn reading(&self, kind: SensorKind, room: Room) -> Option<f64> {
        let entity = sensor_entity(kind, room)?;
        let raw = self.read(entity)?;
        match raw.trim().parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Non-numeric reading from {}: '{}'", entity, raw);
                None
            }
        }
    }

    fn window_open(&self, room: Room) -> Option<bool> {
        let entity = window_entity(room)?;
        self.read(entity).map(|state| state.eq_ignore_ascii_case("on"))
    }

    fn query(&self, room: Option<Room>) -> ResponseRecord {
        let Some(room) = room else {
            return ResponseRecord::message("Qual cômodo você quer verificar?");
        };
        info!("Sensor query for {}", room.as_str());

        match (self.reading(SensorKind::Temperature, room), self.reading(SensorKind::Humidity, room)) {
            (Some(temperature), Some(humidity)) => ResponseRecord::message(format!(
                "A temperatura do {} é de {} e a humidade é de {}.",
                room_name(room),
                format_value(SensorKind::Temperature, temperature),
                format_value(SensorKind::Humidity, humidity)
            )),
            _ => ResponseRecord::message(format!("Não consegui obter dados para {}.", room_name(room))),
        }
    }

    fn compare(&self, kind: SensorKind, extreme: Extreme, rooms: &[Room]) -> ResponseRecord {
        if rooms.len() < 2 {
            return ResponseRecord::message("Preciso de pelo menos dois ambientes para comparar.");
        }
        info!("Comparing {} across {:?}", kind.as_str(), rooms);

        let mut values: Vec<(Room, f64)> = rooms
            .iter()
            .filter_map(|room| self.reading(kind, *room).map(|v| (*room, v)))
            .collect();
        if values.len() < 2 {
            return ResponseRecord::message("Não consegui obter dados suficientes dos ambientes.");
        }

        values.sort_by(|a, b| b.1.total_cmp(&a.1));
        if extreme == Extreme::Lowest {
            values.reverse();
        }
        let (winner, winner_value) = values[0];
        let (other, other_value) = values[1];

        let message = match kind {
            SensorKind::Temperature => format!(
                "O {} está mais {}, com {}. O {} está com {}.",
                room_name(winner),
                if extreme == Extreme::Highest { "quente" } else { "frio" },
                format_value(kind, winner_value),
                room_name(other),
                format_value(kind, other_value)
            ),
            SensorKind::Humidity => format!(
                "O {} tem {} umidade, com {}. O {} tem {}.",
                room_name(winner),
                if extreme == Extreme::Highest { "mais" } else { "menos" },
                format_value(kind, winner_value),
                room_name(other),
                format_value(kind, other_value)
            ),
        };
        ResponseRecord::message(message)
    }

    fn compare_all(&self, kind: SensorKind, extreme: Extreme) -> ResponseRecord {
        info!("Comparing {} across all rooms ({:?})", kind.as_str(), extreme);

        let values = CLIMATE_SENSORS
            .iter()
            .filter_map(|(room, _, _)| self.reading(kind, *room).map(|v| (*room, v)));
        let best = match extreme {
            Extreme::Highest => values.max_by(|a, b| a.1.total_cmp(&b.1)),
            Extreme::Lowest => values.min_by(|a, b| a.1.total_cmp(&b.1)),
        };
        let Some((room, value)) = best else {
            return ResponseRecord::message(format!("Não consegui obter dados de {}.", kind.as_str()));
        };

        let formatted = format_value(kind, value);
        let message = match (kind, extreme) {
            (SensorKind::Temperature, Extreme::Highest) => {
                format!("O {} está mais quente, com {}.", room_name(room), formatted)
            }
            (SensorKind::Temperature, Extreme::Lowest) => {
                format!("O {} está mais frio, com {}.", room_name(room), formatted)
            }
            (SensorKind::Humidity, Extreme::Highest) => {
                format!("O {} tem a maior umidade, com {}.", room_name(room), formatted)
            }
            (SensorKind::Humidity, Extreme::Lowest) => {
                format!("O {} tem a menor umidade, com {}.", room_name(room), formatted)
            }
        };
        ResponseRecord::message(message)
    }

    fn query_window(&self, room: Option<Room>, asked: WindowState) -> ResponseRecord {
        let Some(room) = room else {
            return ResponseRecord::message("Qual janela você quer verificar?");
        };
        let Some(open) = self.window_open(room) else {
            return ResponseRecord::message(format!("Não consegui obter dados da janela do {}.", room_name(room)));
        };

        let message = match (asked, open) {
            (WindowState::Open, true) => "Sim, está aberta.",
            (WindowState::Open, false) => "Não, está fechada.",
            (WindowState::Closed, true) => "Não, está aberta.",
            (WindowState::Closed, false) => "Sim, está fechada.",
        };
        ResponseRecord::message(message)
    }

    fn list_windows(&self, state: WindowState) -> ResponseRecord {
        let want_open = state == WindowState::Open;
        let rooms: Vec<&str> = WINDOW_SENSORS
            .iter()
            .filter(|(room, _)| self.window_open(*room) == Some(want_open))
            .map(|(room, _)| room_name(*room))
            .collect();

        let (singular, plural, none) = match state {
            WindowState::Open => ("aberta", "abertas", "Todas as janelas estão fechadas."),
            WindowState::Closed => ("fechada", "fechadas", "Todas as janelas estão abertas."),
        };

        let message = match rooms.as_slice() {
            [] => none.to_string(),
            [only] => format!("A janela do {} está {}.", only, singular),
            [rest @ .., last] => format!("A janela do {} e do {} estão {}.", rest.join(" e do "), last, plural),
        };
        ResponseRecord::message(message)
    }
}

impl DomainHandler for SensorHandler {
    fn domain(&self) -> Domain {
        Domain::Sensor
    }

    fn handle(&self, intent: &IntentRecord, _context: &mut ContextManager) -> HandlerResult {
        info!("Processing sensor.{}", intent.tag());

        let IntentKind::Sensor(sensor) = &intent.kind else {
            warn!("Unknown intent for sensor domain: {}", intent.tag());
            return Ok(ResponseRecord::message("Não entendi a query de sensor."));
        };

        Ok(match sensor {
            SensorIntent::Query { room } => self.query(*room),
            SensorIntent::Compare { kind, extreme, rooms } => self.compare(*kind, *extreme, rooms),
            SensorIntent::CompareAll { kind, extreme } => self.compare_all(*kind, *extreme),
            SensorIntent::QueryWindow { room, asked } => self.query_window(*room, *asked),
            SensorIntent::ListWindows { state } => self.list_windows(*state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_drops_decimals() {
        assert_eq!(format_value(SensorKind::Temperature, 23.8), "23 graus");
        assert_eq!(format_value(SensorKind::Humidity, 55.0), "55 %");
        assert_eq!(format_value(SensorKind::Humidity, 55.5), "55.5 %");
    }

    #[test]
    fn test_outside_shares_one_sensor() {
        assert_eq!(
            sensor_entity(SensorKind::Humidity, Room::Outside),
            Some("sensor.sensor_temp_outside_humidity")
        );
        assert_eq!(sensor_entity(SensorKind::Temperature, Room::Bathroom), None);
        assert_eq!(room_name(Room::Outside), "externa/sacada");
    }
}
