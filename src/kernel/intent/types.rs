use serde::{Deserialize, Serialize};

/// Top-level command category. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[serde(rename = "light")]
    Lighting,
    Climate,
    Sensor,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Lighting => "light",
            Domain::Climate => "climate",
            Domain::Sensor => "sensor",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rooms the assistant knows by name. Not every domain covers every room:
/// climate only has `Bedroom` and `Closet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    Bedroom,
    Closet,
    Bathroom,
    Outside,
}

impl Room {
    /// Spoken key, as used in hub mappings and replies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Room::Bedroom => "quarto",
            Room::Closet => "closet",
            Room::Bathroom => "banheiro",
            Room::Outside => "externa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn service(&self) -> &'static str {
        match self {
            Power::On => "turn_on",
            Power::Off => "turn_off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Light,
    Led,
}

impl LightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Light => "luz",
            LightType::Led => "led",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightingIntent {
    /// Single device command. `search` is the device noun plus whatever
    /// free text is left once verbs are stripped ("luz sala").
    Switch { power: Power, light_type: LightType, search: String },
    All { power: Power },
    /// More than one clause; re-parsed clause by clause by the handler.
    Multi { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClimateIntent {
    Switch { power: Power, search: String, room: Option<Room> },
    All { power: Power },
    Fan { power: Power, room: Option<Room> },
    Heater { power: Power, room: Option<Room> },
    DisplayOff { room: Option<Room> },
    /// `value` is the lower bound when a range was spoken; `range` keeps both.
    SetTemperature { value: i64, range: Option<(i64, i64)>, room: Option<Room> },
    SetSpeed { value: i64, room: Option<Room> },
    IncreaseSpeed { room: Option<Room> },
    DecreaseSpeed { room: Option<Room> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Humidity,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Highest,
    Lowest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorIntent {
    Query { room: Option<Room> },
    Compare { kind: SensorKind, extreme: Extreme, rooms: Vec<Room> },
    CompareAll { kind: SensorKind, extreme: Extreme },
    QueryWindow { room: Option<Room>, asked: WindowState },
    ListWindows { state: WindowState },
}

/// Parse failure. Carries the domain of the branch that gave up and the
/// question to put back to the user. `domain` is `None` only when no branch
/// recognized anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub domain: Option<Domain>,
    pub clarification: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentKind {
    Lighting(LightingIntent),
    Climate(ClimateIntent),
    Sensor(SensorIntent),
    Error(ParseFailure),
}

/// Result of parsing one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRecord {
    pub raw_text: String,
    pub kind: IntentKind,
}

impl IntentRecord {
    pub fn new(raw_text: impl Into<String>, kind: IntentKind) -> Self {
        Self { raw_text: raw_text.into(), kind }
    }

    pub fn domain(&self) -> Domain {
        match &self.kind {
            IntentKind::Lighting(_) => Domain::Lighting,
            IntentKind::Climate(_) => Domain::Climate,
            IntentKind::Sensor(_) => Domain::Sensor,
            // Unrecognized text is reported under lighting by convention.
            IntentKind::Error(failure) => failure.domain.unwrap_or(Domain::Lighting),
        }
    }

    /// Domain this utterance competes for. Only unrecognized text ("sala",
    /// "todas") claims none, which is what lets it answer any pending question.
    pub fn claimed_domain(&self) -> Option<Domain> {
        match &self.kind {
            IntentKind::Error(failure) => failure.domain,
            _ => Some(self.domain()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, IntentKind::Error(_))
    }

    /// Action tag within the domain (`on`, `all_off`, `set_temperature`, ...).
    pub fn tag(&self) -> &'static str {
        use ClimateIntent as C;
        use LightingIntent as L;
        use SensorIntent as S;

        match &self.kind {
            IntentKind::Lighting(L::Switch { power: Power::On, .. }) => "on",
            IntentKind::Lighting(L::Switch { power: Power::Off, .. }) => "off",
            IntentKind::Lighting(L::All { power: Power::On }) => "all_on",
            IntentKind::Lighting(L::All { power: Power::Off }) => "all_off",
            IntentKind::Lighting(L::Multi { .. }) => "multi",
            IntentKind::Climate(C::Switch { power: Power::On, .. }) => "on",
            IntentKind::Climate(C::Switch { power: Power::Off, .. }) => "off",
            IntentKind::Climate(C::All { power: Power::On }) => "all_on",
            IntentKind::Climate(C::All { power: Power::Off }) => "all_off",
            IntentKind::Climate(C::Fan { power: Power::On, .. }) => "fan_on",
            IntentKind::Climate(C::Fan { power: Power::Off, .. }) => "fan_off",
            IntentKind::Climate(C::Heater { power: Power::On, .. }) => "heater_on",
            IntentKind::Climate(C::Heater { power: Power::Off, .. }) => "heater_off",
            IntentKind::Climate(C::DisplayOff { .. }) => "display_off",
            IntentKind::Climate(C::SetTemperature { .. }) => "set_temperature",
            IntentKind::Climate(C::SetSpeed { .. }) => "set_speed",
            IntentKind::Climate(C::IncreaseSpeed { .. }) => "increase_speed",
            IntentKind::Climate(C::DecreaseSpeed { .. }) => "decrease_speed",
            IntentKind::Sensor(S::Query { .. }) => "query_sensor",
            IntentKind::Sensor(S::Compare { .. }) => "compare_sensors",
            IntentKind::Sensor(S::CompareAll { .. }) => "compare_all_sensors",
            IntentKind::Sensor(S::QueryWindow { .. }) => "query_window",
            IntentKind::Sensor(S::ListWindows { state: WindowState::Open }) => "list_windows_open",
            IntentKind::Sensor(S::ListWindows { state: WindowState::Closed }) => "list_windows_closed",
            IntentKind::Error(_) => "error",
        }
    }

    pub fn search(&self) -> Option<&str> {
        match &self.kind {
            IntentKind::Lighting(LightingIntent::Switch { search, .. }) => Some(search),
            IntentKind::Climate(ClimateIntent::Switch { search, .. }) => Some(search),
            _ => None,
        }
    }

    pub fn room(&self) -> Option<Room> {
        use ClimateIntent as C;
        match &self.kind {
            IntentKind::Climate(
                C::Switch { room, .. }
                | C::Fan { room, .. }
                | C::Heater { room, .. }
                | C::DisplayOff { room }
                | C::SetTemperature { room, .. }
                | C::SetSpeed { room, .. }
                | C::IncreaseSpeed { room }
                | C::DecreaseSpeed { room },
            ) => *room,
            IntentKind::Sensor(SensorIntent::Query { room } | SensorIntent::QueryWindow { room, .. }) => *room,
            _ => None,
        }
    }

    pub fn clarification(&self) -> Option<&str> {
        match &self.kind {
            IntentKind::Error(failure) => Some(&failure.clarification),
            _ => None,
        }
    }
}
