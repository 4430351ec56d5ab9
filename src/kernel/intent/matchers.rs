//! One matcher per rung of the parsing cascade. The parser asks each guard in
//! order; the first one that holds builds the intent.

use super::types::*;
use super::vocab::*;
use crate::kernel::normalize::{fold, normalize, tokens};

/// An utterance prepared for matching.
#[derive(Debug, Clone)]
pub struct Utterance<'a> {
    pub raw: &'a str,
    /// Lower-case ASCII with stopwords kept ("18 a 26" needs its "a").
    pub folded: String,
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl<'a> Utterance<'a> {
    pub fn new(raw: &'a str) -> Self {
        let folded = fold(raw);
        let normalized = normalize(raw);
        let tokens = tokens(&normalized);
        Self { raw, folded, normalized, tokens }
    }

    fn has(&self, words: &[&str]) -> bool {
        has_any(&self.tokens, words)
    }
}

pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn guard(&self, utterance: &Utterance<'_>) -> bool;
    fn build(&self, utterance: &Utterance<'_>) -> IntentKind;
}

fn failure(domain: Domain, clarification: &str) -> IntentKind {
    IntentKind::Error(ParseFailure { domain: Some(domain), clarification: clarification.to_string() })
}

// ---------------------------------------------------------------- sensor

pub struct SensorMatcher;

impl SensorMatcher {
    fn extreme(u: &Utterance<'_>) -> Extreme {
        let lowest = u.has(&["frio", "fria", "menor", "baixa", "baixo", "seco", "seca"]);
        if lowest { Extreme::Lowest } else { Extreme::Highest }
    }

    fn kind(u: &Utterance<'_>) -> SensorKind {
        if u.has(HUMIDITY_NOUNS) { SensorKind::Humidity } else { SensorKind::Temperature }
    }

    fn superlative(u: &Utterance<'_>) -> bool {
        let n = &u.normalized;
        n.contains("mais ") || u.has(&["maior", "menor"])
    }

    fn windows(u: &Utterance<'_>) -> IntentKind {
        let asked = if u.normalized.contains("fechad") { WindowState::Closed } else { WindowState::Open };
        let rooms = sensor_rooms(&u.tokens);
        let listing = u.has(&["quais", "janelas"])
            || (u.has(&["tem"]) && u.has(&["alguma", "algum"]))
            || rooms.is_empty();

        if listing {
            IntentKind::Sensor(SensorIntent::ListWindows { state: asked })
        } else {
            IntentKind::Sensor(SensorIntent::QueryWindow { room: rooms.first().copied(), asked })
        }
    }
}

impl Matcher for SensorMatcher {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn guard(&self, u: &Utterance<'_>) -> bool {
        let asking = u.has(QUESTION_CUES) || (u.raw.contains('?') && u.has(&["janela", "janelas"]));
        asking && u.has(SENSOR_NOUNS) && !has_action_verb(&u.tokens)
    }

    fn build(&self, u: &Utterance<'_>) -> IntentKind {
        if u.has(&["janela", "janelas"]) {
            return Self::windows(u);
        }

        let rooms = sensor_rooms(&u.tokens);
        if Self::superlative(u) {
            let kind = Self::kind(u);
            let extreme = Self::extreme(u);
            return if rooms.len() >= 2 {
                IntentKind::Sensor(SensorIntent::Compare { kind, extreme, rooms })
            } else {
                IntentKind::Sensor(SensorIntent::CompareAll { kind, extreme })
            };
        }

        IntentKind::Sensor(SensorIntent::Query { room: rooms.first().copied() })
    }
}

// ---------------------------------------------------------------- climate

pub struct ClimateMatcher;

impl ClimateMatcher {
    fn temperature(u: &Utterance<'_>, room: Option<Room>) -> IntentKind {
        let range = integer_range(&u.folded);
        let value = range.map(|(low, _)| low).or_else(|| first_integer(&u.normalized));
        match value {
            Some(value) => IntentKind::Climate(ClimateIntent::SetTemperature { value, range, room }),
            None => failure(Domain::Climate, "Qual temperatura? Ex: 22 graus."),
        }
    }

    fn speed(u: &Utterance<'_>, room: Option<Room>) -> IntentKind {
        if u.has(VERBS_INCREASE) {
            return IntentKind::Climate(ClimateIntent::IncreaseSpeed { room });
        }
        if u.has(VERBS_DECREASE) {
            return IntentKind::Climate(ClimateIntent::DecreaseSpeed { room });
        }
        match first_integer(&u.normalized) {
            Some(value) => IntentKind::Climate(ClimateIntent::SetSpeed { value, room }),
            None => failure(Domain::Climate, "Qual velocidade? Ex: velocidade 2."),
        }
    }

    fn plural(u: &Utterance<'_>) -> bool {
        u.has(PLURAL_CUES) || u.has(CLIMATE_PLURAL_NOUNS)
    }
}

impl Matcher for ClimateMatcher {
    fn name(&self) -> &'static str {
        "climate"
    }

    fn guard(&self, u: &Utterance<'_>) -> bool {
        [CLIMATE_NOUNS, FAN_NOUNS, HEATER_NOUNS, DISPLAY_NOUNS, TEMPERATURE_NOUNS, SPEED_NOUNS]
            .iter()
            .any(|words| u.has(words))
    }

    fn build(&self, u: &Utterance<'_>) -> IntentKind {
        let room = climate_room(&u.tokens);
        let power = power(&u.tokens);

        if u.has(FAN_NOUNS) {
            return match power {
                Some(power) => IntentKind::Climate(ClimateIntent::Fan { power, room }),
                None => failure(Domain::Climate, "Quer ligar ou desligar o ventilador?"),
            };
        }
        if u.has(HEATER_NOUNS) {
            return match power {
                Some(power) => IntentKind::Climate(ClimateIntent::Heater { power, room }),
                None => failure(Domain::Climate, "Quer ligar ou desligar o aquecedor?"),
            };
        }
        if u.has(DISPLAY_NOUNS) {
            return match power {
                Some(Power::Off) => IntentKind::Climate(ClimateIntent::DisplayOff { room }),
                Some(Power::On) => failure(Domain::Climate, "Só consigo apagar a tela do ar."),
                None => failure(Domain::Climate, "Quer apagar a tela do ar?"),
            };
        }
        if u.has(TEMPERATURE_NOUNS) {
            if !has_action_verb(&u.tokens) {
                return failure(Domain::Climate, "O que faço com a temperatura? Ex: colocar temperatura em 22 graus.");
            }
            return Self::temperature(u, room);
        }
        if u.has(SPEED_NOUNS) {
            if !has_action_verb(&u.tokens) {
                return failure(Domain::Climate, "O que faço com a velocidade? Ex: aumentar velocidade.");
            }
            return Self::speed(u, room);
        }

        let Some(power) = power else {
            return failure(Domain::Climate, "Quer ligar ou desligar o ar-condicionado?");
        };
        if Self::plural(u) {
            return IntentKind::Climate(ClimateIntent::All { power });
        }

        let search = u
            .tokens
            .iter()
            .filter(|t| !is_power_verb(t))
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        IntentKind::Climate(ClimateIntent::Switch { power, search, room })
    }
}

// ---------------------------------------------------------------- lighting

pub struct LightingMatcher;

impl LightingMatcher {
    fn light_type(u: &Utterance<'_>) -> Option<LightType> {
        u.tokens.iter().find_map(|t| {
            if LIGHT_NOUNS.contains(&t.as_str()) {
                Some(LightType::Light)
            } else if LED_NOUNS.contains(&t.as_str()) {
                Some(LightType::Led)
            } else {
                None
            }
        })
    }

    fn is_multi(u: &Utterance<'_>) -> bool {
        let verbs = u.tokens.iter().filter(|t| is_power_verb(t)).count();
        verbs > 1 || (verbs == 1 && u.has(&[CONJUNCTION]))
    }
}

impl Matcher for LightingMatcher {
    fn name(&self) -> &'static str {
        "lighting"
    }

    fn guard(&self, u: &Utterance<'_>) -> bool {
        power(&u.tokens).is_some() || Self::light_type(u).is_some()
    }

    fn build(&self, u: &Utterance<'_>) -> IntentKind {
        let light_type = Self::light_type(u);
        let Some(power) = power(&u.tokens) else {
            return failure(Domain::Lighting, "Quer ligar ou desligar a luz?");
        };

        if Self::is_multi(u) {
            return IntentKind::Lighting(LightingIntent::Multi { text: u.normalized.clone() });
        }

        let Some(light_type) = light_type else {
            return failure(Domain::Lighting, "Você quer controlar luz ou led?");
        };

        if u.has(PLURAL_CUES) {
            return IntentKind::Lighting(LightingIntent::All { power });
        }

        let rest = u
            .tokens
            .iter()
            .filter(|t| !is_power_verb(t) && !LIGHT_NOUNS.contains(&t.as_str()) && !LED_NOUNS.contains(&t.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        let search = std::iter::once(light_type.as_str().to_string())
            .chain(rest)
            .collect::<Vec<_>>()
            .join(" ");

        IntentKind::Lighting(LightingIntent::Switch { power, light_type, search })
    }
}

// ---------------------------------------------------------------- fallback

/// Last rung: nothing recognizable, so the failure claims no domain.
pub struct FallbackMatcher;

impl Matcher for FallbackMatcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn guard(&self, _: &Utterance<'_>) -> bool {
        true
    }

    fn build(&self, _: &Utterance<'_>) -> IntentKind {
        IntentKind::Error(ParseFailure { domain: None, clarification: "Não entendi. Pode repetir?".to_string() })
    }
}
