//! Fixed vocabularies and slot extractors. Tokens are normalized
//! (lower-case, no diacritics, no stopwords).

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Power, Room};

pub const VERBS_ON: &[&str] = &["ligar", "liga", "ligue", "acender", "acende", "acenda", "ativar", "ativa"];
pub const VERBS_OFF: &[&str] = &[
    "desligar", "desliga", "desligue", "apagar", "apaga", "apague", "desativar", "desativa",
];
pub const VERBS_INCREASE: &[&str] = &["aumentar", "aumenta", "subir", "sobe", "suba"];
pub const VERBS_DECREASE: &[&str] = &[
    "diminuir", "diminui", "abaixar", "abaixa", "baixar", "baixa", "reduzir", "reduz",
];
pub const VERBS_SET: &[&str] = &[
    "colocar", "coloca", "coloque", "definir", "define", "ajustar", "ajusta", "setar", "mudar", "muda",
    "botar", "bota", "deixar",
];

pub const QUESTION_CUES: &[&str] = &["qual", "quais", "quanto", "quanta", "onde", "tem"];
pub const SENSOR_NOUNS: &[&str] = &[
    "temperatura", "umidade", "humidade", "quente", "frio", "fria", "janela", "janelas",
];
pub const HUMIDITY_NOUNS: &[&str] = &["umidade", "humidade", "umido", "umida", "seco", "seca"];

pub const CLIMATE_NOUNS: &[&str] = &[
    "ar", "ares", "ar-condicionado", "ar-condicionados", "arcondicionado", "arcondicionados",
    "condicionado", "condicionados",
];
pub const CLIMATE_PLURAL_NOUNS: &[&str] = &["ares", "ar-condicionados", "arcondicionados", "condicionados"];
pub const FAN_NOUNS: &[&str] = &["ventilador", "ventilar", "ventilacao"];
pub const HEATER_NOUNS: &[&str] = &["aquecedor", "aquecimento", "aquecer"];
pub const DISPLAY_NOUNS: &[&str] = &["tela", "display", "scoreboard", "painel"];
pub const TEMPERATURE_NOUNS: &[&str] = &["temperatura", "graus", "grau"];
pub const SPEED_NOUNS: &[&str] = &["velocidade"];

pub const LIGHT_NOUNS: &[&str] = &["luz", "luzes", "lampada", "lampadas"];
pub const LED_NOUNS: &[&str] = &["led", "leds"];
pub const PLURAL_CUES: &[&str] = &["todos", "todas", "dois", "duas", "ambos", "ambas"];
pub const CONJUNCTION: &str = "e";

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:-|a|e|ate)\s*(\d+)").expect("range pattern compiles")
});
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("integer pattern compiles"));

pub fn has_any(tokens: &[String], words: &[&str]) -> bool {
    tokens.iter().any(|t| words.contains(&t.as_str()))
}

/// Power verb, off-verbs checked first so "desligar" never reads as "ligar".
pub fn power(tokens: &[String]) -> Option<Power> {
    if has_any(tokens, VERBS_OFF) {
        Some(Power::Off)
    } else if has_any(tokens, VERBS_ON) {
        Some(Power::On)
    } else {
        None
    }
}

pub fn is_power_verb(token: &str) -> bool {
    VERBS_ON.contains(&token) || VERBS_OFF.contains(&token)
}

pub fn has_action_verb(tokens: &[String]) -> bool {
    [VERBS_ON, VERBS_OFF, VERBS_INCREASE, VERBS_DECREASE, VERBS_SET]
        .iter()
        .any(|words| has_any(tokens, words))
}

pub fn sensor_room(token: &str) -> Option<Room> {
    match token {
        "quarto" => Some(Room::Bedroom),
        "closet" => Some(Room::Closet),
        "banheiro" => Some(Room::Bathroom),
        "externa" | "externo" | "sacada" => Some(Room::Outside),
        _ => None,
    }
}

/// Distinct sensor rooms in order of first mention.
pub fn sensor_rooms(tokens: &[String]) -> Vec<Room> {
    let mut rooms = Vec::new();
    for room in tokens.iter().filter_map(|t| sensor_room(t)) {
        if !rooms.contains(&room) {
            rooms.push(room);
        }
    }
    rooms
}

/// Climate is wired in two rooms only.
pub fn climate_room(tokens: &[String]) -> Option<Room> {
    tokens.iter().find_map(|t| match t.as_str() {
        "quarto" => Some(Room::Bedroom),
        "closet" | "escritorio" => Some(Room::Closet),
        _ => None,
    })
}

/// First integer literal in the text.
pub fn first_integer(text: &str) -> Option<i64> {
    INTEGER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// `low-high` (also "18 a 26", "18 e 26", "18 ate 26"). Run it on folded text:
/// normalization drops the "a".
pub fn integer_range(text: &str) -> Option<(i64, i64)> {
    let caps = RANGE.captures(text)?;
    let low = caps.get(1)?.as_str().parse().ok()?;
    let high = caps.get(2)?.as_str().parse().ok()?;
    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::normalize::tokens;

    #[test]
    fn test_off_verbs_win_over_on() {
        assert_eq!(power(&tokens("desligar luz")), Some(Power::Off));
        assert_eq!(power(&tokens("ligar luz")), Some(Power::On));
        assert_eq!(power(&tokens("luz sala")), None);
    }

    #[test]
    fn test_extracts_numbers() {
        assert_eq!(first_integer("temperatura 22 graus"), Some(22));
        assert_eq!(first_integer("temperatura"), None);
        assert_eq!(integer_range("entre 18 e 26 graus"), Some((18, 26)));
        assert_eq!(integer_range("18-26"), Some((18, 26)));
        assert_eq!(integer_range("de 18 a 26 no quarto"), Some((18, 26)));
        assert_eq!(integer_range("22 graus"), None);
    }

    #[test]
    fn test_rooms_keep_first_mention_order() {
        let rooms = sensor_rooms(&tokens("onde esta mais frio, closet ou quarto ou closet?"));
        assert_eq!(rooms, vec![Room::Closet, Room::Bedroom]);
        assert_eq!(sensor_rooms(&tokens("qual temperatura sacada?")), vec![Room::Outside]);
    }
}
