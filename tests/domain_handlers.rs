mod common;

use std::time::Duration;

use common::{assistant, FakeHub, ServiceCall};
use friday::kernel::dispatcher::DOWNSTREAM_MESSAGE;
use friday::kernel::time::ManualClock;
use serde_json::json;

fn call(domain: &str, service: &str, data: serde_json::Value) -> ServiceCall {
    ServiceCall { domain: domain.into(), service: service.into(), data }
}

// ---------------------------------------------------------------- lighting

#[test]
fn test_generic_off_asks_then_acts_on_the_answer() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "on")
        .with_light("light.quarto", "Luz Quarto", "on")
        .with_light("light.all_light_entities", "Todas", "on");
    let mut friday = assistant(hub.clone(), &clock);

    let asked = friday.process("desligar luz");
    assert_eq!(asked.domain, "light");
    assert_eq!(asked.intent, "off");
    assert_eq!(asked.response.message, "Mais de uma luz está ligada: sala, quarto. Qual luz?");
    assert!(friday.context().valid());
    assert!(hub.calls().is_empty());

    let answered = friday.process("sala");
    assert_eq!(answered.response.message, "sala desligada.");
    assert_eq!(hub.calls(), vec![call("light", "turn_off", json!({ "entity_id": "light.sala" }))]);
    assert!(!friday.context().valid());
}

#[test]
fn test_generic_off_with_one_light_acts_directly() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "on").with_light("light.quarto", "Luz Quarto", "off");
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("apagar luz").response.message, "Luz desligada.");
    assert!(!friday.context().valid());
    assert_eq!(hub.calls().len(), 1);
}

#[test]
fn test_confirmation_accepts_all_and_denial() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "on").with_light("light.quarto", "Luz Quarto", "on");
    let mut friday = assistant(hub.clone(), &clock);

    friday.process("desligar luz");
    assert_eq!(friday.process("todas").response.message, "Todas as luzes foram desligadas.");
    assert_eq!(
        hub.calls(),
        vec![call("light", "turn_off", json!({ "entity_id": ["light.sala", "light.quarto"] }))]
    );

    friday.process("desligar luz");
    assert_eq!(friday.process("não, deixa").response.message, "Ok, nenhuma luz foi alterada.");
    assert_eq!(hub.calls().len(), 1);
    assert!(!friday.context().valid());
}

#[test]
fn test_late_answer_is_not_a_confirmation() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "on").with_light("light.quarto", "Luz Quarto", "on");
    let mut friday = assistant(hub.clone(), &clock);

    friday.process("desligar luz");
    clock.advance(Duration::from_secs(10));

    let late = friday.process("sala");
    assert_eq!(late.response.message, "Não entendi. Pode repetir?");
    assert!(hub.calls().is_empty());
}

#[test]
fn test_named_light_is_switched() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "off");
    let mut friday = assistant(hub.clone(), &clock);

    let outcome = friday.process("ligar luz da sala");
    assert_eq!(outcome.response.message, "luz sala ligada.");
    assert_eq!(outcome.response.entities, Some(vec!["light.sala".to_string()]));
    assert_eq!(hub.calls(), vec![call("light", "turn_on", json!({ "entity_id": ["light.sala"] }))]);

    assert_eq!(friday.process("ligar luz da cozinha").response.message, "Não encontrei essa luz.");
}

#[test]
fn test_all_lights_target_the_group() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("apagar todas as luzes").intent, "all_off");
    assert_eq!(
        hub.calls(),
        vec![call("light", "turn_off", json!({ "entity_id": "light.all_light_entities" }))]
    );
}

#[test]
fn test_multi_clause_commands_run_each_clause() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "off").with_light("light.quarto", "Luz Quarto", "on");
    let mut friday = assistant(hub.clone(), &clock);

    let outcome = friday.process("ligar luz sala e desligar luz quarto");
    assert_eq!(outcome.intent, "multi");
    assert_eq!(outcome.response.message, "luz sala ligada. | luz quarto desligada.");
    assert_eq!(hub.calls().len(), 2);
}

#[test]
fn test_multi_clause_borrows_verb_and_noun() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "off").with_light("light.quarto", "Luz Quarto", "off");
    let mut friday = assistant(hub.clone(), &clock);

    let outcome = friday.process("ligar luz sala e quarto");
    assert_eq!(outcome.response.message, "luz sala ligada. | luz quarto ligada.");
    assert!(hub.calls().iter().all(|c| c.service == "turn_on"));
}

#[test]
fn test_multi_clause_reports_partial_failure() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_light("light.sala", "Luz Sala", "off").with_light("light.quarto", "Luz Quarto", "off");
    hub.reject_calls_for("light.quarto");
    let mut friday = assistant(hub.clone(), &clock);

    let outcome = friday.process("ligar luz sala e quarto");
    assert_eq!(
        outcome.response.message,
        "luz sala ligada. | Falha em 'ligar luz quarto': não consegui falar com a central."
    );
    assert_eq!(hub.calls(), vec![call("light", "turn_on", json!({ "entity_id": ["light.sala"] }))]);
    let debug = outcome.response.debug.expect("failed clauses reported");
    assert_eq!(debug["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(debug["errors"][0]["clause"], "ligar luz quarto");
}

#[test]
fn test_multi_clause_with_hub_down_is_a_downstream_failure() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.go_offline();
    let mut friday = assistant(hub.clone(), &clock);

    let outcome = friday.process("ligar luz sala e desligar luz quarto");
    assert_eq!(outcome.response.message, DOWNSTREAM_MESSAGE);
}

// ---------------------------------------------------------------- climate

#[test]
fn test_climate_generic_off_asks_which_room() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_state("binary_sensor.ar_condicionado_quarto_contact", "on")
        .with_state("binary_sensor.sonoff_10017182d6", "on");
    let mut friday = assistant(hub.clone(), &clock);

    let asked = friday.process("desligar o ar");
    assert_eq!(asked.response.message, "Mais de um ar está ligado: quarto, closet. Qual deles?");

    let answered = friday.process("closet");
    assert_eq!(answered.response.message, "Ar do closet desligado.");
    assert_eq!(hub.calls(), vec![call("script", "desligar_ar_lg_closet", json!({}))]);
    assert!(!friday.context().valid());
}

#[test]
fn test_climate_generic_on_picks_the_only_idle_unit() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_state("binary_sensor.ar_condicionado_quarto_contact", "on")
        .with_state("binary_sensor.sonoff_10017182d6", "off");
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("ligar ar").response.message, "Ar do closet ligado.");
    assert_eq!(hub.calls(), vec![call("script", "gelar_ar_lg_closet", json!({}))]);
}

#[test]
fn test_climate_room_commands() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("ligar ar do quarto").response.message, "Ar do quarto ligado.");
    assert_eq!(
        friday.process("desligar todos os ar-condicionados").response.message,
        "Todos os ar-condicionados foram desligados."
    );
    assert_eq!(hub.calls().len(), 3);

    assert_eq!(friday.process("ligar aquecedor do closet").response.message, "Aquecedor não disponível no closet.");
    assert_eq!(friday.process("ligar ventilador").response.message, "Qual cômodo? Quarto ou closet?");
    assert_eq!(hub.calls().len(), 3);
}

#[test]
fn test_display_off_uses_the_remote() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("apagar a tela do quarto").response.message, "Tela do ar do quarto apagada.");
    assert_eq!(
        hub.calls(),
        vec![call(
            "remote",
            "send_command",
            json!({ "entity_id": "remote.broadlink_remote_bedroom", "device": "SmartInverter", "command": "DisplayOff" })
        )]
    );
}

#[test]
fn test_temperature_is_range_checked() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(
        friday.process("colocar temperatura do quarto em 30 graus").response.message,
        "Temperatura deve estar entre 18 e 26°C. Você pediu 30°C."
    );
    assert!(hub.calls().is_empty());

    assert_eq!(
        friday.process("colocar temperatura do quarto em 22 graus").response.message,
        "Temperatura do quarto definida para 22°C."
    );
    assert_eq!(
        hub.calls(),
        vec![call("input_number", "set_value", json!({ "entity_id": "input_number.temperature_quarto", "value": 22 }))]
    );
}

#[test]
fn test_verbless_climate_text_only_asks() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_state("climate.quarto", "cool").with_state("climate.closet", "off");
    let mut friday = assistant(hub.clone(), &clock);

    for text in ["tela do quarto", "temperatura do quarto 22", "velocidade do closet 2", "ventilador do quarto"] {
        let outcome = friday.process(text);
        assert_eq!(outcome.intent, "error", "{}", text);
        assert_eq!(outcome.domain, "climate", "{}", text);
    }
    assert!(hub.calls().is_empty());
    assert!(!friday.context().valid());
}

#[test]
fn test_speed_changes_clamp() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    hub.with_state("input_number.fan_speed_quarto", "1.0")
        .with_state("input_number.fan_speed_escritorio", "2.0");
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(friday.process("diminuir velocidade do quarto").response.message, "Velocidade do quarto diminuída para 1.");
    assert_eq!(friday.process("aumentar velocidade do closet").response.message, "Velocidade do closet aumentada para 3.");
    assert_eq!(friday.process("colocar velocidade do closet em 5").response.message, "Velocidade deve estar entre 1 e 3. Você pediu 5.");
    assert_eq!(hub.calls().len(), 2);
}

// ---------------------------------------------------------------- sensor

fn sensor_hub() -> std::sync::Arc<FakeHub> {
    let hub = FakeHub::new();
    hub.with_state("sensor.sensor_temp_outside_temperature", "30.2")
        .with_state("sensor.esp32relaysmesas_closet_room_temperature", "22.9")
        .with_state("sensor.sensor_temp_quarto_temperature", "25.0")
        .with_state("binary_sensor.janela_closet_contact", "on")
        .with_state("binary_sensor.janela_quarto_contact", "on")
        .with_state("binary_sensor.sonoff_1001879d3a", "off");
    hub
}

#[test]
fn test_sensor_comparisons() {
    let clock = ManualClock::new();
    let mut friday = assistant(sensor_hub(), &clock);

    let hottest = friday.process("Onde está mais quente?");
    assert_eq!(hottest.intent, "compare_all_sensors");
    assert_eq!(hottest.response.message, "O externa/sacada está mais quente, com 30 graus.");

    assert_eq!(
        friday.process("Qual está mais frio, quarto ou closet?").response.message,
        "O closet está mais frio, com 22 graus. O quarto está com 25 graus."
    );
}

#[test]
fn test_window_answers() {
    let clock = ManualClock::new();
    let mut friday = assistant(sensor_hub(), &clock);

    assert_eq!(
        friday.process("quais janelas estão abertas?").response.message,
        "A janela do closet e do quarto estão abertas."
    );
    assert_eq!(
        friday.process("quais janelas estão fechadas?").response.message,
        "A janela do banheiro está fechada."
    );
    assert_eq!(friday.process("a janela do banheiro está fechada?").response.message, "Sim, está fechada.");
    assert_eq!(friday.process("a janela do quarto está fechada?").response.message, "Não, está aberta.");
}

#[test]
fn test_missing_readings_degrade_gracefully() {
    let clock = ManualClock::new();
    let hub = FakeHub::new();
    let mut friday = assistant(hub.clone(), &clock);

    assert_eq!(
        friday.process("qual a temperatura do closet?").response.message,
        "Não consegui obter dados para closet."
    );

    hub.go_offline();
    let outcome = friday.process("qual a temperatura do closet?");
    assert_eq!(outcome.response.message, "Não consegui obter dados para closet.");
    assert!(outcome.response.debug.is_none());
}
