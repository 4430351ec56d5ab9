use tracing::debug;

use super::matchers::{ClimateMatcher, FallbackMatcher, LightingMatcher, Matcher, SensorMatcher, Utterance};
use super::types::IntentRecord;

/// Rule cascade over normalized text. Precedence is the order of `matchers`:
/// sensor questions first (they share "quente"/"frio"/"temperatura" with
/// climate), then climate, then lighting, then the fallback.
pub struct IntentParser {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentParser {
    pub fn new() -> Self {
        Self::with_matchers(vec![
            Box::new(SensorMatcher),
            Box::new(ClimateMatcher),
            Box::new(LightingMatcher),
            Box::new(FallbackMatcher),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Never fails: an utterance nobody claims becomes an `error` intent.
    pub fn parse(&self, raw_text: &str) -> IntentRecord {
        let utterance = Utterance::new(raw_text);
        debug!("Normalized: '{}' -> '{}'", raw_text, utterance.normalized);

        let kind = self
            .matchers
            .iter()
            .find(|m| m.guard(&utterance))
            .map(|m| {
                debug!("Matcher '{}' claimed the utterance", m.name());
                m.build(&utterance)
            })
            .unwrap_or_else(|| FallbackMatcher.build(&utterance));

        IntentRecord::new(raw_text, kind)
    }
}
