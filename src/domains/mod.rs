//! Device-control domains wired behind the dispatcher.

pub mod climate;
pub mod light;
pub mod sensor;

pub use climate::ClimateHandler;
pub use light::LightHandler;
pub use sensor::SensorHandler;

use crate::kernel::context::Candidate;
use crate::kernel::intent::vocab::PLURAL_CUES;
use crate::kernel::normalize::{normalize, tokens};

/// Matches a normalized confirmation reply against the pending candidates:
/// exact display name first, then a single name contained either way.
pub fn pick_candidate<'a>(candidates: &'a [Candidate], reply: &str) -> Option<&'a Candidate> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    if let Some(exact) = candidates.iter().find(|c| normalize(&c.display_name) == reply) {
        return Some(exact);
    }

    let mut hits = candidates.iter().filter(|c| {
        let name = normalize(&c.display_name);
        !name.is_empty() && (reply.contains(&name) || name.contains(reply))
    });
    match (hits.next(), hits.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// "todas", "todos", "os dois", "ambos"...
pub fn wants_all(reply: &str) -> bool {
    tokens(reply).iter().any(|t| PLURAL_CUES.contains(&t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new("light.sala", "sala"),
            Candidate::new("light.quarto", "quarto"),
            Candidate::new("light.luz_sala_jantar", "luz sala jantar"),
        ]
    }

    #[test]
    fn test_exact_name_beats_containment() {
        let c = candidates();
        assert_eq!(pick_candidate(&c, "sala").map(|c| c.identifier.as_str()), Some("light.sala"));
    }

    #[test]
    fn test_containment_must_be_unique() {
        let c = candidates();
        assert_eq!(pick_candidate(&c, "luz quarto").map(|c| c.identifier.as_str()), Some("light.quarto"));
        assert_eq!(pick_candidate(&c, "jantar").map(|c| c.identifier.as_str()), Some("light.luz_sala_jantar"));
        assert!(pick_candidate(&c, "cozinha").is_none());
        assert!(pick_candidate(&c, "").is_none());
    }

    #[test]
    fn test_plural_replies_mean_all() {
        assert!(wants_all("todas"));
        assert!(wants_all("dois"));
        assert!(!wants_all("sala"));
    }
}
