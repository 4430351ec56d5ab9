//! Conversation context: at most one pending disambiguation, with a TTL.
//!
//! Two states. **Idle** (nothing stored, or the stored record has expired) and
//! **Pending**. Expiry is evaluated lazily on read; an expired record is left in
//! place until the next `set` or `clear` replaces it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::intent::{Domain, IntentRecord};
use super::normalize::is_denial;
use super::response::ResponseRecord;
use super::time::{Clock, SystemClock};

pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// What the pending question is about to do once answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    TurnOn,
    TurnOff,
}

impl PendingAction {
    pub fn service(&self) -> &'static str {
        match self {
            PendingAction::TurnOn => "turn_on",
            PendingAction::TurnOff => "turn_off",
        }
    }
}

/// One of the choices a confirmation reply picks among.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identifier: String,
    pub display_name: String,
}

impl Candidate {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), display_name: display_name.into() }
    }
}

/// Set by the handler that raised the question; opaque to everyone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPayload {
    pub domain: Domain,
    pub action: PendingAction,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone)]
struct ContextRecord {
    payload: ContextPayload,
    expires_at: Instant,
}

pub struct ContextManager {
    record: Option<ContextRecord>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), DEFAULT_TTL)
    }
}

impl std::fmt::Debug for ContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextManager")
            .field("record", &self.record)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl ContextManager {
    pub fn new(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self { record: None, clock, default_ttl }
    }

    /// Replaces whatever was pending. Last writer wins.
    pub fn set(&mut self, payload: ContextPayload) {
        self.set_with_ttl(payload, self.default_ttl);
    }

    pub fn set_with_ttl(&mut self, payload: ContextPayload, ttl: Duration) {
        info!(
            "Context set: {} | {} candidate(s) | ttl {:?}",
            payload.domain,
            payload.candidates.len(),
            ttl
        );
        self.record = Some(ContextRecord { payload, expires_at: self.clock.now() + ttl });
    }

    pub fn clear(&mut self) {
        if self.record.take().is_some() {
            debug!("Context cleared");
        }
    }

    /// True iff a record exists and `now < expires_at`. Read-only.
    pub fn valid(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| self.clock.now() < r.expires_at)
    }

    /// The pending payload, if still valid.
    pub fn pending(&self) -> Option<&ContextPayload> {
        if self.valid() {
            self.record.as_ref().map(|r| &r.payload)
        } else {
            None
        }
    }

    /// Consumes the pending payload. The context is Idle afterwards whether or
    /// not anything was pending.
    pub fn take(&mut self) -> Option<ContextPayload> {
        let valid = self.valid();
        let record = self.record.take();
        if valid { record.map(|r| r.payload) } else { None }
    }

    /// Generic confirmation path for domains without their own.
    pub fn handle(&mut self, reply: &IntentRecord) -> ResponseRecord {
        if !self.valid() {
            return ResponseRecord::message("Não há nada para confirmar.");
        }
        if is_denial(&reply.raw_text) {
            self.clear();
            return ResponseRecord::message("Ok, cancelado.");
        }
        ResponseRecord::message("Ok, entendido.")
    }
}
