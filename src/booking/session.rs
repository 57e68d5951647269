use serde::{Deserialize, Serialize};

use crate::rides::RideOption;

/// The discrete stage of a booking session.
///
/// `Idle` is the initial state; `Arrived` is terminal until an explicit
/// reset returns to `Idle`. Serialized in SCREAMING_SNAKE_CASE to match the
/// frontend's state labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    Searching,
    Results,
    Confirmed,
    EnRoute,
    Arrived,
}

/// The single mutable record for one user's booking attempt.
///
/// Created once at startup, mutated in place by state-machine actions, and
/// reinitialized to the startup values by a full reset. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User-entered pickup text; empty string means unset.
    pub pickup: String,
    /// User-entered destination text; empty string means unset.
    pub destination: String,
    /// Candidate rides from the last successful search, replaced wholesale
    /// on each fetch.
    pub options: Vec<RideOption>,
    /// The chosen ride; always one of `options`, matched by `kind`.
    pub selected: Option<RideOption>,
    pub phase: Phase,
    /// Message from the most recent failed action, cleared at the start of
    /// every new search and on reset.
    pub last_error: Option<String>,
    /// RFC 3339 timestamp of the most recent accepted search.
    pub requested_at: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            pickup: String::new(),
            destination: String::new(),
            options: Vec::new(),
            selected: None,
            phase: Phase::Idle,
            last_error: None,
            requested_at: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.pickup.is_empty());
        assert!(session.destination.is_empty());
        assert!(session.options.is_empty());
        assert!(session.selected.is_none());
        assert!(session.last_error.is_none());
        assert!(session.requested_at.is_none());
    }

    #[test]
    fn test_phase_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::EnRoute).unwrap(), "\"EN_ROUTE\"");
        assert_eq!(serde_json::to_string(&Phase::Idle).unwrap(), "\"IDLE\"");
        let parsed: Phase = serde_json::from_str("\"SEARCHING\"").unwrap();
        assert_eq!(parsed, Phase::Searching);
    }
}
