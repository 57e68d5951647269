use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::session::{Phase, Session};
use super::timeline::TimelineStep;
use crate::error::RideMateError;
use crate::rides::RideOption;

struct BookingInner {
    session: Session,
    /// Generation counter for the current episode. Bumped by every accepted
    /// search and every reset; async completions scheduled under an older
    /// epoch are discarded.
    epoch: u64,
}

/// Shared state for the booking session.
///
/// One instance is managed by Tauri for the app lifetime. The session lives
/// behind a mutex that commands and the scheduled trip-timeline tasks both
/// lock briefly; the mutex is never held across an await.
pub struct BookingState {
    inner: Arc<Mutex<BookingInner>>,
    timers: Mutex<Vec<JoinHandle<()>>>,
    timeline: Vec<TimelineStep>,
}

impl BookingState {
    pub fn new(timeline: Vec<TimelineStep>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BookingInner {
                session: Session::new(),
                epoch: 0,
            })),
            timers: Mutex::new(Vec::new()),
            timeline,
        }
    }

    /// Clone the current session for the frontend.
    pub fn snapshot(&self) -> Session {
        self.inner.lock().unwrap().session.clone()
    }

    /// Start a ride search: validate the inputs, clear the previous search,
    /// and enter `Searching`. Returns the epoch the caller must hand back
    /// to [`finish_request`](Self::finish_request).
    ///
    /// Only legal from `Idle`; a request from any other phase is rejected
    /// without touching the session. Empty pickup or destination stays in
    /// `Idle` with the validation message stored as `last_error`.
    pub fn begin_request(&self, pickup: &str, destination: &str) -> Result<u64, RideMateError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.session.phase != Phase::Idle {
            return Err(RideMateError::InvalidAction(
                "A ride search can only be started from the idle screen.".to_string(),
            ));
        }

        inner.session.last_error = None;

        if pickup.trim().is_empty() || destination.trim().is_empty() {
            let msg = "Please enter both pickup and destination.".to_string();
            inner.session.last_error = Some(msg.clone());
            return Err(RideMateError::Validation(msg));
        }

        inner.epoch += 1;
        inner.session.pickup = pickup.to_string();
        inner.session.destination = destination.to_string();
        inner.session.options.clear();
        inner.session.selected = None;
        inner.session.phase = Phase::Searching;
        inner.session.requested_at = Some(chrono::Utc::now().to_rfc3339());

        info!(
            "Searching for rides from '{}' to '{}'",
            inner.session.pickup, inner.session.destination
        );
        Ok(inner.epoch)
    }

    /// Apply a provider result to the search started under `epoch`.
    ///
    /// Success stores the options and enters `Results`; failure stores the
    /// message and returns to `Idle`. A result whose epoch no longer matches
    /// (the session was reset while the call was in flight) is discarded.
    pub fn finish_request(
        &self,
        epoch: u64,
        outcome: Result<Vec<RideOption>, RideMateError>,
    ) -> Session {
        let mut inner = self.inner.lock().unwrap();

        if inner.epoch != epoch || inner.session.phase != Phase::Searching {
            warn!("Discarding stale provider result for epoch {}", epoch);
            return inner.session.clone();
        }

        match outcome {
            Ok(options) => {
                info!("Search returned {} ride options", options.len());
                inner.session.options = options;
                inner.session.phase = Phase::Results;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!("Search failed: {}", msg);
                inner.session.last_error = Some(msg);
                inner.session.phase = Phase::Idle;
            }
        }

        inner.session.clone()
    }

    /// Select one of the offered rides by its `kind` label.
    ///
    /// Only legal from `Results`, and the kind must name a member of the
    /// current option list; anything else is rejected without touching the
    /// session.
    pub fn select_ride(&self, kind: &str) -> Result<Session, RideMateError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.session.phase != Phase::Results {
            return Err(RideMateError::InvalidAction(
                "Rides can only be selected from the results list.".to_string(),
            ));
        }

        let option = inner
            .session
            .options
            .iter()
            .find(|o| o.kind == kind)
            .cloned()
            .ok_or_else(|| {
                RideMateError::InvalidAction(format!(
                    "Unknown ride option '{}': not in the current results.",
                    kind
                ))
            })?;

        info!("Selected ride option '{}'", option.kind);
        inner.session.selected = Some(option);
        Ok(inner.session.clone())
    }

    /// Confirm the selected ride and schedule the trip timeline.
    ///
    /// Enters `Confirmed` and spawns one delayed task per timeline step,
    /// each offset from the confirmation instant. Tasks carry the current
    /// epoch and fire as no-ops if the session has since been reset. Must
    /// run inside a tokio runtime.
    pub fn confirm_ride(&self) -> Result<Session, RideMateError> {
        let (snapshot, epoch) = {
            let mut inner = self.inner.lock().unwrap();

            if inner.session.phase != Phase::Results {
                return Err(RideMateError::InvalidAction(
                    "A ride can only be confirmed from the results list.".to_string(),
                ));
            }
            if inner.session.selected.is_none() {
                return Err(RideMateError::InvalidAction(
                    "Select a ride before confirming.".to_string(),
                ));
            }

            inner.session.phase = Phase::Confirmed;
            info!(
                "Confirmed ride '{}'",
                inner.session.selected.as_ref().map(|o| o.kind.as_str()).unwrap_or("")
            );
            (inner.session.clone(), inner.epoch)
        };

        let mut timers = self.timers.lock().unwrap();
        timers.retain(|h| !h.is_finished());
        for step in &self.timeline {
            let inner = Arc::clone(&self.inner);
            let step = *step;
            timers.push(tokio::spawn(async move {
                tokio::time::sleep(step.at).await;
                let mut inner = inner.lock().unwrap();
                if inner.epoch != epoch {
                    return;
                }
                info!("Trip advanced to {:?}", step.phase);
                inner.session.phase = step.phase;
            }));
        }

        Ok(snapshot)
    }

    /// Return the session to the startup state from any phase.
    ///
    /// Cancels pending trip-timeline tasks and bumps the epoch so that a
    /// task or provider completion already past the abort cannot mutate the
    /// fresh session.
    pub fn reset(&self) -> Session {
        for handle in self.timers.lock().unwrap().drain(..) {
            handle.abort();
        }

        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        inner.session = Session::new();
        info!("Session reset");
        inner.session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::timeline::ride_timeline;

    fn options() -> Vec<RideOption> {
        vec![
            RideOption {
                kind: "Eco".to_string(),
                eta: "3 min".to_string(),
                price: "$8.75".to_string(),
                description: "Compact and affordable.".to_string(),
                capacity: "1-2 passengers".to_string(),
            },
            RideOption {
                kind: "XL".to_string(),
                eta: "7 min".to_string(),
                price: "$18.00".to_string(),
                description: "Room for the whole group.".to_string(),
                capacity: "1-6 passengers".to_string(),
            },
        ]
    }

    fn state_with_results() -> BookingState {
        let state = BookingState::new(ride_timeline());
        let epoch = state.begin_request("123 Main St", "456 Oak Ave").unwrap();
        state.finish_request(epoch, Ok(options()));
        state
    }

    #[test]
    fn test_begin_request_enters_searching() {
        let state = BookingState::new(ride_timeline());
        state.begin_request("A", "B").unwrap();
        let session = state.snapshot();
        assert_eq!(session.phase, Phase::Searching);
        assert_eq!(session.pickup, "A");
        assert_eq!(session.destination, "B");
        assert!(session.last_error.is_none());
        assert!(session.requested_at.is_some());
    }

    #[test]
    fn test_begin_request_rejects_empty_input() {
        let state = BookingState::new(ride_timeline());
        let err = state.begin_request("", "456 Oak Ave").unwrap_err();
        assert!(matches!(err, RideMateError::Validation(_)));

        let session = state.snapshot();
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.last_error.is_some());
        assert!(session.pickup.is_empty());
    }

    #[test]
    fn test_begin_request_rejects_outside_idle() {
        let state = BookingState::new(ride_timeline());
        state.begin_request("A", "B").unwrap();
        let err = state.begin_request("C", "D").unwrap_err();
        assert!(matches!(err, RideMateError::InvalidAction(_)));

        // The in-flight search is untouched.
        let session = state.snapshot();
        assert_eq!(session.phase, Phase::Searching);
        assert_eq!(session.pickup, "A");
    }

    #[test]
    fn test_begin_request_clears_previous_error_and_results() {
        let state = BookingState::new(ride_timeline());
        let epoch = state.begin_request("A", "B").unwrap();
        state.finish_request(epoch, Err(RideMateError::Service("boom".to_string())));
        assert!(state.snapshot().last_error.is_some());

        state.begin_request("A", "B").unwrap();
        let session = state.snapshot();
        assert!(session.last_error.is_none());
        assert!(session.options.is_empty());
        assert!(session.selected.is_none());
    }

    #[test]
    fn test_finish_request_success_enters_results() {
        let state = BookingState::new(ride_timeline());
        let epoch = state.begin_request("A", "B").unwrap();
        let session = state.finish_request(epoch, Ok(options()));
        assert_eq!(session.phase, Phase::Results);
        assert_eq!(session.options.len(), 2);
        assert_eq!(session.options[0].kind, "Eco");
    }

    #[test]
    fn test_finish_request_failure_returns_to_idle() {
        let state = BookingState::new(ride_timeline());
        let epoch = state.begin_request("A", "B").unwrap();
        let session = state.finish_request(
            epoch,
            Err(RideMateError::Transport("connection refused".to_string())),
        );
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.options.is_empty());
        let msg = session.last_error.unwrap();
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_finish_request_discards_stale_epoch() {
        let state = BookingState::new(ride_timeline());
        let epoch = state.begin_request("A", "B").unwrap();
        state.reset();

        let session = state.finish_request(epoch, Ok(options()));
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.options.is_empty());
    }

    #[test]
    fn test_select_ride_sets_selection_only() {
        let state = state_with_results();
        let session = state.select_ride("XL").unwrap();
        assert_eq!(session.phase, Phase::Results);
        assert_eq!(session.options.len(), 2);
        assert_eq!(session.selected.unwrap().kind, "XL");
    }

    #[test]
    fn test_select_ride_replaces_previous_selection() {
        let state = state_with_results();
        state.select_ride("Eco").unwrap();
        let session = state.select_ride("XL").unwrap();
        assert_eq!(session.selected.unwrap().kind, "XL");
    }

    #[test]
    fn test_select_ride_rejects_unknown_kind() {
        let state = state_with_results();
        let err = state.select_ride("Limo").unwrap_err();
        assert!(matches!(err, RideMateError::InvalidAction(_)));
        assert!(state.snapshot().selected.is_none());
    }

    #[test]
    fn test_select_ride_rejects_outside_results() {
        let state = BookingState::new(ride_timeline());
        let err = state.select_ride("Eco").unwrap_err();
        assert!(matches!(err, RideMateError::InvalidAction(_)));
    }

    #[test]
    fn test_reset_restores_startup_session() {
        let state = state_with_results();
        state.select_ride("Eco").unwrap();

        let session = state.reset();
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.pickup.is_empty());
        assert!(session.destination.is_empty());
        assert!(session.options.is_empty());
        assert!(session.selected.is_none());
        assert!(session.last_error.is_none());
        assert!(session.requested_at.is_none());
    }
}
