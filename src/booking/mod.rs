//! The booking state machine.
//!
//! Owns all session state and the transition rules between phases: one
//! search at a time, selection and confirmation from the results list, and
//! a scripted, cancellable trip timeline after confirmation.

pub mod session;
pub mod state;
pub mod timeline;

pub use session::{Phase, Session};
pub use state::BookingState;
pub use timeline::{ride_timeline, TimelineStep};

use crate::error::RideMateError;
use crate::rides::RideOptionProvider;

/// Run one full ride search: enter `Searching`, await the provider, and
/// apply the outcome.
///
/// Validation failures are session state, not command errors: the returned
/// session carries them in `last_error` with the phase still `Idle`.
/// Requests from a phase other than `Idle` are rejected as errors without
/// touching the session, and the provider is never invoked for a rejected
/// request.
pub async fn run_ride_request(
    state: &BookingState,
    provider: &dyn RideOptionProvider,
    pickup: &str,
    destination: &str,
) -> Result<Session, RideMateError> {
    let epoch = match state.begin_request(pickup, destination) {
        Ok(epoch) => epoch,
        Err(RideMateError::Validation(_)) => return Ok(state.snapshot()),
        Err(e) => return Err(e),
    };

    let outcome = provider.fetch_ride_options(pickup, destination).await;
    Ok(state.finish_request(epoch, outcome))
}
