use thiserror::Error;

/// Failure classes for a booking session.
///
/// Every provider failure is caught at the state-machine boundary and
/// surfaced as the session's `last_error`; nothing here is fatal to the
/// process. `InvalidAction` is the exception: it marks an action invoked
/// from a phase where it is not legal and is rejected at the command
/// boundary without touching the session.
#[derive(Debug, Error)]
pub enum RideMateError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

impl From<RideMateError> for String {
    fn from(err: RideMateError) -> Self {
        err.to_string()
    }
}
