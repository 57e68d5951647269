use tauri::{AppHandle, State};
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::booking::{run_ride_request, BookingState, Session};
use crate::rides::{GenerationSettings, GenerativeRideProvider, SharedHttpClient};

/// Get the configured AI provider from preferences, defaulting to "gemini".
fn get_ai_provider(app: &AppHandle) -> Result<String, String> {
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open preferences store: {}", e);
        e.to_string()
    })?;
    let provider = store
        .get("ai_provider")
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "gemini".to_string());
    Ok(provider)
}

/// Get the configured AI model from preferences, defaulting to "gemini-2.5-flash".
fn get_ai_model(app: &AppHandle) -> Result<String, String> {
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open preferences store: {}", e);
        e.to_string()
    })?;
    let model = store
        .get("ai_model")
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "gemini-2.5-flash".to_string());
    Ok(model)
}

/// Resolve the generation settings for one search. A missing API key is not
/// an error here; the provider surfaces it as a failed search so the
/// session returns to idle with an actionable message.
fn generation_settings(app: &AppHandle) -> Result<GenerationSettings, String> {
    let provider = get_ai_provider(app)?;
    let model = get_ai_model(app)?;
    let api_key = super::settings::lookup_api_key(&provider);
    Ok(GenerationSettings {
        provider,
        model,
        api_key,
    })
}

/// Search for rides between two user-entered locations.
///
/// Runs the full round trip: the session enters `SEARCHING`, the generative
/// provider fabricates the option list, and the session lands in `RESULTS`
/// (or back in `IDLE` with `last_error` set). Validation failures are
/// returned inside the session; calling this outside `IDLE` is a command
/// error.
#[tauri::command]
pub async fn request_ride(
    app: AppHandle,
    state: State<'_, BookingState>,
    http: State<'_, SharedHttpClient>,
    pickup: String,
    destination: String,
) -> Result<Session, String> {
    info!("request_ride called: '{}' -> '{}'", pickup, destination);

    let settings = generation_settings(&app)?;
    let provider = GenerativeRideProvider::new(http.client(), settings);

    run_ride_request(&state, &provider, &pickup, &destination)
        .await
        .map_err(String::from)
}

/// Select one of the offered rides by its type label.
#[tauri::command]
pub fn select_ride(state: State<'_, BookingState>, kind: String) -> Result<Session, String> {
    info!("select_ride called: '{}'", kind);
    state.select_ride(&kind).map_err(String::from)
}

/// Confirm the selected ride and start the scripted trip progression.
/// Async so the timeline tasks are spawned on the runtime that drives the
/// command.
#[tauri::command]
pub async fn confirm_ride(state: State<'_, BookingState>) -> Result<Session, String> {
    info!("confirm_ride called");
    state.confirm_ride().map_err(String::from)
}

/// Return the session to the startup state, cancelling any pending trip
/// progression.
#[tauri::command]
pub fn reset_booking(state: State<'_, BookingState>) -> Result<Session, String> {
    info!("reset_booking called");
    Ok(state.reset())
}

/// Snapshot the current session. The frontend polls this to observe the
/// search in flight and the timer-driven trip phases.
#[tauri::command]
pub fn get_booking_session(state: State<'_, BookingState>) -> Result<Session, String> {
    Ok(state.snapshot())
}
