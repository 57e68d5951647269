pub mod booking;
mod commands;
mod error;
pub mod rides;

pub use booking::{ride_timeline, BookingState, Phase, Session};
pub use error::RideMateError;
pub use rides::{GenerationSettings, GenerativeRideProvider, RideOption, RideOptionProvider};

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(booking::BookingState::new(booking::ride_timeline()))
        .manage(rides::SharedHttpClient::new())
        .invoke_handler(tauri::generate_handler![
            commands::booking::request_ride,
            commands::booking::select_ride,
            commands::booking::confirm_ride,
            commands::booking::reset_booking,
            commands::booking::get_booking_session,
            commands::settings::set_api_key,
            commands::settings::get_api_key,
            commands::settings::delete_api_key,
            commands::settings::get_preference,
            commands::settings::set_preference,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
