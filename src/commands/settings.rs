use keyring::Entry;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

/// Map an AI provider name to its keychain service name.
fn keychain_service(provider: &str) -> Result<&'static str, String> {
    match provider {
        "gemini" => Ok("ridemate-gemini-api"),
        "claude" => Ok("ridemate-claude-api"),
        "openai" => Ok("ridemate-openai-api"),
        _ => Err(format!(
            "Unknown AI provider: '{}'. Supported: gemini, claude, openai",
            provider
        )),
    }
}

/// Environment variable consulted when the keychain has no key for the
/// provider. The original deployment sourced its credential from the
/// environment, so headless setups keep working without a keychain.
fn api_key_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("GEMINI_API_KEY"),
        "claude" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Resolve the API key for a provider: keychain first, environment second.
/// Returns `None` when neither has one; the search then fails with a
/// configuration error rather than the lookup itself failing.
pub(crate) fn lookup_api_key(provider: &str) -> Option<String> {
    match keychain_service(provider) {
        Ok(service) => match Entry::new(service, "ridemate") {
            Ok(entry) => match entry.get_password() {
                Ok(key) => return Some(key),
                Err(keyring::Error::NoEntry) => {
                    info!("No keychain entry for provider '{}'", provider);
                }
                Err(e) => {
                    warn!("Failed to read API key for '{}': {}", provider, e);
                }
            },
            Err(e) => {
                warn!("Failed to open keyring entry for '{}': {}", provider, e);
            }
        },
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    }

    api_key_env_var(provider).and_then(|var| std::env::var(var).ok())
}

#[tauri::command]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    info!("Setting API key for provider: {}", provider);
    let entry = Entry::new(keychain_service(provider)?, "ridemate").map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", provider, e);
        e.to_string()
    })?;
    entry.set_password(key).map_err(|e| {
        warn!("Failed to set password for {}: {}", provider, e);
        e.to_string()
    })
}

#[tauri::command]
pub fn get_api_key(provider: &str) -> Result<Option<String>, String> {
    info!("Getting API key for provider: {}", provider);
    let entry = Entry::new(keychain_service(provider)?, "ridemate").map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", provider, e);
        e.to_string()
    })?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            info!("No API key found for provider: {}", provider);
            Ok(None)
        }
        Err(e) => {
            warn!("Failed to get password for {}: {}", provider, e);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    info!("Deleting API key for provider: {}", provider);
    let entry = Entry::new(keychain_service(provider)?, "ridemate").map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", provider, e);
        e.to_string()
    })?;
    entry.delete_credential().map_err(|e| {
        warn!("Failed to delete credential for {}: {}", provider, e);
        e.to_string()
    })
}

#[tauri::command]
pub fn get_preference(app: AppHandle, key: &str) -> Result<Option<String>, String> {
    info!("Getting preference: {}", key);
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open store: {}", e);
        e.to_string()
    })?;
    let value = store.get(key).and_then(|v| v.as_str().map(|s| s.to_string()));
    Ok(value)
}

#[tauri::command]
pub fn set_preference(app: AppHandle, key: &str, value: &str) -> Result<(), String> {
    info!("Setting preference: {} = {}", key, value);
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open store: {}", e);
        e.to_string()
    })?;
    store.set(key, serde_json::json!(value));
    store.save().map_err(|e| {
        warn!("Failed to save store: {}", e);
        e.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keychain_service_known_providers() {
        assert_eq!(keychain_service("gemini").unwrap(), "ridemate-gemini-api");
        assert_eq!(keychain_service("claude").unwrap(), "ridemate-claude-api");
        assert_eq!(keychain_service("openai").unwrap(), "ridemate-openai-api");
    }

    #[test]
    fn test_keychain_service_unknown_provider() {
        let err = keychain_service("llama").unwrap_err();
        assert!(err.contains("Unknown AI provider"));
        assert!(err.contains("llama"));
    }

    #[test]
    fn test_api_key_env_var_mapping() {
        assert_eq!(api_key_env_var("gemini"), Some("GEMINI_API_KEY"));
        assert_eq!(api_key_env_var("claude"), Some("ANTHROPIC_API_KEY"));
        assert_eq!(api_key_env_var("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(api_key_env_var("llama"), None);
    }
}
