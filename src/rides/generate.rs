use serde_json;
use tracing::{error, info, warn};

use super::prompts::{build_guided_ride_prompt, build_ride_prompt, ride_options_gemini_schema};
use super::types::RideOption;
use super::GenerationSettings;
use crate::error::RideMateError;

/// Generate ride options for a pickup/destination pair using the configured
/// AI provider.
///
/// Sends the ride prompt to the provider, extracts the generated text from
/// the provider's response envelope, and decodes it into a validated list of
/// ride options. One best-effort round trip: no retry, no caching, and no
/// timeout beyond whatever the service imposes.
///
/// # Errors
/// - `Configuration`: missing API key or unsupported provider name
/// - `Transport`: the request never got a usable HTTP response
/// - `Service`: non-2xx status or an unusable response envelope
/// - `MalformedResponse`: the generated text is not a JSON array of
///   complete ride options
pub async fn generate_ride_options(
    client: &reqwest::Client,
    pickup: &str,
    destination: &str,
    settings: &GenerationSettings,
) -> Result<Vec<RideOption>, RideMateError> {
    info!(
        "Generating ride options from '{}' to '{}' via provider '{}' model '{}'",
        pickup, destination, settings.provider, settings.model
    );

    let response_text = match settings.provider.as_str() {
        "gemini" => {
            call_gemini(client, require_api_key(settings)?, &settings.model, pickup, destination)
                .await?
        }
        "claude" => {
            call_claude(client, require_api_key(settings)?, &settings.model, pickup, destination)
                .await?
        }
        "openai" => {
            call_openai(client, require_api_key(settings)?, &settings.model, pickup, destination)
                .await?
        }
        other => {
            let msg = format!(
                "Unsupported AI provider: '{}'. Supported: gemini, claude, openai",
                other
            );
            error!("{}", msg);
            return Err(RideMateError::Configuration(msg));
        }
    };

    let options = decode_ride_options(&response_text)?;
    info!(
        "Provider '{}' returned {} ride options",
        settings.provider,
        options.len()
    );
    Ok(options)
}

fn require_api_key(settings: &GenerationSettings) -> Result<&str, RideMateError> {
    settings.api_key.as_deref().ok_or_else(|| {
        let msg = format!(
            "No API key configured for AI provider '{}'. Add one in Settings.",
            settings.provider
        );
        error!("{}", msg);
        RideMateError::Configuration(msg)
    })
}

/// Decode generated text into a ride option list.
///
/// The external schema enforcement is not trusted on its own: the text must
/// parse as JSON, the top level must be an array, and every element must
/// carry the five required string fields. Markdown code fences are stripped
/// first; providers without a native JSON mode like to wrap their output.
pub fn decode_ride_options(text: &str) -> Result<Vec<RideOption>, RideMateError> {
    let cleaned = strip_markdown_json(text);

    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|e| {
        let msg = format!(
            "Generated text is not valid JSON: {}. Raw response (first 500 chars): {}",
            e,
            truncate(&cleaned, 500)
        );
        error!("{}", msg);
        RideMateError::MalformedResponse(msg)
    })?;

    if !value.is_array() {
        let msg = format!(
            "Expected a JSON array of ride options, got: {}",
            truncate(&cleaned, 200)
        );
        error!("{}", msg);
        return Err(RideMateError::MalformedResponse(msg));
    }

    let options: Vec<RideOption> = serde_json::from_value(value).map_err(|e| {
        let msg = format!("Ride option list does not match the schema: {}", e);
        error!("{}", msg);
        RideMateError::MalformedResponse(msg)
    })?;

    if options.is_empty() {
        warn!("Provider returned an empty ride option list");
    }

    Ok(options)
}

/// Strip markdown code fences from generated text if present.
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let after_open = match trimmed.find('\n') {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed,
        };
        let cleaned = after_open.trim_end();
        if let Some(body) = cleaned.strip_suffix("```") {
            body.trim().to_string()
        } else {
            cleaned.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}

/// Check status and extract the body text from a provider response.
async fn handle_api_response(
    response: reqwest::Response,
    provider: &str,
) -> Result<String, RideMateError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let msg = format!(
            "Generation API error: {} from {} - {}",
            status,
            provider,
            truncate(&body, 1024)
        );
        error!("{}", msg);
        return Err(RideMateError::Service(msg));
    }
    response.text().await.map_err(|e| {
        RideMateError::Service(format!(
            "Failed to read API response body from {}: {}",
            provider, e
        ))
    })
}

fn send_error(provider: &str, e: reqwest::Error) -> RideMateError {
    let msg = format!("Generation request failed for {}: {}", provider, e);
    error!("{}", msg);
    RideMateError::Transport(msg)
}

/// Call the Gemini generateContent API with native structured output.
/// Gemini accepts an array-rooted response schema, so the option list shape
/// is enforced by the service itself.
async fn call_gemini(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    pickup: &str,
    destination: &str,
) -> Result<String, RideMateError> {
    let body = serde_json::json!({
        "contents": [
            {"parts": [{"text": build_ride_prompt(pickup, destination)}]}
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": ride_options_gemini_schema()
        }
    });

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
        model
    );

    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("gemini", e))?;

    let body_text = handle_api_response(response, "gemini").await?;

    // Gemini envelope: { "candidates": [{"content": {"parts": [{"text": "..."}]}}] }
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse Gemini API response wrapper: {}", e);
        error!("{}", msg);
        RideMateError::Service(msg)
    })?;

    resp_json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No text content in Gemini API response".to_string();
            error!("{}", msg);
            RideMateError::Service(msg)
        })
}

/// Call the Anthropic Claude API.
/// Anthropic has no array-rooted structured output mode, so the schema goes
/// into the prompt and the system prompt pins the output to bare JSON.
async fn call_claude(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    pickup: &str,
    destination: &str,
) -> Result<String, RideMateError> {
    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "system": "You are a ride option generation assistant. Always respond with a valid JSON array only, no markdown formatting or code blocks.",
        "messages": [
            {"role": "user", "content": build_guided_ride_prompt(pickup, destination)}
        ]
    });

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("claude", e))?;

    let body_text = handle_api_response(response, "claude").await?;

    // Anthropic envelope: { "content": [{"type": "text", "text": "..."}] }
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse Claude API response wrapper: {}", e);
        error!("{}", msg);
        RideMateError::Service(msg)
    })?;

    resp_json["content"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No text content in Claude API response".to_string();
            error!("{}", msg);
            RideMateError::Service(msg)
        })
}

/// Call the OpenAI chat completions API.
/// Strict json_schema mode requires an object root and the ride list is a
/// bare array, so schema guidance goes in the prompt here too.
async fn call_openai(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    pickup: &str,
    destination: &str,
) -> Result<String, RideMateError> {
    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "messages": [
            {"role": "system", "content": "You are a ride option generation assistant. Always respond with a valid JSON array only, no markdown formatting or code blocks."},
            {"role": "user", "content": build_guided_ride_prompt(pickup, destination)}
        ]
    });

    let response = client
        .post("https://api.openai.com/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("openai", e))?;

    let body_text = handle_api_response(response, "openai").await?;

    // OpenAI envelope: { "choices": [{"message": {"content": "..."}}] }
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse OpenAI API response wrapper: {}", e);
        error!("{}", msg);
        RideMateError::Service(msg)
    })?;

    resp_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No content in OpenAI API response".to_string();
            error!("{}", msg);
            RideMateError::Service(msg)
        })
}
