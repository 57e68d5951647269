use serde_json;

/// Return the JSON schema for the generated ride option list.
/// Standard JSON Schema form: an array of objects with five required
/// string fields. Used as prompt guidance for providers without an
/// array-rooted structured output mode.
pub fn ride_options_json_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "The type of ride (e.g., \"Eco\", \"Comfort\", \"XL\")."
                },
                "eta": {
                    "type": "string",
                    "description": "Estimated time of arrival for the ride in minutes."
                },
                "price": {
                    "type": "string",
                    "description": "The estimated price for the ride in USD (e.g., \"$12.50\")."
                },
                "description": {
                    "type": "string",
                    "description": "A brief, appealing description of the ride type."
                },
                "capacity": {
                    "type": "string",
                    "description": "The passenger capacity, e.g., \"1-2 passengers\"."
                }
            },
            "required": ["type", "eta", "price", "description", "capacity"],
            "additionalProperties": false
        }
    })
}

/// Return the same schema in Gemini's structured-output dialect.
/// Gemini takes OpenAPI-style uppercase type names and accepts an array
/// at the root, so the response is constrained natively instead of
/// through the prompt.
pub fn ride_options_gemini_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": {
                    "type": "STRING",
                    "description": "The type of ride (e.g., \"Eco\", \"Comfort\", \"XL\")."
                },
                "eta": {
                    "type": "STRING",
                    "description": "Estimated time of arrival for the ride in minutes."
                },
                "price": {
                    "type": "STRING",
                    "description": "The estimated price for the ride in USD (e.g., \"$12.50\")."
                },
                "description": {
                    "type": "STRING",
                    "description": "A brief, appealing description of the ride type."
                },
                "capacity": {
                    "type": "STRING",
                    "description": "The passenger capacity, e.g., \"1-2 passengers\"."
                }
            },
            "required": ["type", "eta", "price", "description", "capacity"]
        }
    })
}

/// Return a compact text version of the schema for embedding in prompts.
pub fn ride_options_schema_text() -> String {
    serde_json::to_string_pretty(&ride_options_json_schema()).unwrap_or_else(|_| "{}".to_string())
}

/// Build the ride generation prompt. The pickup and destination strings are
/// embedded verbatim; they are display text, not addresses to geocode.
pub fn build_ride_prompt(pickup: &str, destination: &str) -> String {
    format!(
        r#"You are an API for a ridesharing app called "RideMate".
A user wants to find a ride from "{pickup}" to "{destination}".
Generate 3 realistic and distinct ride options for them.
Provide varied ETAs between 2 and 10 minutes.
Prices should be reasonable for a rideshare app.
Keep descriptions short and enticing.
Follow the provided JSON schema precisely."#
    )
}

/// Build the prompt variant for providers that enforce the schema through
/// the prompt rather than a native structured-output mode.
pub fn build_guided_ride_prompt(pickup: &str, destination: &str) -> String {
    format!(
        "{}\n\nReturn a JSON array matching this schema:\n{}\n\nRespond with the JSON array only, without markdown or commentary.",
        build_ride_prompt(pickup, destination),
        ride_options_schema_text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_locations_verbatim() {
        let prompt = build_ride_prompt("123 Main St", "456 Oak Ave");
        assert!(prompt.contains("\"123 Main St\""));
        assert!(prompt.contains("\"456 Oak Ave\""));
        assert!(prompt.contains("3 realistic and distinct ride options"));
    }

    #[test]
    fn test_guided_prompt_includes_schema() {
        let prompt = build_guided_ride_prompt("A", "B");
        assert!(prompt.contains("\"required\""));
        assert!(prompt.contains("\"capacity\""));
        assert!(prompt.contains("JSON array only"));
    }

    #[test]
    fn test_schema_requires_all_five_fields() {
        let schema = ride_options_json_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(names, ["type", "eta", "price", "description", "capacity"]);
    }

    #[test]
    fn test_gemini_schema_is_array_rooted() {
        let schema = ride_options_gemini_schema();
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(schema["items"]["type"], "OBJECT");
        assert_eq!(schema["items"]["properties"]["eta"]["type"], "STRING");
    }
}
