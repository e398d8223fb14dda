//! Location tool resolving a few descriptive phrases to city names.

use crate::error::ToolError;
use crate::types::{Tool, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;

/// Known phrases, lowercase.
const KNOWN_LOCATIONS: &[(&str, &str)] = &[
    ("the capital of spain", "Madrid"),
    ("the capital of france", "Paris"),
    ("the city with the eiffel tower", "Paris"),
];

/// Resolve a descriptive query to a city name (case-insensitive exact match).
pub fn find_location(location_query: &str) -> String {
    let key = location_query.to_lowercase();
    KNOWN_LOCATIONS
        .iter()
        .find(|(phrase, _)| *phrase == key)
        .map(|(_, city)| city.to_string())
        .unwrap_or_else(|| format!("Sorry, I couldn't find a city for '{}'.", location_query))
}

/// Tool to find a specific city name from a general query.
pub struct LocationTool {
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct LocationArgs {
    location_query: String,
}

impl LocationTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "find_location",
                "Finds a specific city name based on a descriptive query (e.g., 'capital of France'). Use this first if the user doesn't provide a specific city name.",
            )
            .with_input(
                "location_query",
                "string",
                "The general query for a location, e.g., 'the capital of Spain'",
            ),
        }
    }
}

impl Default for LocationTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LocationTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn progress_message(&self, arguments: &str) -> Option<String> {
        let args: LocationArgs = serde_json::from_str(arguments).ok()?;
        Some(format!(
            "--- LocationTool running: Finding location for '{}' ---",
            args.location_query
        ))
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: LocationArgs = serde_json::from_str(arguments)?;
        Ok(find_location(&args.location_query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_phrases_case_insensitive() {
        assert_eq!(find_location("The Capital Of France"), "Paris");
        assert_eq!(find_location("the capital of spain"), "Madrid");
        assert_eq!(find_location("THE CITY WITH THE EIFFEL TOWER"), "Paris");
    }

    #[test]
    fn test_unknown_query_echoed() {
        assert_eq!(
            find_location("Capital of France"),
            "Sorry, I couldn't find a city for 'Capital of France'."
        );
        assert_eq!(find_location(""), "Sorry, I couldn't find a city for ''.");
    }

    #[tokio::test]
    async fn test_execute() {
        let tool = LocationTool::new();
        let result = tool
            .execute(r#"{"location_query": "the capital of Spain"}"#)
            .await
            .unwrap();
        assert_eq!(result, "Madrid");
    }

    #[test]
    fn test_descriptor() {
        let tool = LocationTool::new();
        assert_eq!(tool.name(), "find_location");
        assert!(tool.descriptor().inputs.contains_key("location_query"));
        assert_eq!(tool.definition().function.parameters["required"][0], "location_query");
    }
}
