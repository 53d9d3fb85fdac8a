//! Weather lookup tool backed by a static table.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::Result;
use crate::tools::tool::{required_str, Tool};

/// Known cities, each with its accepted names, and their conditions
const FORECASTS: &[(&[&str], &str)] = &[
    (&["Beijing", "北京"], "Sunny, 25°C"),
    (&["Shanghai", "上海"], "Cloudy, 22°C"),
    (&["Shenzhen", "深圳"], "Light rain, 28°C"),
];

/// Find the forecast for a city. ASCII names match case-insensitively.
pub fn lookup(city: &str) -> Option<&'static str> {
    let city = city.trim();
    FORECASTS
        .iter()
        .find(|(names, _)| names.iter().any(|name| name.eq_ignore_ascii_case(city)))
        .map(|(_, forecast)| *forecast)
}

/// Text returned for a city missing from the table
pub fn unavailable(city: &str) -> String {
    format!("Weather information for {} is currently unavailable", city)
}

/// Tool for looking up the weather in a city
#[derive(Debug, Clone, Default)]
pub struct WeatherTool;

impl WeatherTool {
    /// Create a new weather tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. 'Beijing' or 'Shanghai'"
                }
            },
            "required": ["city"]
        })
    }

    async fn invoke(&self, args: &Value) -> Result<String> {
        let city = required_str(args, "city")?;
        Ok(lookup(city)
            .map(str::to_string)
            .unwrap_or_else(|| unavailable(city.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_cities() {
        assert_eq!(lookup("Beijing"), Some("Sunny, 25°C"));
        assert_eq!(lookup("北京"), Some("Sunny, 25°C"));
        assert_eq!(lookup("  shanghai "), Some("Cloudy, 22°C"));
        assert_eq!(lookup("深圳"), Some("Light rain, 28°C"));
    }

    #[test]
    fn test_lookup_unknown_city() {
        assert_eq!(lookup("Tokyo"), None);
    }

    #[tokio::test]
    async fn test_weather_tool_unknown_city_mentions_city() {
        let result = WeatherTool::new()
            .invoke(&json!({"city": "Tokyo"}))
            .await
            .unwrap();
        assert_eq!(result, "Weather information for Tokyo is currently unavailable");
    }
}
