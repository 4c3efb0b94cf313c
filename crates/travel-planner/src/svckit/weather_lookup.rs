//! Weather Lookup Tool
//!
//! Exposes a [`WeatherService`] to the model as `weather_service`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use agent_core::{tool::parse_arguments, AgentError, ParameterSchema, Result as CoreResult, Tool, ToolSchema};

use crate::weather::{clamp_days, WeatherService};

pub const WEATHER_TOOL: &str = "weather_service";

const DEFAULT_DAYS: u32 = 3;

#[derive(Deserialize)]
struct WeatherInput {
    city: String,
    #[serde(default)]
    days: Option<Value>,
}

pub struct WeatherLookupTool {
    weather: Arc<dyn WeatherService>,
}

impl WeatherLookupTool {
    pub fn new(weather: Arc<dyn WeatherService>) -> Self {
        Self { weather }
    }

    fn parse(arguments: &str) -> CoreResult<WeatherInput> {
        // Models often emit dict-style single quotes
        parse_arguments(WEATHER_TOOL, arguments).or_else(|e| {
            if arguments.contains('\'') {
                parse_arguments(WEATHER_TOOL, &arguments.replace('\'', "\""))
            } else {
                Err(e)
            }
        })
    }
}

fn requested_days(days: Option<&Value>) -> u32 {
    let days = match days {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    days.and_then(|d| u32::try_from(d).ok()).map_or(DEFAULT_DAYS, clamp_days)
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: WEATHER_TOOL.into(),
            description: "Look up the weather forecast for a city over the next few days.".into(),
            parameters: vec![
                ParameterSchema::required("city", "string", "City name, e.g. Beijing or 北京"),
                ParameterSchema::optional("days", "integer", "Number of forecast days (1-4)", DEFAULT_DAYS.into()),
            ],
            example: Some(r#"{"city": "Beijing", "days": 3}"#.into()),
        }
    }

    async fn invoke(&self, arguments: &str) -> CoreResult<String> {
        let input = Self::parse(arguments)?;
        let city = input.city.trim();
        if city.is_empty() {
            return Err(AgentError::ToolValidation("city must not be empty".into()));
        }

        Ok(self.weather.forecast(city, requested_days(input.days.as_ref())).await)
    }
}
