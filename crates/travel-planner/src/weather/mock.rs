//! Static Weather Service
//!
//! For testing and demo purposes. Returns fixed forecasts without network access.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{clamp_days, WeatherService};

const DEMO_SKIES: [&str; 4] = ["sunny", "partly cloudy", "overcast", "light rain"];

/// Weather service with canned forecasts
#[derive(Default)]
pub struct StaticWeatherService {
    overrides: HashMap<String, String>,
}

impl StaticWeatherService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `forecast` for `city` with fixed text regardless of `days`
    pub fn with_city(mut self, city: impl Into<String>, forecast: impl Into<String>) -> Self {
        self.overrides.insert(city.into(), forecast.into());
        self
    }
}

#[async_trait]
impl WeatherService for StaticWeatherService {
    async fn forecast(&self, city: &str, days: u32) -> String {
        if let Some(text) = self.overrides.get(city.trim()) {
            return text.clone();
        }

        (1..=clamp_days(days))
            .zip(DEMO_SKIES.iter().cycle())
            .map(|(day, sky)| format!("Day {}: {}, 8-18°C, light breeze", day, sky))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn name(&self) -> &str {
        "static"
    }
}
