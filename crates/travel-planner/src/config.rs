//! Planner Configuration
//!
//! Loop limits and collaborator credentials, read once at startup.

use std::sync::Arc;
use std::time::Duration;

use crate::train::{JisuTrainClient, StaticTrainService, TrainService};
use crate::weather::{AmapWeatherClient, StaticWeatherService, WeatherService};

#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub max_iterations: usize,
    pub tool_timeout: Duration,
    pub amap_api_key: Option<String>,
    pub jisu_api_key: Option<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tool_timeout: Duration::from_secs(30),
            amap_api_key: None,
            jisu_api_key: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str| var(key).and_then(|v| v.parse::<u64>().ok()).filter(|n| *n > 0);
        let defaults = Self::default();

        Self {
            max_iterations: number("AGENT_MAX_ITERATIONS")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.max_iterations),
            tool_timeout: number("TOOL_TIMEOUT_SECS").map_or(defaults.tool_timeout, Duration::from_secs),
            amap_api_key: var("AMAP_API_KEY"),
            jisu_api_key: var("JISU_API_KEY"),
        }
    }

    /// AMap when a key is configured, static forecasts otherwise
    pub fn weather_service(&self) -> Arc<dyn WeatherService> {
        if let Some(key) = &self.amap_api_key {
            match AmapWeatherClient::new(key.clone()) {
                Ok(client) => return Arc::new(client),
                Err(e) => tracing::warn!(error = %e, "Could not create AMap client"),
            }
        } else {
            tracing::warn!("AMAP_API_KEY not set; using static weather data");
        }
        Arc::new(StaticWeatherService::new())
    }

    /// JiSu when a key is configured, static timetables otherwise
    pub fn train_service(&self) -> Arc<dyn TrainService> {
        if let Some(key) = &self.jisu_api_key {
            match JisuTrainClient::new(key.clone()) {
                Ok(client) => return Arc::new(client),
                Err(e) => tracing::warn!(error = %e, "Could not create JiSu client"),
            }
        } else {
            tracing::warn!("JISU_API_KEY not set; using static train data");
        }
        Arc::new(StaticTrainService::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert!(config.amap_api_key.is_none());
        assert_eq!(config.weather_service().name(), "static");
        assert_eq!(config.train_service().name(), "static");
    }

    #[test]
    fn test_overrides() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("AGENT_MAX_ITERATIONS", "4"),
            ("TOOL_TIMEOUT_SECS", "5"),
            ("AMAP_API_KEY", "amap"),
            ("JISU_API_KEY", "  "),
        ]));
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.tool_timeout, Duration::from_secs(5));
        assert_eq!(config.weather_service().name(), "amap");
        assert_eq!(config.train_service().name(), "static");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("AGENT_MAX_ITERATIONS", "0"),
            ("TOOL_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
    }
}
