//! Application State

use std::sync::Arc;

use travel_planner::{TrainService, TravelPlanner, WeatherService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Synthesis pipeline (gateway, tools, extractor)
    pub planner: Arc<TravelPlanner>,

    /// Weather collaborator, shared with the planner's tools
    pub weather: Arc<dyn WeatherService>,

    /// Train collaborator, shared with the planner's tools
    pub trains: Arc<dyn TrainService>,

    /// Configured chat providers, in fallback order
    pub providers: Arc<Vec<String>>,
}
