//! Tool Capabilities
//!
//! The closed set of tools the planning agent may call.

mod cost_calculator;
mod train_search;
mod weather_lookup;

pub use cost_calculator::{CostCalculatorTool, CALCULATOR_TOOL};
pub use train_search::{TrainSearchTool, TRAIN_TOOL};
pub use weather_lookup::{WeatherLookupTool, WEATHER_TOOL};

use std::sync::Arc;

use agent_core::ToolRegistry;

use crate::train::TrainService;
use crate::weather::WeatherService;

/// Register every planning tool by name
pub fn travel_tools(weather: Arc<dyn WeatherService>, trains: Arc<dyn TrainService>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(CostCalculatorTool::new());
    registry.register(WeatherLookupTool::new(weather));
    registry.register(TrainSearchTool::new(trains));
    registry
}
