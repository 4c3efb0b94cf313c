//! # travel-planner
//!
//! Travel plan synthesis on top of `agent-core`: the planning tools, their
//! weather and train collaborators, and the extraction and validation stages
//! that turn model output into a [`Plan`].
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────┐   ┌──────────────┐   ┌──────────┐
//! │ PlanRequest  │──▶│ Agent: gateway ⇄ tools       │──▶│  Extractor   │──▶│ finalize │──▶ Plan
//! └──────────────┘   │ calculator / weather / train │   │ verbatim,    │   │ recompute│
//!                    └──────────────────────────────┘   │ fences, span │   │ costs    │
//!                                                       └──────────────┘   └──────────┘
//! ```
//!
//! Costs are `rust_decimal::Decimal` throughout; `daily_cost` and
//! `total_cost` are always recomputed and `budget` always comes from the
//! caller.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod money;
pub mod planner;
pub mod prompt;
pub mod svckit;
pub mod train;
pub mod weather;

pub use aggregate::finalize;
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use extract::{ExtractionStrategy, ResponseExtractor};
pub use model::{Activity, ActivityCategory, DayPlan, Plan, PlanRequest, Preferences};
pub use planner::TravelPlanner;
pub use prompt::TRAVEL_PLANNER_PROMPT;
pub use svckit::travel_tools;
pub use train::{TrainLookup, TrainService};
pub use weather::{WeatherService, WEATHER_UNKNOWN};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CostCalculatorTool, TrainSearchTool, WeatherLookupTool};
}
