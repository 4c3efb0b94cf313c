//! Error Types for Travel Planner

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Error, Debug)]
pub enum PlannerError {
    /// No extraction strategy recovered a structured document
    #[error("Could not extract a structured plan: {0}")]
    Extraction(String),

    /// Required nested fields missing or non-numeric
    #[error("Schema error at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Weather lookup failed: {0}")]
    Weather(String),

    #[error("Train lookup failed: {0}")]
    Train(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl PlannerError {
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Terminal failures of the synthesis pipeline
    pub fn is_synthesis_failure(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Schema { .. })
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Extraction(_) | Self::Schema { .. } => {
                "The travel plan could not be generated. Please try again later.".into()
            }
            Self::InvalidRequest(msg) => format!("Invalid request: {}", msg),
            Self::Weather(_) => "Weather information is currently unavailable.".into(),
            Self::Train(msg) => format!("Train ticket lookup failed: {}", msg),
            Self::Agent(e) => e.user_message(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
