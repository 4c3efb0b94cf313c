//! Train Ticket Integration
//!
//! Timetable and fare lookup between two cities on a date.

mod jisu;
mod mock;

pub use jisu::{JisuTrainClient, JISU_TRAIN_URL};
pub use mock::StaticTrainService;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A seat class on one train
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    #[serde(rename = "type")]
    pub class: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub train_no: String,
    #[serde(rename = "type")]
    pub train_type: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub seats: Vec<Seat>,
    pub can_buy: bool,
}

impl Train {
    pub fn available_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.available)
    }
}

/// Trains between two cities on one date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainSchedule {
    pub start: String,
    pub end: String,
    pub date: String,
    pub trains: Vec<Train>,
}

/// Wire envelope: `{success, data}` or `{success, error}`
#[derive(Clone, Debug, Serialize)]
pub struct TrainLookup {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TrainSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<TrainSchedule>> for TrainLookup {
    fn from(result: Result<TrainSchedule>) -> Self {
        match result {
            Ok(schedule) => Self {
                success: true,
                data: Some(schedule),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Train client trait (Strategy pattern)
#[async_trait]
pub trait TrainService: Send + Sync {
    async fn tickets(&self, start: &str, end: &str, date: NaiveDate) -> Result<TrainSchedule>;

    /// Lookup folded into the wire envelope
    async fn lookup(&self, start: &str, end: &str, date: NaiveDate) -> TrainLookup {
        self.tickets(start, end, date).await.into()
    }

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    #[test]
    fn test_lookup_envelope() {
        let ok = TrainLookup::from(Ok(TrainSchedule {
            start: "杭州".into(),
            end: "北京".into(),
            date: "2025-03-01".into(),
            trains: vec![],
        }));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());

        let failed = TrainLookup::from(Err(PlannerError::Train("quota exceeded".into())));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert!(value["error"].as_str().unwrap().contains("quota exceeded"));
    }
}
