//! Static Train Service
//!
//! For testing and demo purposes. Returns a fixed pair of trains for any route.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::{Seat, Train, TrainSchedule, TrainService};
use crate::error::{PlannerError, Result};

/// Train service with canned timetables
#[derive(Default)]
pub struct StaticTrainService {
    trains: Option<Vec<Train>>,
    failure: Option<String>,
}

impl StaticTrainService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve exactly these trains
    pub fn with_trains(mut self, trains: Vec<Train>) -> Self {
        self.trains = Some(trains);
        self
    }

    /// Fail every lookup with this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            trains: None,
            failure: Some(message.into()),
        }
    }

    fn demo_trains(start: &str, end: &str) -> Vec<Train> {
        vec![
            Train {
                train_no: "G36".into(),
                train_type: "G".into(),
                departure_station: format!("{} East", start),
                arrival_station: format!("{} South", end),
                departure_time: "14:05".into(),
                arrival_time: "18:50".into(),
                duration: "4h45m".into(),
                seats: vec![
                    Seat { class: "second class".into(), price: dec!(662), available: true },
                    Seat { class: "first class".into(), price: dec!(1058), available: false },
                ],
                can_buy: true,
            },
            Train {
                train_no: "G20".into(),
                train_type: "G".into(),
                departure_station: format!("{} East", start),
                arrival_station: format!("{} South", end),
                departure_time: "07:00".into(),
                arrival_time: "11:38".into(),
                duration: "4h38m".into(),
                seats: vec![
                    Seat { class: "second class".into(), price: dec!(649), available: true },
                    Seat { class: "business".into(), price: dec!(2111), available: true },
                ],
                can_buy: true,
            },
        ]
    }
}

#[async_trait]
impl TrainService for StaticTrainService {
    async fn tickets(&self, start: &str, end: &str, date: NaiveDate) -> Result<TrainSchedule> {
        if let Some(message) = &self.failure {
            return Err(PlannerError::Train(message.clone()));
        }

        Ok(TrainSchedule {
            start: start.into(),
            end: end.into(),
            date: date.format("%Y-%m-%d").to_string(),
            trains: self
                .trains
                .clone()
                .unwrap_or_else(|| Self::demo_trains(start, end)),
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}
