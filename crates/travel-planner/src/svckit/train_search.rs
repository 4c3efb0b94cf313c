//! Train Ticket Search Tool
//!
//! Exposes a [`TrainService`] to the model as `train_ticket_search`.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use agent_core::{tool::parse_arguments, AgentError, ParameterSchema, Result as CoreResult, Tool, ToolSchema};

use crate::train::{TrainSchedule, TrainService};

pub const TRAIN_TOOL: &str = "train_ticket_search";

#[derive(Deserialize)]
struct TrainInput {
    start: String,
    end: String,
    date: String,
}

pub struct TrainSearchTool {
    trains: Arc<dyn TrainService>,
}

impl TrainSearchTool {
    pub fn new(trains: Arc<dyn TrainService>) -> Self {
        Self { trains }
    }
}

#[async_trait]
impl Tool for TrainSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TRAIN_TOOL.into(),
            description: "Search train tickets between two cities: train numbers, departure and arrival times, fares and seat availability.".into(),
            parameters: vec![
                ParameterSchema::required("start", "string", "Departure city"),
                ParameterSchema::required("end", "string", "Arrival city"),
                ParameterSchema::required("date", "string", "Travel date, YYYY-MM-DD"),
            ],
            example: Some(r#"{"start": "杭州", "end": "北京", "date": "2025-03-01"}"#.into()),
        }
    }

    async fn invoke(&self, arguments: &str) -> CoreResult<String> {
        let input: TrainInput = parse_arguments(TRAIN_TOOL, arguments)?;

        if input.start.trim().is_empty() || input.end.trim().is_empty() {
            return Err(AgentError::ToolValidation(
                "start, end and date are all required".into(),
            ));
        }
        let date = NaiveDate::parse_from_str(input.date.trim(), "%Y-%m-%d").map_err(|_| {
            AgentError::ToolValidation(format!("date '{}' is not in YYYY-MM-DD format", input.date))
        })?;

        let schedule = self
            .trains
            .tickets(input.start.trim(), input.end.trim(), date)
            .await
            .map_err(|e| AgentError::ToolExecution(format!("Lookup failed: {}", e)))?;

        Ok(format_schedule(schedule))
    }
}

/// Human-readable timetable, earliest departure first
fn format_schedule(mut schedule: TrainSchedule) -> String {
    if schedule.trains.is_empty() {
        return format!(
            "No trains found from {} to {} on {}",
            schedule.start, schedule.end, schedule.date
        );
    }

    schedule.trains.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));

    let mut out = format!(
        "Found {} trains from {} to {} on {}:\n",
        schedule.trains.len(),
        schedule.start,
        schedule.end,
        schedule.date
    );

    for train in &schedule.trains {
        let _ = writeln!(
            out,
            "{} ({}) | {} {} → {} {} | {}",
            train.train_no,
            train.train_type,
            train.departure_station,
            train.departure_time,
            train.arrival_station,
            train.arrival_time,
            train.duration
        );

        let seats: Vec<String> = train
            .available_seats()
            .map(|s| format!("{} (¥{})", s.class, s.price))
            .collect();
        if seats.is_empty() {
            out.push_str("No seats currently available\n");
        } else {
            let _ = writeln!(out, "Available seats: {}", seats.join(" / "));
        }
        out.push_str("------------------------\n");
    }

    out
}
