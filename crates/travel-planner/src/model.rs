//! Domain Models
//!
//! Plan, day and activity types plus the inbound planning request.
//! All costs are `rust_decimal::Decimal` and serialize as JSON numbers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::money::checked_sum;

/// What an activity is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Attraction,
    Dining,
    Transport,
    Lodging,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Dining => "dining",
            Self::Transport => "transport",
            Self::Lodging => "lodging",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = String;

    /// Accepts English and Chinese labels
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attraction" | "sightseeing" | "sight" | "activity" | "景点" | "游览" | "观光" => {
                Ok(Self::Attraction)
            }
            "dining" | "food" | "meal" | "restaurant" | "餐饮" | "美食" | "用餐" => Ok(Self::Dining),
            "transport" | "transportation" | "transit" | "travel" | "交通" => Ok(Self::Transport),
            "lodging" | "accommodation" | "hotel" | "stay" | "住宿" | "酒店" => Ok(Self::Lodging),
            other => Err(format!("unknown activity category '{}'", other)),
        }
    }
}

/// One scheduled item within a day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub category: ActivityCategory,
    pub name: String,
    pub description: String,
    pub weather_note: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

/// One day of the itinerary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: String,
    pub weather: String,
    pub activities: Vec<Activity>,
    /// Always the sum of activity costs
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_cost: Decimal,
}

impl DayPlan {
    /// `None` when the sum overflows
    pub fn activity_total(&self) -> Option<Decimal> {
        checked_sum(self.activities.iter().map(|a| a.cost))
    }
}

/// A validated travel plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub origin: String,
    pub destination: String,
    pub duration_days: u32,
    /// Caller-supplied budget
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    /// Always the sum of daily costs
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub daily_plans: Vec<DayPlan>,
    pub style_tags: Vec<String>,
    pub summary: String,
}

impl Plan {
    /// Both aggregate invariants hold
    pub fn is_consistent(&self) -> bool {
        self.daily_plans.iter().all(|d| d.activity_total() == Some(d.daily_cost))
            && checked_sum(self.daily_plans.iter().map(|d| d.daily_cost)) == Some(self.total_cost)
    }

    /// Budget left after the planned spend (negative when over budget)
    pub fn remaining_budget(&self) -> Option<Decimal> {
        self.budget.checked_sub(self.total_cost)
    }

    pub fn is_over_budget(&self) -> bool {
        self.total_cost > self.budget
    }
}

/// Inbound planning intent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(alias = "departure")]
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    pub budget: Decimal,
    #[serde(default, alias = "travel_style")]
    pub style: Option<String>,
    #[serde(default, alias = "accommodation_level")]
    pub accommodation: Option<String>,
    /// Nested form of `style` / `accommodation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub accommodation_level: Option<String>,
}

const DEFAULT_STYLE: &str = "leisure";
const DEFAULT_ACCOMMODATION: &str = "guesthouse";

impl PlanRequest {
    /// Check the request before spending provider calls on it
    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(PlannerError::InvalidRequest("origin is required".into()));
        }
        if self.destination.trim().is_empty() {
            return Err(PlannerError::InvalidRequest("destination is required".into()));
        }
        if self.end_date < self.start_date {
            return Err(PlannerError::InvalidRequest(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }
        if self.travelers == 0 {
            return Err(PlannerError::InvalidRequest("travelers must be at least 1".into()));
        }
        if self.budget < Decimal::ZERO {
            return Err(PlannerError::InvalidRequest("budget must not be negative".into()));
        }
        Ok(())
    }

    /// Inclusive number of travel days
    pub fn day_count(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        u32::try_from(days.max(1)).unwrap_or(1)
    }

    /// Travel style, flat field first, then `preferences`
    pub fn travel_style(&self) -> &str {
        non_blank(self.style.as_deref())
            .or_else(|| non_blank(self.preferences.as_ref().and_then(|p| p.style.as_deref())))
            .unwrap_or(DEFAULT_STYLE)
    }

    pub fn accommodation_level(&self) -> &str {
        non_blank(self.accommodation.as_deref())
            .or_else(|| {
                non_blank(self.preferences.as_ref().and_then(|p| p.accommodation_level.as_deref()))
            })
            .unwrap_or(DEFAULT_ACCOMMODATION)
    }

    /// Dates of every travel day, in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take(self.day_count() as usize)
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn request() -> PlanRequest {
        serde_json::from_value(json!({
            "departure": "Hangzhou",
            "destination": "Beijing",
            "start_date": "2025-03-01",
            "end_date": "2025-03-02",
            "travelers": 2,
            "budget": 3000,
            "travel_style": "culture"
        }))
        .unwrap()
    }

    #[test]
    fn test_request_aliases_and_days() {
        let req = request();
        assert_eq!(req.origin, "Hangzhou");
        assert_eq!(req.style.as_deref(), Some("culture"));
        assert_eq!(req.budget, dec!(3000));
        assert_eq!(req.day_count(), 2);
        assert_eq!(req.dates().len(), 2);
        assert!(req.validate().is_ok());
        assert_eq!(req.travel_style(), "culture");
        assert_eq!(req.accommodation_level(), "guesthouse");
    }

    #[test]
    fn test_nested_preferences() {
        let req: PlanRequest = serde_json::from_value(json!({
            "origin": "Shanghai",
            "destination": "Chengdu",
            "start_date": "2025-05-01",
            "end_date": "2025-05-03",
            "travelers": 1,
            "budget": "2500.50",
            "preferences": {"style": "foodie", "accommodation_level": "hotel"}
        }))
        .unwrap();

        assert_eq!(req.budget, dec!(2500.50));
        assert_eq!(req.travel_style(), "foodie");
        assert_eq!(req.accommodation_level(), "hotel");
        assert_eq!(req.day_count(), 3);
    }

    #[test]
    fn test_request_validation() {
        let mut req = request();
        req.end_date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert!(matches!(req.validate(), Err(PlannerError::InvalidRequest(_))));

        let mut req = request();
        req.travelers = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.destination = "  ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!("景点".parse::<ActivityCategory>().unwrap(), ActivityCategory::Attraction);
        assert_eq!("餐饮".parse::<ActivityCategory>().unwrap(), ActivityCategory::Dining);
        assert_eq!("Transport".parse::<ActivityCategory>().unwrap(), ActivityCategory::Transport);
        assert_eq!("住宿".parse::<ActivityCategory>().unwrap(), ActivityCategory::Lodging);
        assert!("shopping".parse::<ActivityCategory>().is_err());
    }

    #[test]
    fn test_costs_serialize_as_numbers() {
        let plan = Plan {
            origin: "Hangzhou".into(),
            destination: "Beijing".into(),
            duration_days: 1,
            budget: dec!(3000),
            total_cost: dec!(450.5),
            daily_plans: vec![DayPlan {
                date: "2025-03-01".into(),
                weather: "sunny".into(),
                activities: vec![Activity {
                    time: "09:00".into(),
                    category: ActivityCategory::Attraction,
                    name: "Forbidden City".into(),
                    description: String::new(),
                    weather_note: String::new(),
                    cost: dec!(450.5),
                }],
                daily_cost: dec!(450.5),
            }],
            style_tags: vec![],
            summary: String::new(),
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["total_cost"], json!(450.5));
        assert_eq!(value["budget"], json!(3000.0));
        assert_eq!(value["daily_plans"][0]["activities"][0]["category"], json!("attraction"));
        assert!(plan.is_consistent());
        assert_eq!(plan.remaining_budget(), Some(dec!(2549.5)));
    }
}
