//! Plan Aggregator/Validator
//!
//! Turns the loosely-shaped document extracted from model output into a
//! [`Plan`]. Every aggregate the model proposes is discarded: each day's cost
//! is the sum of its activities, the total is the sum of the days, and the
//! budget is the caller's.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{PlannerError, Result};
use crate::model::{Activity, ActivityCategory, DayPlan, Plan};
use crate::money::{checked_sum, parse_amount};

/// Validate a raw document and recompute its aggregates
pub fn finalize(raw: &Value, caller_budget: Decimal) -> Result<Plan> {
    let root = unwrap_envelope(raw)
        .as_object()
        .ok_or_else(|| PlannerError::schema("$", "expected a JSON object"))?;

    let days = root
        .get("daily_plans")
        .ok_or_else(|| PlannerError::schema("daily_plans", "missing"))?
        .as_array()
        .ok_or_else(|| PlannerError::schema("daily_plans", "expected an array"))?;

    let daily_plans = days
        .iter()
        .enumerate()
        .map(|(index, day)| day_plan(&format!("daily_plans[{}]", index), day))
        .collect::<Result<Vec<_>>>()?;

    let total_cost = checked_sum(daily_plans.iter().map(|d| d.daily_cost))
        .ok_or_else(|| PlannerError::schema("daily_plans", "cost total overflows"))?;

    if let Some(proposed) = root.get("total_cost").and_then(|v| parse_amount(v).ok()) {
        if proposed != total_cost {
            tracing::debug!(%proposed, recomputed = %total_cost, "Discarding model total_cost");
        }
    }

    let duration_days = ["duration_days", "duration"]
        .iter()
        .find_map(|key| root.get(*key).and_then(positive_count))
        .unwrap_or_else(|| u32::try_from(daily_plans.len()).unwrap_or(u32::MAX));

    Ok(Plan {
        origin: text(root, &["origin", "departure"]),
        destination: text(root, &["destination"]),
        duration_days,
        budget: caller_budget,
        total_cost,
        daily_plans,
        style_tags: style_tags(root),
        summary: text(root, &["summary"]),
    })
}

/// Accept `{"plan": {...}}` wrappers around the document
fn unwrap_envelope(raw: &Value) -> &Value {
    if raw.get("daily_plans").is_none() {
        for key in ["plan", "travel_plan", "data"] {
            if let Some(inner) = raw.get(key).filter(|v| v.get("daily_plans").is_some()) {
                return inner;
            }
        }
    }
    raw
}

fn day_plan(path: &str, value: &Value) -> Result<DayPlan> {
    let day = value
        .as_object()
        .ok_or_else(|| PlannerError::schema(path, "expected an object"))?;

    let activities_path = format!("{}.activities", path);
    let activities = day
        .get("activities")
        .ok_or_else(|| PlannerError::schema(&activities_path, "missing"))?
        .as_array()
        .ok_or_else(|| PlannerError::schema(&activities_path, "expected an array"))?
        .iter()
        .enumerate()
        .map(|(index, item)| activity(&format!("{}[{}]", activities_path, index), item))
        .collect::<Result<Vec<_>>>()?;

    let daily_cost = checked_sum(activities.iter().map(|a| a.cost))
        .ok_or_else(|| PlannerError::schema(&activities_path, "cost total overflows"))?;

    Ok(DayPlan {
        date: text(day, &["date", "day"]),
        weather: text(day, &["weather"]),
        activities,
        daily_cost,
    })
}

fn activity(path: &str, value: &Value) -> Result<Activity> {
    let item = value
        .as_object()
        .ok_or_else(|| PlannerError::schema(path, "expected an object"))?;

    let cost_path = format!("{}.cost", path);
    let cost = match item.get("cost") {
        None => return Err(PlannerError::schema(cost_path, "missing")),
        Some(raw) => parse_amount(raw).map_err(|e| PlannerError::schema(&cost_path, e))?,
    };
    if cost < Decimal::ZERO {
        return Err(PlannerError::schema(cost_path, format!("negative cost {}", cost)));
    }

    let category_path = format!("{}.category", path);
    let label = text(item, &["category", "activity_type", "type"]);
    if label.is_empty() {
        return Err(PlannerError::schema(category_path, "missing"));
    }
    let category = label
        .parse::<ActivityCategory>()
        .map_err(|e| PlannerError::schema(category_path, e))?;

    Ok(Activity {
        time: text(item, &["time"]),
        category,
        name: text(item, &["name", "title"]),
        description: text(item, &["description"]),
        weather_note: text(item, &["weather_note", "weather_notice"]),
        cost,
    })
}

/// First present key rendered as text; empty when absent
fn text(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| match object.get(*key)? {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        })
        .unwrap_or_default()
}

fn positive_count(value: &Value) -> Option<u32> {
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().trim_end_matches("天").trim_end_matches("days").trim().parse().ok(),
        _ => None,
    }?;
    u32::try_from(count).ok().filter(|c| *c > 0)
}

fn style_tags(root: &Map<String, Value>) -> Vec<String> {
    match root.get("style_tags") {
        Some(Value::Array(items)) => {
            return items
                .iter()
                .filter_map(|v| v.as_str().map(str::trim))
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Some(Value::String(s)) => {
            return s
                .split([',', '、', '，'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        _ => {}
    }

    ["travel_style", "accommodation_level"]
        .into_iter()
        .map(|key| text(root, &[key]))
        .filter(|s| !s.is_empty())
        .collect()
}
