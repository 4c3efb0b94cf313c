//! JiSu Train Client
//!
//! Ticket search through the JiSu train API on the Aliyun market, using
//! `APPCODE` authorization.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{Seat, Train, TrainSchedule, TrainService};
use crate::error::{PlannerError, Result};
use crate::money::parse_amount;

pub const JISU_TRAIN_URL: &str = "https://jisutrain.market.alicloudapi.com";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Seat class codes used in `price{code}` / `num{code}` fields
const SEAT_CLASSES: &[(&str, &str)] = &[
    ("ed", "二等座"),
    ("yd", "一等座"),
    ("sw", "商务座"),
    ("td", "特等座"),
    ("rz", "软座"),
    ("yz", "硬座"),
    ("gr1", "高级软卧"),
    ("rw1", "软卧"),
    ("yw1", "硬卧"),
    ("wz", "无座"),
];

pub struct JisuTrainClient {
    client: reqwest::Client,
    base_url: String,
    app_code: String,
}

impl JisuTrainClient {
    pub fn new(app_code: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: JISU_TRAIN_URL.into(),
            app_code: app_code.into().trim().to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn convert_train(entry: &Map<String, Value>) -> Train {
        let seats = SEAT_CLASSES
            .iter()
            .filter_map(|(code, class)| {
                let price = entry.get(&format!("price{}", code)).filter(|v| !is_placeholder(v))?;
                let price = parse_amount(price).ok()?;
                let available = entry
                    .get(&format!("num{}", code))
                    .is_some_and(|v| !is_placeholder(v) && v.as_str() != Some("0") && v.as_i64() != Some(0));
                Some(Seat {
                    class: (*class).to_string(),
                    price,
                    available,
                })
            })
            .collect();

        Train {
            train_no: field(entry, "trainno"),
            train_type: field(entry, "typename"),
            departure_station: field(entry, "station"),
            arrival_station: field(entry, "endstation"),
            departure_time: field(entry, "departuretime"),
            arrival_time: field(entry, "arrivaltime"),
            duration: field(entry, "costtime"),
            seats,
            can_buy: field(entry, "canbuy") == "Y",
        }
    }
}

#[async_trait]
impl TrainService for JisuTrainClient {
    async fn tickets(&self, start: &str, end: &str, date: NaiveDate) -> Result<TrainSchedule> {
        let date = date.format("%Y-%m-%d").to_string();
        tracing::debug!(start, end, %date, "Querying train tickets");

        let response: JisuResponse = self
            .client
            .get(format!("{}/train/ticket", self.base_url))
            .query(&[("date", date.as_str()), ("start", start), ("end", end)])
            .header("Authorization", format!("APPCODE {}", self.app_code))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let succeeded = response.status.as_i64() == Some(0) || response.status.as_str() == Some("0");
        if !succeeded {
            let msg = response.msg.unwrap_or_else(|| "query failed".into());
            tracing::warn!(start, end, error = %msg, "Train query rejected");
            return Err(PlannerError::Train(msg));
        }

        let result = response
            .result
            .ok_or_else(|| PlannerError::Train("response carried no result".into()))?;

        Ok(TrainSchedule {
            start: result.start,
            end: result.end,
            date: result.date,
            trains: result.list.iter().map(Self::convert_train).collect(),
        })
    }

    fn name(&self) -> &str {
        "jisu"
    }
}

fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => matches!(s.trim(), "" | "-" | "--" | "无"),
        _ => false,
    }
}

fn field(entry: &Map<String, Value>, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[derive(Deserialize)]
struct JisuResponse {
    status: Value,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    result: Option<JisuResult>,
}

#[derive(Deserialize)]
struct JisuResult {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    list: Vec<Map<String, Value>>,
}
