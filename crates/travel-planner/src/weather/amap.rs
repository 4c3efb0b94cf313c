//! AMap Weather Client
//!
//! Calls the AMap `weatherInfo` REST endpoint with `extensions=all`. Cities
//! outside the built-in table are resolved through the AMap geocoder.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{city_adcode, clamp_days, WeatherService, WEATHER_UNKNOWN};
use crate::error::{PlannerError, Result};

pub const AMAP_BASE_URL: &str = "https://restapi.amap.com/v3";

const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct AmapWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AmapWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: AMAP_BASE_URL.into(),
            api_key: api_key.into(),
        })
    }

    /// Point at a different AMap host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Forecast lookup that reports why it failed
    pub async fn try_forecast(&self, city: &str, days: u32) -> Result<String> {
        let adcode = self.resolve_adcode(city).await?;

        let response: WeatherResponse = self
            .client
            .get(format!("{}/weather/weatherInfo", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("city", adcode.as_str()),
                ("extensions", "all"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "1" {
            return Err(PlannerError::Weather(response.info.unwrap_or_else(|| "unknown AMap error".into())));
        }

        let casts = response
            .forecasts
            .into_iter()
            .next()
            .map(|f| f.casts)
            .unwrap_or_default();
        if casts.is_empty() {
            return Err(PlannerError::Weather(format!("no forecast returned for '{}'", city)));
        }

        let lines: Vec<String> = casts
            .iter()
            .take(clamp_days(days) as usize)
            .map(Cast::describe)
            .collect();

        Ok(lines.join("\n"))
    }

    async fn resolve_adcode(&self, city: &str) -> Result<String> {
        if let Some(code) = city_adcode(city) {
            return Ok(code.to_string());
        }

        tracing::debug!(city, "City not in adcode table, asking the geocoder");
        let response: GeocodeResponse = self
            .client
            .get(format!("{}/geocode/geo", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("address", city)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "1" {
            return Err(PlannerError::Weather(format!("geocoding '{}' failed", city)));
        }

        response
            .geocodes
            .into_iter()
            .next()
            .map(|g| g.adcode)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| PlannerError::Weather(format!("unknown city '{}'", city)))
    }
}

#[async_trait]
impl WeatherService for AmapWeatherClient {
    async fn forecast(&self, city: &str, days: u32) -> String {
        match self.try_forecast(city, days).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(city, error = %e, "Weather lookup failed");
                WEATHER_UNKNOWN.into()
            }
        }
    }

    fn name(&self) -> &str {
        "amap"
    }
}

#[derive(Deserialize)]
struct WeatherResponse {
    status: String,
    #[serde(default)]
    info: Option<String>,
    #[serde(default)]
    forecasts: Vec<Forecast>,
}

#[derive(Deserialize)]
struct Forecast {
    #[serde(default)]
    casts: Vec<Cast>,
}

#[derive(Deserialize)]
struct Cast {
    date: String,
    dayweather: String,
    nightweather: String,
    daytemp: String,
    nighttemp: String,
    #[serde(default)]
    daywind: String,
    #[serde(default)]
    daypower: String,
}

impl Cast {
    fn describe(&self) -> String {
        let sky = if self.dayweather == self.nightweather {
            self.dayweather.clone()
        } else {
            format!("{} turning {}", self.dayweather, self.nightweather)
        };
        format!(
            "{}: {}, {}-{}°C, {} wind force {}",
            self.date, sky, self.nighttemp, self.daytemp, self.daywind, self.daypower
        )
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    geocodes: Vec<Geocode>,
}

#[derive(Deserialize)]
struct Geocode {
    #[serde(default)]
    adcode: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cast(date: &str, day: &str, night: &str) -> serde_json::Value {
        json!({
            "date": date, "week": "6",
            "dayweather": day, "nightweather": night,
            "daytemp": "12", "nighttemp": "0",
            "daywind": "北", "nightwind": "北",
            "daypower": "1-3", "nightpower": "1-3"
        })
    }

    async fn client(server: &MockServer) -> AmapWeatherClient {
        AmapWeatherClient::new("amap-key").unwrap().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_forecast_from_table_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/weatherInfo"))
            .and(query_param("city", "110000"))
            .and(query_param("extensions", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1", "info": "OK",
                "forecasts": [{"city": "北京市", "casts": [
                    cast("2025-03-01", "晴", "晴"),
                    cast("2025-03-02", "晴", "多云"),
                    cast("2025-03-03", "阴", "小雨"),
                ]}]
            })))
            .mount(&server)
            .await;

        let text = client(&server).await.forecast("Beijing", 2).await;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2025-03-01: 晴, 0-12°C, 北 wind force 1-3");
        assert!(lines[1].contains("晴 turning 多云"));
    }

    #[tokio::test]
    async fn test_geocoder_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/geo"))
            .and(query_param("address", "黄山"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1", "geocodes": [{"adcode": "341000"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weather/weatherInfo"))
            .and(query_param("city", "341000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1", "forecasts": [{"casts": [cast("2025-03-01", "雪", "雪")]}]
            })))
            .mount(&server)
            .await;

        let text = client(&server).await.forecast("黄山", 3).await;
        assert!(text.starts_with("2025-03-01: 雪"));
    }

    #[tokio::test]
    async fn test_failures_become_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather/weatherInfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0", "info": "INVALID_USER_KEY"
            })))
            .mount(&server)
            .await;

        let weather = client(&server).await;
        assert!(matches!(
            weather.try_forecast("上海", 3).await,
            Err(PlannerError::Weather(msg)) if msg == "INVALID_USER_KEY"
        ));
        assert_eq!(weather.forecast("上海", 3).await, WEATHER_UNKNOWN);

        // Geocoder has no route mounted: 404
        assert_eq!(weather.forecast("Atlantis", 3).await, WEATHER_UNKNOWN);
    }
}
