//! Weather Integration
//!
//! Forecast lookup behind a trait so the weather tool and the HTTP surface
//! run against AMap in production and static data in tests and demos.

mod amap;
mod mock;

pub use amap::{AmapWeatherClient, AMAP_BASE_URL};
pub use mock::StaticWeatherService;

use async_trait::async_trait;

/// Fixed text returned whenever a forecast cannot be produced
pub const WEATHER_UNKNOWN: &str = "weather unknown";

/// Forecast days supported by the upstream API
pub const MAX_FORECAST_DAYS: u32 = 4;

/// Weather client trait (Strategy pattern)
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Forecast text for `days` days starting today, or [`WEATHER_UNKNOWN`]
    async fn forecast(&self, city: &str, days: u32) -> String;

    fn name(&self) -> &str;
}

/// Clamp a requested day count to the supported range
pub fn clamp_days(days: u32) -> u32 {
    days.clamp(1, MAX_FORECAST_DAYS)
}

/// Well-known cities and their AMap adcodes: (Chinese name, English name, adcode)
const CITY_ADCODES: &[(&str, &str, &str)] = &[
    ("北京", "beijing", "110000"),
    ("上海", "shanghai", "310000"),
    ("天津", "tianjin", "120000"),
    ("重庆", "chongqing", "500000"),
    ("广州", "guangzhou", "440100"),
    ("深圳", "shenzhen", "440300"),
    ("杭州", "hangzhou", "330100"),
    ("南京", "nanjing", "320100"),
    ("苏州", "suzhou", "320500"),
    ("成都", "chengdu", "510100"),
    ("武汉", "wuhan", "420100"),
    ("西安", "xian", "610100"),
    ("长沙", "changsha", "430100"),
    ("厦门", "xiamen", "350200"),
    ("青岛", "qingdao", "370200"),
    ("昆明", "kunming", "530100"),
    ("三亚", "sanya", "460200"),
    ("桂林", "guilin", "450300"),
];

/// Look up a city's adcode in the built-in table
pub fn city_adcode(city: &str) -> Option<&'static str> {
    let name = city.trim().trim_end_matches('市');
    let latin: String = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase();

    CITY_ADCODES
        .iter()
        .find(|(zh, en, _)| *zh == name || (!latin.is_empty() && *en == latin))
        .map(|(_, _, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_table() {
        assert_eq!(city_adcode("北京"), Some("110000"));
        assert_eq!(city_adcode("杭州市"), Some("330100"));
        assert_eq!(city_adcode("Beijing"), Some("110000"));
        assert_eq!(city_adcode("Xi'an"), Some("610100"));
        assert_eq!(city_adcode("Atlantis"), None);
        assert_eq!(city_adcode(""), None);
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(0), 1);
        assert_eq!(clamp_days(3), 3);
        assert_eq!(clamp_days(10), MAX_FORECAST_DAYS);
    }
}
