pub mod cache;
pub mod emoji;
pub mod openweathermap;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc, Weekday};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::error::ServiceError;
use cache::ResponseCache;
use openweathermap::{CurrentWeatherDto, ForecastDto};

const SERVICE: &str = "OpenWeatherMap";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Current,
    Forecast,
}

impl RequestKind {
    fn path(self) -> &'static str {
        match self {
            RequestKind::Current => "weather",
            RequestKind::Forecast => "forecast",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[serde(alias = "Standard")]
    Standard,
    #[default]
    #[serde(alias = "Metric")]
    Metric,
    #[serde(alias = "Imperial")]
    Imperial,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeatherReport {
    pub items: Vec<WeatherItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherItem {
    pub location: Location,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub temperature: Temperature,
    pub pressure: i64,
    pub humidity: i64,
    pub visibility: i64,
    pub clouds: i64,
    pub time: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Offset from UTC in seconds.
    pub timezone: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Temperature {
    pub temp: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
}

/// Aggregate of all forecast entries that fall on the same local day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub description: Option<String>,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub max_humidity: i64,
}

impl WeatherItem {
    pub fn local_time(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        instant + ChronoDuration::seconds(i64::from(self.location.timezone))
    }
}

impl WeatherReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Groups forecast items by the calendar date at the location, in order of
    /// first appearance.
    pub fn daily_summaries(&self) -> Vec<DaySummary> {
        let mut days: Vec<DaySummary> = Vec::new();

        for item in &self.items {
            let date = item.local_time(item.time).date_naive();

            match days.iter_mut().find(|day| day.date == date) {
                Some(day) => {
                    day.max_temperature = day.max_temperature.max(item.temperature.max);
                    day.min_temperature = day.min_temperature.min(item.temperature.min);
                    day.max_humidity = day.max_humidity.max(item.humidity);
                    if day.description.is_none() {
                        day.description = item.description.clone();
                    }
                }
                None => days.push(DaySummary {
                    date,
                    weekday: date.weekday(),
                    description: item.description.clone(),
                    max_temperature: item.temperature.max,
                    min_temperature: item.temperature.min,
                    max_humidity: item.humidity,
                }),
            }
        }

        days
    }
}

pub struct WeatherService {
    client: Client,
    config: WeatherConfig,
    cache: ResponseCache,
}

impl WeatherService {
    pub fn new(client: Client, config: WeatherConfig) -> Self {
        let cache = ResponseCache::new(config.cache_duration);
        Self {
            client,
            config,
            cache,
        }
    }

    /// Fetches current weather or a forecast. `None` for a blank location.
    /// `count` limits the number of forecast steps.
    pub async fn fetch(
        &self,
        kind: RequestKind,
        location: &str,
        units: Option<Units>,
        count: Option<u32>,
    ) -> Result<Option<WeatherReport>, ServiceError> {
        let location = location.trim();
        if location.is_empty() {
            return Ok(None);
        }

        let units = units.unwrap_or_default();
        let mut query = vec![
            ("q", location.to_string()),
            ("appid", self.config.api_key.clone()),
            ("units", units.as_str().to_string()),
        ];
        if let (RequestKind::Forecast, Some(count)) = (kind, count) {
            query.push(("cnt", count.to_string()));
        }

        let request = self
            .client
            .get(format!("{}/{}", self.config.base_url, kind.path()))
            .query(&query)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ServiceError::http(SERVICE))?;

        let key = request.url().to_string();
        let body = match self.cache.get(&key) {
            Some(body) => {
                debug!("Using cached {} response for {}", kind.path(), location);
                body
            }
            None => {
                debug!("Fetching {} for {}", kind.path(), location);
                let response = self
                    .client
                    .execute(request)
                    .await
                    .map_err(ServiceError::http(SERVICE))?;

                let status = response.status();
                let body = response.text().await.map_err(ServiceError::http(SERVICE))?;
                if !status.is_success() {
                    return Err(ServiceError::Status {
                        service: SERVICE,
                        status,
                        body,
                    });
                }

                self.cache.insert(key, body.clone());
                body
            }
        };

        parse_report(kind, &body).map(Some)
    }
}

pub fn parse_report(kind: RequestKind, body: &str) -> Result<WeatherReport, ServiceError> {
    if body.trim().is_empty() {
        return Ok(WeatherReport::default());
    }

    let report = match kind {
        RequestKind::Current => serde_json::from_str::<CurrentWeatherDto>(body)
            .map_err(ServiceError::decode(SERVICE))?
            .into_report(),
        RequestKind::Forecast => serde_json::from_str::<ForecastDto>(body)
            .map_err(ServiceError::decode(SERVICE))?
            .into_report(),
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::from_unix;

    fn item(time: i64, timezone: i32, min: f64, max: f64, humidity: i64, description: Option<&str>) -> WeatherItem {
        WeatherItem {
            location: Location {
                timezone,
                ..Location::default()
            },
            title: None,
            description: description.map(str::to_string),
            icon_url: None,
            temperature: Temperature {
                min,
                max,
                ..Temperature::default()
            },
            pressure: 0,
            humidity,
            visibility: 0,
            clouds: 0,
            time: from_unix(time),
            sunrise: from_unix(0),
            sunset: from_unix(0),
            wind: Wind::default(),
        }
    }

    #[test]
    fn groups_forecast_by_local_day() {
        // 2023-11-14 20:13 and 23:13 UTC; the second is already the 15th at UTC+1
        let report = WeatherReport {
            items: vec![
                item(1_700_000_000 - 7_200, 3600, 5.0, 8.0, 70, Some("light rain")),
                item(1_700_000_000 + 3_600, 3600, 4.0, 6.0, 90, None),
                item(1_700_000_000 + 10_800, 3600, 3.0, 9.5, 60, Some("fog")),
            ],
        };

        let days = report.daily_summaries();
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].weekday, Weekday::Tue);
        assert_eq!(days[0].max_temperature, 8.0);

        assert_eq!(days[1].weekday, Weekday::Wed);
        assert_eq!(days[1].min_temperature, 3.0);
        assert_eq!(days[1].max_temperature, 9.5);
        assert_eq!(days[1].max_humidity, 90);
        assert_eq!(days[1].description.as_deref(), Some("fog"));
    }

    #[test]
    fn units_parse_from_lowercase() {
        let units: Units = serde_json::from_str("\"imperial\"").unwrap();
        assert_eq!(units, Units::Imperial);
        assert_eq!(Units::default().as_str(), "metric");
        assert_eq!(Units::Standard.temperature_symbol(), "K");
    }

    #[test]
    fn empty_body_is_an_empty_report() {
        assert!(parse_report(RequestKind::Forecast, "  ").unwrap().is_empty());
        assert!(matches!(
            parse_report(RequestKind::Current, "not json"),
            Err(ServiceError::Decode { .. })
        ));
    }
}
