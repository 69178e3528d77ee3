//! Wire format of the OpenWeatherMap `weather` and `forecast` endpoints.

use serde::Deserialize;

use super::{Location, Temperature, WeatherItem, WeatherReport, Wind};
use crate::util::from_unix;

const ICON_URL: &str = "https://openweathermap.org/img/wn";
const FALLBACK_ICON: &str = "01d";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentWeatherDto {
    pub coord: Option<CoordDto>,
    pub weather: Vec<ConditionDto>,
    pub main: Option<MainDto>,
    pub visibility: i64,
    pub wind: Option<WindDto>,
    pub clouds: Option<CloudsDto>,
    pub dt: i64,
    pub sys: Option<SysDto>,
    pub timezone: i32,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForecastDto {
    pub list: Vec<ForecastEntryDto>,
    pub city: Option<CityDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForecastEntryDto {
    pub dt: i64,
    pub main: Option<MainDto>,
    pub weather: Vec<ConditionDto>,
    pub clouds: Option<CloudsDto>,
    pub wind: Option<WindDto>,
    pub visibility: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CityDto {
    pub name: Option<String>,
    pub coord: Option<CoordDto>,
    pub country: Option<String>,
    pub timezone: i32,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoordDto {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConditionDto {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MainDto {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WindDto {
    pub speed: f64,
    pub deg: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CloudsDto {
    pub all: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SysDto {
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

fn temperature(main: Option<&MainDto>) -> Temperature {
    main.map(|m| Temperature {
        temp: m.temp,
        feels_like: m.feels_like,
        min: m.temp_min,
        max: m.temp_max,
    })
    .unwrap_or_default()
}

fn wind(wind: Option<&WindDto>) -> Wind {
    wind.map(|w| Wind {
        speed: w.speed,
        deg: w.deg,
    })
    .unwrap_or_default()
}

impl CurrentWeatherDto {
    pub fn into_report(self) -> WeatherReport {
        let condition = self.weather.into_iter().next().unwrap_or_default();
        let sys = self.sys.unwrap_or_default();
        let coord = self.coord.unwrap_or_default();
        let icon = condition.icon.as_deref().unwrap_or(FALLBACK_ICON);

        WeatherReport {
            items: vec![WeatherItem {
                location: Location {
                    city: self.name,
                    country: sys.country,
                    longitude: coord.lon,
                    latitude: coord.lat,
                    timezone: self.timezone,
                },
                title: condition.main,
                description: condition.description,
                icon_url: Some(format!("{ICON_URL}/{icon}.png")),
                temperature: temperature(self.main.as_ref()),
                pressure: self.main.as_ref().map_or(0, |m| m.pressure),
                humidity: self.main.as_ref().map_or(0, |m| m.humidity),
                visibility: self.visibility,
                clouds: self.clouds.map_or(0, |c| c.all),
                time: from_unix(self.dt),
                sunrise: from_unix(sys.sunrise),
                sunset: from_unix(sys.sunset),
                wind: wind(self.wind.as_ref()),
            }],
        }
    }
}

impl ForecastDto {
    pub fn into_report(self) -> WeatherReport {
        let city = self.city.unwrap_or_default();
        let coord = city.coord.unwrap_or_default();
        let location = Location {
            city: city.name,
            country: city.country,
            longitude: coord.lon,
            latitude: coord.lat,
            timezone: city.timezone,
        };

        let items = self
            .list
            .into_iter()
            .map(|entry| {
                let condition = entry.weather.into_iter().next().unwrap_or_default();
                WeatherItem {
                    location: location.clone(),
                    title: condition.main,
                    description: condition.description,
                    icon_url: condition.icon.map(|icon| format!("{ICON_URL}/{icon}.png")),
                    temperature: temperature(entry.main.as_ref()),
                    pressure: entry.main.as_ref().map_or(0, |m| m.pressure),
                    humidity: entry.main.as_ref().map_or(0, |m| m.humidity),
                    visibility: entry.visibility,
                    clouds: entry.clouds.map_or(0, |c| c.all),
                    time: from_unix(entry.dt),
                    sunrise: from_unix(city.sunrise),
                    sunset: from_unix(city.sunset),
                    wind: wind(entry.wind.as_ref()),
                }
            })
            .collect();

        WeatherReport { items }
    }
}
