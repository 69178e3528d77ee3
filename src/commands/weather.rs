use serenity::builder::{CreateEmbed, CreateEmbedAuthor};
use tracing::error;

use super::Reply;
use crate::weather::emoji::to_emoji;
use crate::weather::{RequestKind, Units, WeatherItem, WeatherReport, WeatherService};

pub const NO_LOCATION: &str = "No location given.";
pub const NO_DATA: &str = "Sorry, I couldn't find any weather data for the location you provided.";
pub const FAILED: &str = "Sorry, I couldn't process your weather request at the moment.";

const WEATHER_COLOR: u32 = 0x3498DB;
const UNITS: Units = Units::Metric;

pub async fn lookup(service: &WeatherService, forecast: bool, location: &str) -> Reply {
    let location = location.trim();
    if location.is_empty() {
        return Reply::text(NO_LOCATION);
    }

    let kind = if forecast {
        RequestKind::Forecast
    } else {
        RequestKind::Current
    };

    match service.fetch(kind, location, Some(UNITS), None).await {
        Ok(Some(report)) => reply_for(kind, &report),
        Ok(None) => Reply::text(NO_DATA),
        Err(e) if e.is_not_found() => Reply::text(NO_DATA),
        Err(e) => {
            error!("Weather lookup for {} failed: {}", location, e);
            Reply::text(FAILED)
        }
    }
}

pub fn reply_for(kind: RequestKind, report: &WeatherReport) -> Reply {
    let embed = match kind {
        RequestKind::Current => report.items.first().map(current_weather_embed),
        RequestKind::Forecast => forecast_embed(report),
    };

    match embed {
        Some(embed) => Reply::Embeds(vec![embed]),
        None => Reply::text(NO_DATA),
    }
}

fn author(item: &WeatherItem) -> Option<CreateEmbedAuthor> {
    let city = item.location.city.as_deref().filter(|c| !c.is_empty())?;

    Some(match item.location.country.as_deref().filter(|c| !c.is_empty()) {
        Some(country) => CreateEmbedAuthor::new(format!("{city}, {country}"))
            .icon_url(format!("https://flagcdn.com/w320/{}.png", country.to_lowercase())),
        None => CreateEmbedAuthor::new(city),
    })
}

/// `+2h`, `-5h` or `+5:30h` style offset from UTC.
pub fn utc_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;

    match minutes % 60 {
        0 => format!("UTC{sign}{}h", minutes / 60),
        rest => format!("UTC{sign}{}:{rest:02}h", minutes / 60),
    }
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn current_weather_embed(item: &WeatherItem) -> CreateEmbed {
    let symbol = UNITS.temperature_symbol();
    let temp = item.temperature;

    let title = match (&item.title, &item.description) {
        (Some(title), Some(description)) => format!("{title} ({description})"),
        (Some(title), None) => title.clone(),
        (None, Some(description)) => title_case(description),
        (None, None) => "Current weather".to_string(),
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .description("Here's the current weather data:")
        .color(WEATHER_COLOR)
        .field("🌡️ Temperature", format!("{} {symbol}", temp.temp), true)
        .field("🌡️ Min", format!("{} {symbol}", temp.min), true)
        .field("🌡️ Max", format!("{} {symbol}", temp.max), true)
        .field("🌡️ Feels Like", format!("{} {symbol}", temp.feels_like), true)
        .field("💧 Humidity", format!("{}%", item.humidity), true)
        .field("🔼 Pressure", format!("{} hPa", item.pressure), true)
        .field("☁️ Cloudiness", format!("{}%", item.clouds), true)
        .field("🌬️ Wind Speed", format!("{} m/s", item.wind.speed), true)
        .field("🧭 Wind Direction", format!("{}°", item.wind.deg), true)
        .field(
            "🌅 Sunrise",
            item.local_time(item.sunrise).format("%I:%M %p").to_string(),
            true,
        )
        .field(
            "🌇 Sunset",
            item.local_time(item.sunset).format("%I:%M %p").to_string(),
            true,
        )
        .field("🕒 Timezone", utc_offset(item.location.timezone), true)
        .timestamp(item.time);

    if let Some(icon) = &item.icon_url {
        embed = embed.thumbnail(icon);
    }
    if let Some(author) = author(item) {
        embed = embed.author(author);
    }

    embed
}

/// One field per local day. `None` when the report has no entries.
pub fn forecast_embed(report: &WeatherReport) -> Option<CreateEmbed> {
    let first = report.items.first()?;
    let symbol = UNITS.temperature_symbol();

    let mut embed = CreateEmbed::new()
        .title("Forecast")
        .description("Here's the forecast weather data:")
        .color(WEATHER_COLOR)
        .timestamp(first.time);

    for day in report.daily_summaries() {
        let description = day.description.as_deref().unwrap_or_default();
        let value = format!(
            "{} {}\n{} {symbol} | {} {symbol} (H: {}%)",
            to_emoji(description),
            title_case(description),
            day.max_temperature.round(),
            day.min_temperature.round(),
            day.max_humidity,
        );
        embed = embed.field(day.date.format("%A").to_string(), value, false);
    }

    if let Some(icon) = &first.icon_url {
        embed = embed.thumbnail(icon);
    }
    if let Some(author) = author(first) {
        embed = embed.author(author);
    }

    Some(embed)
}
