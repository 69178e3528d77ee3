/// Emoji for an OpenWeatherMap condition description. Descriptions without a
/// mapping come back unchanged.
pub fn to_emoji(description: &str) -> String {
    let emoji = match description.to_lowercase().as_str() {
        "clear sky" => "☀️",
        "few clouds" => "🌤️",
        "scattered clouds" | "overcast clouds" => "☁️",
        "broken clouds" => "🌥️",
        "rain" | "light rain" => "🌦️",
        "shower rain"
        | "moderate rain"
        | "heavy intensity rain"
        | "very heavy rain"
        | "extreme rain"
        | "light intensity shower rain"
        | "heavy intensity shower rain"
        | "ragged shower rain" => "🌧️",
        "freezing rain" | "snow" | "light snow" | "heavy snow" => "❄️",
        "thunderstorm"
        | "light thunderstorm"
        | "heavy thunderstorm"
        | "ragged thunderstorm"
        | "thunderstorm with light rain"
        | "thunderstorm with rain"
        | "thunderstorm with heavy rain" => "⛈️",
        "sleet"
        | "light shower sleet"
        | "shower sleet"
        | "light rain and snow"
        | "rain and snow"
        | "light shower snow"
        | "shower snow"
        | "heavy shower snow" => "🌨️",
        "mist" | "smoke" | "haze" | "fog" => "🌫️",
        "sand, dust whirls" | "sand" | "dust" | "tornado" => "🌪️",
        "volcanic ash" => "🌋",
        "squalls" => "💨",
        _ => return description.to_string(),
    };

    emoji.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_descriptions_case_insensitively() {
        assert_eq!(to_emoji("clear sky"), "☀️");
        assert_eq!(to_emoji("Light Rain"), "🌦️");
        assert_eq!(to_emoji("thunderstorm with rain"), "⛈️");
    }

    #[test]
    fn unknown_description_is_returned_as_is() {
        assert_eq!(to_emoji("raining frogs"), "raining frogs");
    }
}
