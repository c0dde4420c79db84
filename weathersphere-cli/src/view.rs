//! Human-friendly rendering of query state.

use chrono::NaiveDate;
use weathersphere_core::{DailyForecast, QueryState, WeatherReport};

/// Icon host used by the WeatherSphere frontend.
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Image URL for a backend icon code.
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}@2x.png")
}

/// Format a forecast date string as `<short weekday>, <short month> <day>`,
/// e.g. `Sat, Jun 1`. Unparseable dates render verbatim.
pub fn format_forecast_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%a, %b %-d").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn render_state(state: &QueryState) -> String {
    match state {
        QueryState::Idle => "Enter a city name to get started.".to_string(),
        QueryState::Loading => "Loading weather data...".to_string(),
        QueryState::Failure(message) => format!("error: {message}"),
        QueryState::Success(report) => render_report(report),
    }
}

fn render_report(report: &WeatherReport) -> String {
    let current = &report.current;

    let mut out = String::new();
    out.push_str(&format!("{}, {}\n", current.city, current.country));
    out.push_str(&format!("{}\n", current.description));
    out.push_str(&format!(
        "{}°C (feels like {}°C)\n",
        current.temperature.round(),
        current.feels_like.round(),
    ));
    out.push_str(&format!(
        "Humidity {}%  Wind {} m/s  Pressure {} hPa\n",
        current.humidity, current.wind_speed, current.pressure,
    ));
    out.push_str(&format!("Icon: {}\n", icon_url(&current.icon)));

    let window = report.forecast_window();
    if !window.is_empty() {
        out.push_str("\n5-Day Forecast:\n");
        for day in window {
            out.push_str(&render_forecast_row(day));
            out.push('\n');
        }
    }

    out
}

fn render_forecast_row(day: &DailyForecast) -> String {
    format!(
        "  {:<12} {:<22} {}° / {}°",
        format_forecast_date(&day.date),
        day.description,
        day.temp_max.round(),
        day.temp_min.round(),
    )
}
