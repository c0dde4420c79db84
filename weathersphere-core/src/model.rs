use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of forecast days the client renders.
pub const FORECAST_DAYS: usize = 5;

/// Current conditions as reported by the backend for one city.
///
/// Field names match the backend JSON one-to-one. `wind_direction`,
/// `visibility` and `timestamp` are emitted by newer backend builds only,
/// so they default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    #[serde(default)]
    pub wind_direction: Option<f64>,
    /// Visibility in km.
    #[serde(default)]
    pub visibility: Option<f64>,
    /// Unix timestamp of the observation.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// One day of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub icon: String,
    pub description: String,
    pub temp_max: f64,
    pub temp_min: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
}

impl DailyForecast {
    /// Parse the backend date string into a typed calendar date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Full backend response: current conditions plus the forecast sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
}

impl WeatherReport {
    /// The forecast entries the client actually renders: the first
    /// [`FORECAST_DAYS`] in original order. Shorter sequences are returned
    /// as-is, excess entries are ignored.
    pub fn forecast_window(&self) -> &[DailyForecast] {
        let end = FORECAST_DAYS.min(self.forecast.len());
        &self.forecast[..end]
    }
}
