use crate::model::WeatherReport;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod http;

/// Fallback message for a non-2xx response whose body carries no usable
/// `detail` field.
pub const FETCH_FAILED: &str = "Failed to fetch weather data";

/// Fallback message for a transport failure with no description of its own.
pub const TRANSPORT_FAILED: &str = "An error occurred while fetching weather data";

/// Everything that can go wrong between a submitted query and a settled
/// outcome. Each variant's `Display` is the exact message surfaced to the
/// user in a `Failure` state.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query was empty or whitespace-only. Raised before any request.
    #[error("Please enter a city name")]
    EmptyQuery,

    /// The backend answered with a non-success status. The message is the
    /// `detail` field of its JSON body when present, else [`FETCH_FAILED`].
    #[error("{0}")]
    Backend(String),

    /// Network failure, body-read failure or a malformed success body.
    #[error("{0}")]
    Transport(String),
}

impl QueryError {
    /// Build a `Backend` error from a raw non-2xx response body.
    ///
    /// The body SHOULD be JSON with a `detail` string; anything else
    /// degrades to the fixed fallback.
    pub fn from_error_body(body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail")?.as_str().map(str::to_owned));

        Self::Backend(detail.unwrap_or_else(|| FETCH_FAILED.to_string()))
    }

    /// Build a `Transport` error, falling back to the generic message when
    /// the underlying error has no description.
    pub fn from_transport<E: std::fmt::Display>(err: E) -> Self {
        let msg = err.to_string();
        if msg.is_empty() {
            Self::Transport(TRANSPORT_FAILED.to_string())
        } else {
            Self::Transport(msg)
        }
    }
}

/// Source of weather reports keyed by city name.
///
/// The production implementation is [`http::HttpBackend`]; tests substitute
/// deterministic stubs.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    /// Fetch current conditions and forecast for an already-trimmed,
    /// non-empty city name.
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, QueryError>;
}
