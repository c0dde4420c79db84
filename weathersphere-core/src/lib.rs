//! Core library for the WeatherSphere client.
//!
//! This crate defines:
//! - Configuration (backend endpoint) handling
//! - Abstraction over the weather backend
//! - The query state machine driving fetch-and-render
//! - Shared domain models (reports, forecasts)
//!
//! It is used by `weathersphere-cli`, but can also be reused by other
//! binaries or services.

pub mod backend;
pub mod config;
pub mod controller;
pub mod model;

pub use backend::{QueryError, WeatherBackend, http::HttpBackend};
pub use config::{Config, DEFAULT_BACKEND_URL};
pub use controller::{QueryState, WeatherQueryController};
pub use model::{CurrentConditions, DailyForecast, FORECAST_DAYS, WeatherReport};
