use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::model::WeatherReport;

use super::{QueryError, WeatherBackend};

/// HTTP client for the WeatherSphere backend.
///
/// Issues `GET {base_url}/weather?city=<name>`. No authentication, no
/// retries, and deliberately no timeout: a stalled backend leaves the
/// caller suspended until the connection drops.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, QueryError> {
        let url = format!("{}/weather", self.base_url);
        debug!(url = %url, city = %city, "fetching weather");

        // reqwest percent-encodes the query value for us.
        let res = self
            .http
            .get(&url)
            .query(&[("city", city)])
            .send()
            .await
            .map_err(QueryError::from_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(QueryError::from_transport)?;

        if !status.is_success() {
            debug!(status = %status, "backend returned an error response");
            return Err(QueryError::from_error_body(&body));
        }

        serde_json::from_str(&body).map_err(QueryError::from_transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
    }

    #[test]
    fn base_url_is_kept_verbatim_otherwise() {
        let backend = HttpBackend::new("https://weather.example.com/api");
        assert_eq!(backend.base_url(), "https://weather.example.com/api");
    }
}
