use crate::api::traits::{PlaceSource, RawCollections};
use crate::error::{Error, Result};
use crate::models::{EventRecord, HotelRecord, RestaurantRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8_000);

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Connection parameters for the places API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `http://127.0.0.1:8000/api`
    pub base_url: String,
    /// Per-request timeout; a slow endpoint fails like any other fetch error
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// REST client for the places API.
pub struct PlacesClient {
    client: Client,
    config: ClientConfig,
}

impl PlacesClient {
    /// Create a client against the default local API.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom connection parameters.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Transport(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub async fn fetch_hotels(&self) -> Result<Vec<HotelRecord>> {
        self.fetch_collection("hotels").await
    }

    pub async fn fetch_restaurants(&self) -> Result<Vec<RestaurantRecord>> {
        self.fetch_collection("restaurants").await
    }

    pub async fn fetch_events(&self) -> Result<Vec<EventRecord>> {
        self.fetch_collection("events").await
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}/", self.config.base_url.trim_end_matches('/'), path);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| self.classify(err))?;

        if !status.is_success() {
            warn!("{} returned status {}", url, status);
            let detail = if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body
            };
            return Err(Error::Transport(detail));
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|err| Error::Decode(err.to_string()))?;
        let items = unwrap_envelope(payload)?;

        serde_json::from_value(Value::Array(items)).map_err(|err| Error::Decode(err.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Transport(err.to_string())
        }
    }
}

/// Endpoints answer either a bare list or a paginated `{"results": [...]}`
/// envelope; both decode to the same collection.
fn unwrap_envelope(payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::Decode(
                "expected a list or a results envelope".to_string(),
            )),
        },
        _ => Err(Error::Decode(
            "expected a list or a results envelope".to_string(),
        )),
    }
}

#[async_trait]
impl PlaceSource for PlacesClient {
    async fn fetch_all(&self) -> Result<RawCollections> {
        debug!("Fetching all collections from {}", self.config.base_url);

        let (hotels, restaurants, events) = tokio::try_join!(
            self.fetch_hotels(),
            self.fetch_restaurants(),
            self.fetch_events(),
        )?;

        Ok(RawCollections {
            hotels,
            restaurants,
            events,
        })
    }

    fn source_name(&self) -> &'static str {
        "places-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_unwraps_results_array() {
        let items = unwrap_envelope(json!({ "count": 2, "results": [1, 2] })).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn bare_array_passes_through() {
        let items = unwrap_envelope(json!([1, 2, 3])).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn scalar_payload_is_a_decode_error() {
        let err = unwrap_envelope(json!(42)).unwrap_err();
        assert_eq!(err.category(), "decode");

        let err = unwrap_envelope(json!({ "detail": "not found" })).unwrap_err();
        assert_eq!(err.category(), "decode");
    }
}
