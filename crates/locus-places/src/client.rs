//! HTTP client for the places and geocoding endpoints.
//!
//! All three operations are JSON POSTs authenticated with the
//! `X-Goog-Api-Key` header. Status handling is shared: 429 feeds the
//! [`RetryPolicy`], 400 is logged and decoded as an empty response, and any
//! other non-2xx becomes [`PlacesError::Upstream`].

use std::time::Duration;

use locus_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::PlacesError;
use crate::retry::RetryPolicy;
use crate::types::{
    AutocompleteResponse, AutocompleteSuggestion, GeocodeQuery, GeocodeResponse, LatLng,
    MatchCandidate, TextSearchQuery, TextSearchResponse,
};

const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1";
const DEFAULT_GEOCODE_URL: &str = "https://geocode.googleapis.com/v4alpha/geocode/destinations";
const DEFAULT_USER_AGENT: &str = "locus/0.1 (location-resolution)";

const TEXT_SEARCH_FIELD_MASK: &str =
    "places.id,places.displayName,places.formattedAddress,places.location";
const GEOCODE_FIELD_MASK: &str = "destinations.primary.place,destinations.primary.location,\
destinations.primary.formattedAddress,destinations.primary.structureType,\
destinations.primary.displayPolygon,destinations.containingPlaces";

/// Upstream error bodies are truncated to this many characters before
/// being stored in [`PlacesError::Upstream`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Construction parameters for [`PlacesClient`].
#[derive(Clone)]
pub struct PlacesClientConfig {
    pub api_key: String,
    pub places_base_url: String,
    pub geocode_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Radius of the autocomplete location-bias circle, in metres.
    pub location_bias_radius_m: f64,
    pub user_agent: String,
}

impl std::fmt::Debug for PlacesClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClientConfig")
            .field("api_key", &"[redacted]")
            .field("places_base_url", &self.places_base_url)
            .field("geocode_url", &self.geocode_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("location_bias_radius_m", &self.location_bias_radius_m)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl PlacesClientConfig {
    /// Production endpoints with default timeout and retry policy.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_owned(),
            geocode_url: DEFAULT_GEOCODE_URL.to_owned(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            location_bias_radius_m: 50_000.0,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.google_api_key.clone(),
            places_base_url: config.places_base_url.clone(),
            geocode_url: config.geocode_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: config.retry_max_attempts,
                initial_wait: Duration::from_secs(config.retry_initial_wait_secs),
                max_wait: Duration::from_secs(config.retry_max_wait_secs),
                multiplier: 1.0,
            },
            location_bias_radius_m: config.location_bias_radius_m,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Client for the places autocomplete, text search and geocoding
/// destinations endpoints.
///
/// Use [`PlacesClientConfig::new`] for production defaults, or override the
/// URLs to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    autocomplete_url: Url,
    text_search_url: Url,
    geocode_url: Url,
    retry: RetryPolicy,
    location_bias_radius_m: f64,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("autocomplete_url", &self.autocomplete_url.as_str())
            .field("text_search_url", &self.text_search_url.as_str())
            .field("geocode_url", &self.geocode_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Builds the client and validates every endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if either
    /// configured URL does not parse.
    pub fn new(config: PlacesClientConfig) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        let places_base = config.places_base_url.trim_end_matches('/');
        let autocomplete_url = parse_url(&format!("{places_base}/places:autocomplete"))?;
        let text_search_url = parse_url(&format!("{places_base}/places:searchText"))?;
        let geocode_url = parse_url(&config.geocode_url)?;

        Ok(Self {
            client,
            api_key: config.api_key,
            autocomplete_url,
            text_search_url,
            geocode_url,
            retry: config.retry,
            location_bias_radius_m: config.location_bias_radius_m,
        })
    }

    /// Autocomplete suggestions for `name`.
    ///
    /// When `bias` is given the request carries a `locationBias` circle
    /// centred on it.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::RateLimited`] if every attempt got HTTP 429.
    /// - [`PlacesError::Upstream`] on any other non-2xx status except 400.
    /// - [`PlacesError::Http`] on network failure or timeout.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn autocomplete(
        &self,
        name: &str,
        bias: Option<LatLng>,
    ) -> Result<Vec<AutocompleteSuggestion>, PlacesError> {
        let body = autocomplete_body(name, bias, self.location_bias_radius_m);
        let response: AutocompleteResponse = self
            .post_json("autocomplete", &self.autocomplete_url, None, &body)
            .await?;
        let suggestions = response.into_suggestions();
        tracing::debug!(name, count = suggestions.len(), "autocomplete returned");
        Ok(suggestions)
    }

    /// Text-search hits for `"name, city, state, country"`.
    ///
    /// # Errors
    ///
    /// Same classification as [`PlacesClient::autocomplete`].
    pub async fn text_search(
        &self,
        query: &TextSearchQuery,
    ) -> Result<Vec<MatchCandidate>, PlacesError> {
        let text_query = query.to_query_string();
        let body = json!({ "textQuery": text_query });
        let response: TextSearchResponse = self
            .post_json(
                "text_search",
                &self.text_search_url,
                Some(TEXT_SEARCH_FIELD_MASK),
                &body,
            )
            .await?;
        let candidates = response.into_candidates();
        tracing::debug!(
            query = %text_query,
            count = candidates.len(),
            "text search returned"
        );
        Ok(candidates)
    }

    /// Geocodes by place id, coordinate or address.
    ///
    /// # Errors
    ///
    /// Same classification as [`PlacesClient::autocomplete`].
    pub async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResponse, PlacesError> {
        let body = query.to_body();
        let response: GeocodeResponse = self
            .post_json("geocode", &self.geocode_url, Some(GEOCODE_FIELD_MASK), &body)
            .await?;
        tracing::debug!(
            destinations = response.destinations.len(),
            "geocode returned"
        );
        Ok(response)
    }

    /// POSTs `body` under the retry policy and decodes the response.
    async fn post_json<T>(
        &self,
        operation: &'static str,
        url: &Url,
        field_mask: Option<&str>,
        body: &Value,
    ) -> Result<T, PlacesError>
    where
        T: DeserializeOwned + Default,
    {
        let result = self
            .retry
            .run(operation, move || self.send_once(operation, url, field_mask, body))
            .await;
        if let Err(ref err) = result {
            tracing::error!(operation, error = %err, "places request failed");
        }
        result
    }

    async fn send_once<T>(
        &self,
        operation: &'static str,
        url: &Url,
        field_mask: Option<&str>,
        body: &Value,
    ) -> Result<T, PlacesError>
    where
        T: DeserializeOwned + Default,
    {
        let mut request = self
            .client
            .post(url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .json(body);
        if let Some(mask) = field_mask {
            request = request.header("X-Goog-FieldMask", mask);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited {
                operation,
                attempts: 1,
            });
        }
        if status == StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(
                operation,
                body = %truncate(&text),
                "provider rejected request with HTTP 400; treating as no result"
            );
            return Ok(T::default());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlacesError::Upstream {
                operation,
                status: status.as_u16(),
                body: truncate(&text),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| PlacesError::Deserialize {
            context: operation.to_owned(),
            source,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, PlacesError> {
    Url::parse(raw).map_err(|e| PlacesError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn autocomplete_body(name: &str, bias: Option<LatLng>, radius_m: f64) -> Value {
    let mut body = json!({ "input": name });
    if let Some(center) = bias {
        body["locationBias"] = json!({
            "circle": {
                "center": {
                    "latitude": center.latitude,
                    "longitude": center.longitude,
                },
                "radius": radius_m,
            }
        });
    }
    body
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
