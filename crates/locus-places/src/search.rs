//! The provider seam the resolver is written against.

use async_trait::async_trait;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::{
    AutocompleteSuggestion, GeocodeQuery, GeocodeResponse, LatLng, MatchCandidate,
    TextSearchQuery,
};

/// Place lookups needed to resolve an entity.
///
/// [`PlacesClient`] is the production implementation. Tests substitute an
/// in-memory fake.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Autocomplete suggestions for `name`, optionally biased toward `bias`.
    async fn autocomplete(
        &self,
        name: &str,
        bias: Option<LatLng>,
    ) -> Result<Vec<AutocompleteSuggestion>, PlacesError>;

    /// Text-search hits in relevance order.
    async fn text_search(
        &self,
        query: &TextSearchQuery,
    ) -> Result<Vec<MatchCandidate>, PlacesError>;

    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResponse, PlacesError>;
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    async fn autocomplete(
        &self,
        name: &str,
        bias: Option<LatLng>,
    ) -> Result<Vec<AutocompleteSuggestion>, PlacesError> {
        PlacesClient::autocomplete(self, name, bias).await
    }

    async fn text_search(
        &self,
        query: &TextSearchQuery,
    ) -> Result<Vec<MatchCandidate>, PlacesError> {
        PlacesClient::text_search(self, query).await
    }

    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResponse, PlacesError> {
        PlacesClient::geocode(self, query).await
    }
}
