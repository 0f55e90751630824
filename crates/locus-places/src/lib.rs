//! Client for the Google Places (autocomplete, text search) and Geocoding
//! destinations APIs.
//!
//! Rate limiting (HTTP 429) is retried under an explicit [`RetryPolicy`];
//! HTTP 400 is treated as "no usable result"; everything else surfaces as a
//! classified [`PlacesError`].

pub mod client;
pub mod error;
pub mod retry;
pub mod search;
pub mod types;

pub use client::{PlacesClient, PlacesClientConfig};
pub use error::PlacesError;
pub use retry::RetryPolicy;
pub use search::PlaceSearch;
pub use types::{
    AutocompleteSuggestion, Destination, GeocodeQuery, GeocodeResponse, LatLng, MatchCandidate,
    PrimaryPlace, TextSearchQuery,
};
