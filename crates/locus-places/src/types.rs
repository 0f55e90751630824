//! Request and response types for the places and geocoding endpoints.
//!
//! Wire types mirror the provider's camelCase JSON with every field
//! optional; the public types are what the resolver works with.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// One autocomplete place prediction, reduced to its structured text.
///
/// `main_text` is the place name, `secondary_text` its address. Either may
/// be empty when the provider omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteSuggestion {
    pub place_id: Option<String>,
    pub main_text: String,
    pub secondary_text: String,
}

/// A text-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// `None` when the provider returned a hit without an id.
    pub place_id: Option<String>,
    pub display_name: String,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
}

/// Fields joined into the free-text search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearchQuery {
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl TextSearchQuery {
    /// `"name, city, state, country"`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        [&self.name, &self.city, &self.state, &self.country]
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The three ways to ask the destinations endpoint for a place.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeQuery {
    PlaceId(String),
    Coordinate(LatLng),
    Address {
        street: String,
        city: String,
        state: String,
        postal_code: String,
        country: String,
    },
}

impl GeocodeQuery {
    #[must_use]
    pub fn to_body(&self) -> Value {
        match self {
            GeocodeQuery::PlaceId(id) => json!({ "place": format!("places/{id}") }),
            GeocodeQuery::Coordinate(location) => json!({
                "locationQuery": {
                    "location": {
                        "latitude": location.latitude,
                        "longitude": location.longitude,
                    }
                }
            }),
            GeocodeQuery::Address {
                street,
                city,
                state,
                postal_code,
                country,
            } => json!({
                "addressQuery": {
                    "addressQuery": format!("{street}, {city}, {state} {postal_code}, {country}")
                }
            }),
        }
    }
}

/// Response of the destinations endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl GeocodeResponse {
    /// `primary` of the first destination, if any.
    #[must_use]
    pub fn first_primary(&self) -> Option<&PrimaryPlace> {
        self.destinations.first().and_then(|d| d.primary.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default)]
    pub primary: Option<PrimaryPlace>,
    /// Arbitrarily nested places (buildings, grounds, ...) that contain
    /// the primary place. Kept as a JSON tree for the outline walk.
    #[serde(default)]
    pub containing_places: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryPlace {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub structure_type: Option<String>,
    /// GeoJSON-shaped `{type, coordinates}` object.
    #[serde(default)]
    pub display_polygon: Option<Value>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutocompleteResponse {
    #[serde(default)]
    pub suggestions: Vec<SuggestionWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SuggestionWire {
    #[serde(default)]
    pub place_prediction: Option<PlacePredictionWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlacePredictionWire {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub structured_format: Option<StructuredFormatWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StructuredFormatWire {
    #[serde(default)]
    pub main_text: Option<TextWire>,
    #[serde(default)]
    pub secondary_text: Option<TextWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextWire {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TextSearchResponse {
    #[serde(default)]
    pub places: Vec<PlaceWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceWire {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<TextWire>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<LatLng>,
}

impl From<PlacePredictionWire> for AutocompleteSuggestion {
    fn from(value: PlacePredictionWire) -> Self {
        let (main_text, secondary_text) = value.structured_format.map_or_else(
            || (String::new(), String::new()),
            |f| {
                (
                    f.main_text.map(|t| t.text).unwrap_or_default(),
                    f.secondary_text.map(|t| t.text).unwrap_or_default(),
                )
            },
        );
        Self {
            place_id: value.place_id.filter(|id| !id.is_empty()),
            main_text,
            secondary_text,
        }
    }
}

impl AutocompleteResponse {
    /// Place predictions in provider order. Query predictions (search
    /// phrases with no place behind them) are dropped.
    pub(crate) fn into_suggestions(self) -> Vec<AutocompleteSuggestion> {
        self.suggestions
            .into_iter()
            .filter_map(|s| s.place_prediction)
            .map(AutocompleteSuggestion::from)
            .collect()
    }
}

impl TextSearchResponse {
    /// Hits in provider order, including any without a place id.
    pub(crate) fn into_candidates(self) -> Vec<MatchCandidate> {
        self.places
            .into_iter()
            .map(|p| MatchCandidate {
                place_id: p.id.filter(|id| !id.is_empty()),
                display_name: p.display_name.map(|t| t.text).unwrap_or_default(),
                formatted_address: p.formatted_address,
                location: p.location,
            })
            .collect()
    }
}
