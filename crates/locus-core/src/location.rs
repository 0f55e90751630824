//! Pipeline outputs handed to the persistence sink.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which tier of the match strategy produced a resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Autocomplete,
    TextSearch,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Autocomplete => write!(f, "autocomplete"),
            MatchMethod::TextSearch => write!(f, "text_search"),
        }
    }
}

/// How building outlines are serialized on the way to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineFormat {
    /// Well-known text, e.g. `POLYGON ((x y, ...))`.
    #[default]
    Wkt,
    /// The provider's `{type, coordinates}` object, untouched.
    Raw,
}

impl FromStr for OutlineFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wkt" => Ok(OutlineFormat::Wkt),
            "raw" => Ok(OutlineFormat::Raw),
            other => Err(format!("unknown outline format \"{other}\"; expected wkt or raw")),
        }
    }
}

/// A single serialized building outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outline {
    Wkt(String),
    Raw(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub entity_id: i64,
    pub place_id: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub outlines: Vec<Outline>,
    pub match_method: MatchMethod,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Text search returned nothing for the entity.
    NoSearchResults,
    /// The top text-search hit scored at or below the threshold.
    TopResultRejected,
    /// The top text-search hit carried no place id to geocode.
    TopResultWithoutId,
}

/// The pipeline stage an entity failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    TextSearch,
    Geocode,
    ExtractOutlines,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::TextSearch => write!(f, "text_search"),
            FailureStage::Geocode => write!(f, "geocode"),
            FailureStage::ExtractOutlines => write!(f, "extract_outlines"),
        }
    }
}

/// Terminal outcome of resolving one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedLocation),
    Unresolved {
        entity_id: i64,
        reason: UnresolvedReason,
    },
    Failed {
        entity_id: i64,
        stage: FailureStage,
        error: String,
    },
}

impl Resolution {
    #[must_use]
    pub fn entity_id(&self) -> i64 {
        match self {
            Resolution::Resolved(location) => location.entity_id,
            Resolution::Unresolved { entity_id, .. } | Resolution::Failed { entity_id, .. } => {
                *entity_id
            }
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Resolution::Failed { .. })
    }
}

/// Where the outlines-only flow gets its geocoding query from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineSource {
    /// The entity's own latitude/longitude.
    Coordinate,
    /// The entity's own postal address.
    Address,
}

/// Outlines found for an entity without any name matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSet {
    pub entity_id: i64,
    pub source: OutlineSource,
    pub outlines: Vec<Outline>,
}
