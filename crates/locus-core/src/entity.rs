use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// An internal organization record to be matched against the place provider.
///
/// `latitude`/`longitude` are the coordinates already on file, if any. A
/// value of `0.0` is treated the same as absent when biasing searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "address")]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "zip")]
    pub postal_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl CandidateEntity {
    /// Coordinates usable as a search bias: both present and both non-zero.
    #[must_use]
    pub fn bias_coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some((lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandidatesFile {
    candidates: Vec<CandidateEntity>,
}

/// Load candidate entities from a YAML or JSON file.
///
/// The file holds a single `candidates` list. JSON is accepted because it
/// is a subset of YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains
/// duplicate ids or blank names.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateEntity>, ConfigError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CandidatesIo {
        path: display.clone(),
        source: e,
    })?;

    let file: CandidatesFile =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::CandidatesParse {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    validate_candidates(&file.candidates).map_err(|reason| ConfigError::CandidatesParse {
        path: display,
        reason,
    })?;

    Ok(file.candidates)
}

fn validate_candidates(candidates: &[CandidateEntity]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for candidate in candidates {
        if candidate.name.trim().is_empty() {
            return Err(format!("candidate {} has an empty name", candidate.id));
        }
        if !seen.insert(candidate.id) {
            return Err(format!("duplicate candidate id {}", candidate.id));
        }
    }
    Ok(())
}
