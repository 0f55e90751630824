//! Fuzzy similarity between our records and provider results.
//!
//! All scores are on a 0–100 scale. Address comparison is weighted toward
//! the street, which is the most discriminating component.

use thiserror::Error;

use crate::normalize::{normalize, NormalizeError};

const STREET_WEIGHT: f64 = 0.5;
const CITY_WEIGHT: f64 = 0.2;
const STATE_WEIGHT: f64 = 0.2;
const COUNTRY_WEIGHT: f64 = 0.1;

/// Which side of an address comparison failed to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSide {
    Candidate,
    Entity,
}

impl std::fmt::Display for AddressSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candidate => write!(f, "candidate"),
            Self::Entity => write!(f, "entity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("could not normalize {side} address: {source}")]
    Normalization {
        side: AddressSide,
        #[source]
        source: NormalizeError,
    },
}

/// Per-component address similarity plus the weighted composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub street: u8,
    pub city: u8,
    pub state: u8,
    pub country: u8,
    pub composite: f64,
}

impl ScoreBreakdown {
    fn from_components(street: u8, city: u8, state: u8, country: u8) -> Self {
        let composite = f64::from(street) * STREET_WEIGHT
            + f64::from(city) * CITY_WEIGHT
            + f64::from(state) * STATE_WEIGHT
            + f64::from(country) * COUNTRY_WEIGHT;
        Self {
            street,
            city,
            state,
            country,
            composite,
        }
    }
}

/// Indel similarity scaled to 0–100 and rounded.
///
/// Computed as `2 * lcs / (len_a + len_b)` over chars, where `lcs` is the
/// longest common subsequence. Symmetric, and `ratio(x, x) == 100` for every
/// `x` including the empty string.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let similarity = (2 * lcs_len(&a, &b)) as f64 / total as f64;
    (similarity * 100.0).round() as u8
}

/// Longest common subsequence length, one DP row at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0_usize; b.len() + 1];
    let mut row = vec![0_usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Case-insensitive name similarity.
#[must_use]
pub fn name_score(a: &str, b: &str) -> u8 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}

/// Weighted similarity of two free-form addresses.
///
/// # Errors
///
/// Returns [`ScoreError::Normalization`] naming the side whose address has
/// fewer than four segments.
pub fn address_score(candidate: &str, entity: &str) -> Result<ScoreBreakdown, ScoreError> {
    let candidate = normalize(candidate).map_err(|source| ScoreError::Normalization {
        side: AddressSide::Candidate,
        source,
    })?;
    let entity = normalize(entity).map_err(|source| ScoreError::Normalization {
        side: AddressSide::Entity,
        source,
    })?;

    Ok(ScoreBreakdown::from_components(
        ratio(&candidate.street, &entity.street),
        ratio(&candidate.city, &entity.city),
        ratio(&candidate.state, &entity.state),
        ratio(&candidate.country, &entity.country),
    ))
}

/// Mean of the name score and the address composite.
///
/// # Errors
///
/// Propagates [`ScoreError`] from [`address_score`].
pub fn full_score(
    candidate_name: &str,
    entity_name: &str,
    candidate_address: &str,
    entity_address: &str,
) -> Result<f64, ScoreError> {
    let name = f64::from(name_score(candidate_name, entity_name));
    let address = address_score(candidate_address, entity_address)?;
    Ok((name + address.composite) / 2.0)
}

#[cfg(test)]
#[path = "score_test.rs"]
mod tests;
