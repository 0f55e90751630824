//! Address normalization ahead of fuzzy comparison.
//!
//! Addresses from the provider and from our own records disagree mostly on
//! how the country is written, so country aliases are canonicalized first.
//! The result is split into street, city, state and country so each part
//! can be weighted separately by [`crate::score`].

use std::fmt;
use std::sync::LazyLock;

use locus_core::CandidateEntity;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Fewer than four `", "`-separated segments.
    #[error("incomplete address: {address}")]
    IncompleteAddress { address: String },
}

/// Country alias rewrites, applied in order.
static COUNTRY_ALIASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(
                r"(?i)\b(?:United States of America|United States|America|U\.?S\.?A\.?|USA|US|U\.?S\.?)\b\.?",
            )
            .expect("valid united states regex"),
            "USA",
        ),
        (
            Regex::new(r"(?i)\b(BHS|Bahamas)").expect("valid bahamas regex"),
            "Bahamas",
        ),
    ]
});

/// A lower-cased address split into its comparable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    /// Everything before the city, rejoined with `", "`.
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.street, self.city, self.state, self.country
        )
    }
}

/// Normalizes `raw` into street, city, state and country.
///
/// The last three segments are country, state and city; whatever precedes
/// them is the street.
///
/// # Errors
///
/// Returns [`NormalizeError::IncompleteAddress`] when the address has fewer
/// than four segments after splitting on `", "`.
pub fn normalize(raw: &str) -> Result<NormalizedAddress, NormalizeError> {
    let mut address = raw.to_owned();
    for (pattern, replacement) in COUNTRY_ALIASES.iter() {
        address = pattern.replace_all(&address, *replacement).into_owned();
    }
    let address = address.to_lowercase();

    let parts: Vec<&str> = address.split(", ").collect();
    let [street @ .., city, state, country] = parts.as_slice() else {
        return Err(NormalizeError::IncompleteAddress {
            address: raw.to_owned(),
        });
    };
    if street.is_empty() {
        return Err(NormalizeError::IncompleteAddress {
            address: raw.to_owned(),
        });
    }

    Ok(NormalizedAddress {
        street: street.join(", "),
        city: (*city).to_owned(),
        state: (*state).to_owned(),
        country: (*country).to_owned(),
    })
}

/// The comparison string for an entity: non-empty street, city, state and
/// country joined with `", "`.
#[must_use]
pub fn entity_address(entity: &CandidateEntity) -> String {
    [&entity.street, &entity.city, &entity.state, &entity.country]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
