//! Per-entity resolution: autocomplete, then text search, then geocode and
//! outline extraction for whichever match was accepted.

use std::fmt::Display;

use chrono::Utc;
use locus_core::{
    AppConfig, CandidateEntity, FailureStage, MatchMethod, Outline, OutlineFormat, OutlineSet,
    OutlineSource, Resolution, ResolvedLocation, UnresolvedReason,
};
use locus_places::{
    GeocodeQuery, GeocodeResponse, LatLng, MatchCandidate, PlaceSearch, TextSearchQuery,
};

use crate::error::ResolveError;
use crate::geometry::{outlines_in_response, serialize_outlines};
use crate::normalize::entity_address;
use crate::score::{address_score, name_score};

/// Knobs for [`Resolver`]. Scores must be strictly greater than a
/// threshold to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub autocomplete_enabled: bool,
    pub autocomplete_name_threshold: f64,
    pub autocomplete_address_threshold: f64,
    pub text_search_threshold: f64,
    pub extract_outlines: bool,
    pub outline_format: OutlineFormat,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            autocomplete_enabled: true,
            autocomplete_name_threshold: 85.0,
            autocomplete_address_threshold: 85.0,
            text_search_threshold: 85.0,
            extract_outlines: true,
            outline_format: OutlineFormat::Wkt,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            autocomplete_enabled: config.enable_autocomplete,
            autocomplete_name_threshold: config.autocomplete_name_threshold,
            autocomplete_address_threshold: config.autocomplete_address_threshold,
            text_search_threshold: config.text_search_threshold,
            extract_outlines: config.extract_outlines,
            outline_format: config.outline_format,
        }
    }
}

/// Resolves candidate entities to provider places.
#[derive(Debug)]
pub struct Resolver<P> {
    places: P,
    options: ResolveOptions,
}

impl<P: PlaceSearch> Resolver<P> {
    #[must_use]
    pub fn new(places: P, options: ResolveOptions) -> Self {
        Self { places, options }
    }

    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolves one entity to a place, or reports why it could not be.
    ///
    /// An accepted autocomplete suggestion whose geocode or outline step
    /// fails falls through to text search. Failures on the text-search path
    /// are reported as [`Resolution::Failed`] rather than returned, so a
    /// batch can carry on to the next entity.
    pub async fn resolve(&self, entity: &CandidateEntity) -> Resolution {
        if self.options.autocomplete_enabled {
            if let Some(place_id) = self.autocomplete_match(entity).await {
                match self.complete_autocomplete(entity, &place_id).await {
                    Ok(location) => {
                        tracing::info!(
                            entity_id = entity.id,
                            place_id = %location.place_id,
                            outlines = location.outlines.len(),
                            "resolved via autocomplete"
                        );
                        return Resolution::Resolved(location);
                    }
                    Err(err) => tracing::error!(
                        entity_id = entity.id,
                        place_id = %place_id,
                        error = %err,
                        "autocomplete match could not be completed; falling back to text search"
                    ),
                }
            }
        } else {
            tracing::debug!(entity_id = entity.id, "autocomplete disabled");
        }

        self.resolve_by_text_search(entity).await
    }

    /// Geocodes `entity` by coordinate or address and returns the building
    /// outlines found there, with no name matching.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::MissingCoordinates`] for [`OutlineSource::Coordinate`]
    ///   when the entity has no non-zero coordinates on file.
    /// - [`ResolveError::Places`] if the geocode call fails.
    /// - [`ResolveError::Geometry`] if an outline is malformed.
    pub async fn outlines_only(
        &self,
        entity: &CandidateEntity,
        source: OutlineSource,
    ) -> Result<OutlineSet, ResolveError> {
        let query = match source {
            OutlineSource::Coordinate => {
                let (latitude, longitude) = entity
                    .bias_coordinates()
                    .ok_or(ResolveError::MissingCoordinates {
                        entity_id: entity.id,
                    })?;
                GeocodeQuery::Coordinate(LatLng {
                    latitude,
                    longitude,
                })
            }
            OutlineSource::Address => GeocodeQuery::Address {
                street: entity.street.clone(),
                city: entity.city.clone(),
                state: entity.state.clone(),
                postal_code: entity.postal_code.clone(),
                country: entity.country.clone(),
            },
        };

        let response = self.places.geocode(&query).await?;
        let raw = outlines_in_response(&response);
        let outlines = serialize_outlines(&raw, self.options.outline_format)?;
        if outlines.is_empty() {
            tracing::info!(entity_id = entity.id, ?source, "no building outlines found");
        } else {
            tracing::info!(
                entity_id = entity.id,
                ?source,
                count = outlines.len(),
                "building outlines found"
            );
        }

        Ok(OutlineSet {
            entity_id: entity.id,
            source,
            outlines,
        })
    }

    /// Place id of the first suggestion whose name and address both clear
    /// their thresholds.
    async fn autocomplete_match(&self, entity: &CandidateEntity) -> Option<String> {
        let bias = entity
            .bias_coordinates()
            .map(|(latitude, longitude)| LatLng {
                latitude,
                longitude,
            });
        let suggestions = match self.places.autocomplete(&entity.name, bias).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::error!(
                    entity_id = entity.id,
                    error = %err,
                    "autocomplete call failed"
                );
                return None;
            }
        };

        let our_address = entity_address(entity);
        for suggestion in suggestions {
            let Some(place_id) = suggestion.place_id else {
                continue;
            };
            if suggestion.main_text.is_empty() || suggestion.secondary_text.is_empty() {
                continue;
            }

            let name = name_score(&entity.name, &suggestion.main_text);
            tracing::info!(
                entity_id = entity.id,
                candidate_name = %suggestion.main_text,
                name_score = name,
                "autocomplete name check"
            );
            if f64::from(name) <= self.options.autocomplete_name_threshold {
                continue;
            }

            let breakdown = match address_score(&suggestion.secondary_text, &our_address) {
                Ok(breakdown) => breakdown,
                Err(err) => {
                    tracing::warn!(
                        entity_id = entity.id,
                        error = %err,
                        "skipping autocomplete suggestion"
                    );
                    continue;
                }
            };
            tracing::info!(
                entity_id = entity.id,
                candidate_address = %suggestion.secondary_text,
                address_score = breakdown.composite,
                "autocomplete address check"
            );
            if breakdown.composite <= self.options.autocomplete_address_threshold {
                continue;
            }

            return Some(place_id);
        }

        tracing::info!(
            entity_id = entity.id,
            "no autocomplete suggestion qualified"
        );
        None
    }

    async fn complete_autocomplete(
        &self,
        entity: &CandidateEntity,
        place_id: &str,
    ) -> Result<ResolvedLocation, ResolveError> {
        let response = self
            .places
            .geocode(&GeocodeQuery::PlaceId(place_id.to_owned()))
            .await?;
        let primary = response.first_primary();

        let (latitude, longitude) = primary
            .and_then(|p| p.location)
            .map(|l| (l.latitude, l.longitude))
            .or_else(|| entity.latitude.zip(entity.longitude))
            .ok_or(ResolveError::MissingCoordinates {
                entity_id: entity.id,
            })?;
        let formatted_address = primary
            .and_then(|p| p.formatted_address.clone())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| entity_address(entity));
        let outlines = self.outlines_for(&response)?;

        Ok(ResolvedLocation {
            entity_id: entity.id,
            place_id: place_id.to_owned(),
            formatted_address,
            latitude,
            longitude,
            outlines,
            match_method: MatchMethod::Autocomplete,
            resolved_at: Utc::now(),
        })
    }

    async fn resolve_by_text_search(&self, entity: &CandidateEntity) -> Resolution {
        let query = TextSearchQuery {
            name: entity.name.clone(),
            city: entity.city.clone(),
            state: entity.state.clone(),
            country: entity.country.clone(),
        };
        let candidates = match self.places.text_search(&query).await {
            Ok(candidates) => candidates,
            Err(err) => return failed(entity, FailureStage::TextSearch, &err),
        };

        let Some(top) = candidates.into_iter().next() else {
            tracing::info!(entity_id = entity.id, "text search returned no results");
            return Resolution::Unresolved {
                entity_id: entity.id,
                reason: UnresolvedReason::NoSearchResults,
            };
        };

        let Some(place_id) = top.place_id.clone() else {
            tracing::warn!(
                entity_id = entity.id,
                candidate_name = %top.display_name,
                "top text search result has no place id"
            );
            return Resolution::Unresolved {
                entity_id: entity.id,
                reason: UnresolvedReason::TopResultWithoutId,
            };
        };

        let score = name_score(&entity.name, &top.display_name);
        tracing::info!(
            entity_id = entity.id,
            candidate_name = %top.display_name,
            name_score = score,
            "checking top text search result"
        );
        if f64::from(score) <= self.options.text_search_threshold {
            return Resolution::Unresolved {
                entity_id: entity.id,
                reason: UnresolvedReason::TopResultRejected,
            };
        }

        let response = if self.options.extract_outlines {
            match self
                .places
                .geocode(&GeocodeQuery::PlaceId(place_id.clone()))
                .await
            {
                Ok(response) => Some(response),
                Err(err) => return failed(entity, FailureStage::Geocode, &err),
            }
        } else {
            None
        };

        let outlines = match response.as_ref().map(|r| self.outlines_for(r)) {
            Some(Ok(outlines)) => outlines,
            Some(Err(err)) => return failed(entity, FailureStage::ExtractOutlines, &err),
            None => Vec::new(),
        };

        match text_search_location(entity, place_id, top, response.as_ref(), outlines) {
            Ok(location) => {
                tracing::info!(
                    entity_id = entity.id,
                    place_id = %location.place_id,
                    outlines = location.outlines.len(),
                    "resolved via text search"
                );
                Resolution::Resolved(location)
            }
            Err(err) => failed(entity, FailureStage::Geocode, &err),
        }
    }

    fn outlines_for(&self, response: &GeocodeResponse) -> Result<Vec<Outline>, ResolveError> {
        if !self.options.extract_outlines {
            return Ok(Vec::new());
        }
        let raw = outlines_in_response(response);
        Ok(serialize_outlines(&raw, self.options.outline_format)?)
    }
}

/// Location for a text-search match. The hit's own address and coordinates
/// win; the geocode primary and then the entity fill any gaps.
fn text_search_location(
    entity: &CandidateEntity,
    place_id: String,
    top: MatchCandidate,
    response: Option<&GeocodeResponse>,
    outlines: Vec<Outline>,
) -> Result<ResolvedLocation, ResolveError> {
    let primary = response.and_then(GeocodeResponse::first_primary);

    let (latitude, longitude) = top
        .location
        .or_else(|| primary.and_then(|p| p.location))
        .map(|l| (l.latitude, l.longitude))
        .or_else(|| entity.latitude.zip(entity.longitude))
        .ok_or(ResolveError::MissingCoordinates {
            entity_id: entity.id,
        })?;
    let formatted_address = top
        .formatted_address
        .filter(|a| !a.is_empty())
        .or_else(|| primary.and_then(|p| p.formatted_address.clone()))
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| entity_address(entity));

    Ok(ResolvedLocation {
        entity_id: entity.id,
        place_id,
        formatted_address,
        latitude,
        longitude,
        outlines,
        match_method: MatchMethod::TextSearch,
        resolved_at: Utc::now(),
    })
}

fn failed(entity: &CandidateEntity, stage: FailureStage, err: &dyn Display) -> Resolution {
    tracing::error!(
        entity_id = entity.id,
        %stage,
        error = %err,
        "entity resolution failed"
    );
    Resolution::Failed {
        entity_id: entity.id,
        stage,
        error: err.to_string(),
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
