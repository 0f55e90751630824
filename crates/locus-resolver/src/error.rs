use locus_places::PlacesError;
use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("places API error: {0}")]
    Places(#[from] PlacesError),

    #[error("outline error: {0}")]
    Geometry(#[from] GeometryError),

    /// Neither the provider nor our own record has coordinates.
    #[error("no coordinates available for entity {entity_id}")]
    MissingCoordinates { entity_id: i64 },
}
