//! Building outlines: locating them in a geocode response, validating them
//! as polygons, and serializing them for output.

mod build;
mod extract;
mod wkt;

use thiserror::Error;

pub use build::build_geometry;
pub use extract::{extract_building_outlines, outlines_in_response};
pub use wkt::{serialize_outlines, to_wkt};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("invalid outline geometry: {reason}")]
    InvalidGeometry { reason: String },
}

impl GeometryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
