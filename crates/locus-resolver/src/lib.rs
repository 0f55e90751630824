//! Matches internal entities against the places provider and extracts
//! building outlines for the matched place.
//!
//! [`Resolver`] drives the autocomplete then text-search strategy over any
//! [`locus_places::PlaceSearch`] implementation. The scoring, normalization
//! and geometry helpers it uses are public for reuse and testing.

pub mod error;
pub mod geometry;
pub mod normalize;
pub mod resolve;
pub mod score;

pub use error::ResolveError;
pub use geometry::{
    build_geometry, extract_building_outlines, outlines_in_response, serialize_outlines, to_wkt,
    GeometryError,
};
pub use normalize::{entity_address, normalize, NormalizeError, NormalizedAddress};
pub use resolve::{ResolveOptions, Resolver};
pub use score::{
    address_score, full_score, name_score, ratio, AddressSide, ScoreBreakdown, ScoreError,
};
