use std::fmt::Write;

use geo::{Geometry, LineString, Polygon};
use locus_core::{Outline, OutlineFormat};
use serde_json::Value;

use super::{build_geometry, GeometryError};

/// Well-known text for a polygon or multipolygon, e.g.
/// `POLYGON ((x y, x y, ...), (...))`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] for any other geometry kind.
pub fn to_wkt(geometry: &Geometry<f64>) -> Result<String, GeometryError> {
    let mut out = String::new();
    match geometry {
        Geometry::Polygon(polygon) => {
            out.push_str("POLYGON ");
            write_polygon(&mut out, polygon);
        }
        Geometry::MultiPolygon(multi) => {
            out.push_str("MULTIPOLYGON (");
            for (i, polygon) in multi.0.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_polygon(&mut out, polygon);
            }
            out.push(')');
        }
        _ => {
            return Err(GeometryError::invalid(
                "only polygons and multipolygons can be written as WKT",
            ))
        }
    }
    Ok(out)
}

fn write_polygon(out: &mut String, polygon: &Polygon<f64>) {
    out.push('(');
    write_ring(out, polygon.exterior());
    for interior in polygon.interiors() {
        out.push_str(", ");
        write_ring(out, interior);
    }
    out.push(')');
}

fn write_ring(out: &mut String, ring: &LineString<f64>) {
    out.push('(');
    for (i, coord) in ring.0.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{} {}", coord.x, coord.y);
    }
    out.push(')');
}

/// Validates every raw outline and renders it in `format`.
///
/// Outlines of unsupported types are dropped.
///
/// # Errors
///
/// Returns the first [`GeometryError`] hit while building an outline.
pub fn serialize_outlines(
    raw: &[Value],
    format: OutlineFormat,
) -> Result<Vec<Outline>, GeometryError> {
    let mut outlines = Vec::with_capacity(raw.len());
    for outline in raw {
        let Some(geometry) = build_geometry(outline)? else {
            continue;
        };
        outlines.push(match format {
            OutlineFormat::Wkt => Outline::Wkt(to_wkt(&geometry)?),
            OutlineFormat::Raw => Outline::Raw(outline.clone()),
        });
    }
    Ok(outlines)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn triangle() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[-86.5, 39.25], [-86.0, 39.25], [-86.0, 39.75], [-86.5, 39.25]]]
        })
    }

    #[test]
    fn polygon_wkt_is_x_then_y() {
        let geometry = build_geometry(&triangle()).unwrap().unwrap();
        assert_eq!(
            to_wkt(&geometry).unwrap(),
            "POLYGON ((-86.5 39.25, -86 39.25, -86 39.75, -86.5 39.25))"
        );
    }

    #[test]
    fn open_ring_is_closed() {
        let raw = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]
        });
        let geometry = build_geometry(&raw).unwrap().unwrap();
        assert_eq!(to_wkt(&geometry).unwrap(), "POLYGON ((0 0, 1 0, 1 1, 0 0))");
    }

    #[test]
    fn multipolygon_wkt_nests_each_polygon() {
        let raw = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
            ]
        });
        let geometry = build_geometry(&raw).unwrap().unwrap();
        assert_eq!(
            to_wkt(&geometry).unwrap(),
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((2 2, 3 2, 3 3, 2 2)))"
        );
    }

    #[test]
    fn serialize_as_raw_keeps_provider_structure() {
        let outlines = serialize_outlines(&[triangle()], OutlineFormat::Raw).unwrap();
        assert_eq!(outlines, vec![Outline::Raw(triangle())]);
    }

    #[test]
    fn serialize_drops_unsupported_and_rejects_malformed() {
        let point = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        let outlines = serialize_outlines(&[point, triangle()], OutlineFormat::Wkt).unwrap();
        assert_eq!(outlines.len(), 1);

        let broken = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0]]]});
        assert!(serialize_outlines(&[triangle(), broken], OutlineFormat::Wkt).is_err());
    }
}
