use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use super::GeometryError;

/// Builds a polygon or multipolygon from a GeoJSON-shaped
/// `{"type", "coordinates"}` outline.
///
/// Positions are `[longitude, latitude]` and map to `x`, `y` unchanged.
/// For each polygon the first ring is the exterior and any further rings
/// are holes. Outline types other than `Polygon` and `MultiPolygon`
/// (compared case-insensitively) yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] when the coordinates are
/// missing or malformed: non-array nesting, non-numeric values, positions
/// with fewer than two numbers, rings with fewer than three positions, or
/// an empty coordinate list.
pub fn build_geometry(raw: &Value) -> Result<Option<Geometry<f64>>, GeometryError> {
    let result = build(raw);
    if let Err(ref err) = result {
        tracing::error!(error = %err, "failed to build outline geometry");
    }
    result
}

fn build(raw: &Value) -> Result<Option<Geometry<f64>>, GeometryError> {
    let Some(outline) = raw.as_object() else {
        return Err(GeometryError::invalid("outline is not an object"));
    };
    let kind = outline
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();

    match kind.as_str() {
        "polygon" => {
            let coordinates = coordinates(outline)?;
            Ok(Some(Geometry::Polygon(polygon(coordinates)?)))
        }
        "multipolygon" => {
            let coordinates = coordinates(outline)?;
            let polygons = non_empty_array(coordinates, "multipolygon")?
                .iter()
                .map(polygon)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))))
        }
        other => {
            tracing::debug!(kind = other, "ignoring outline of unsupported type");
            Ok(None)
        }
    }
}

fn coordinates(outline: &serde_json::Map<String, Value>) -> Result<&Value, GeometryError> {
    outline
        .get("coordinates")
        .ok_or_else(|| GeometryError::invalid("outline has no coordinates"))
}

fn polygon(value: &Value) -> Result<Polygon<f64>, GeometryError> {
    let rings = non_empty_array(value, "polygon")?
        .iter()
        .map(ring)
        .collect::<Result<Vec<_>, _>>()?;
    let mut rings = rings.into_iter();
    let Some(exterior) = rings.next() else {
        return Err(GeometryError::invalid("polygon has no rings"));
    };
    Ok(Polygon::new(exterior, rings.collect()))
}

fn ring(value: &Value) -> Result<LineString<f64>, GeometryError> {
    let positions = non_empty_array(value, "ring")?;
    if positions.len() < 3 {
        return Err(GeometryError::invalid(format!(
            "ring has {} position(s), need at least 3",
            positions.len()
        )));
    }
    positions
        .iter()
        .map(position)
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn position(value: &Value) -> Result<Coord<f64>, GeometryError> {
    let Some(values) = value.as_array() else {
        return Err(GeometryError::invalid("position is not an array"));
    };
    if values.len() < 2 {
        return Err(GeometryError::invalid(format!(
            "position has {} value(s), need at least 2",
            values.len()
        )));
    }
    let x = values[0]
        .as_f64()
        .ok_or_else(|| GeometryError::invalid("position longitude is not a number"))?;
    let y = values[1]
        .as_f64()
        .ok_or_else(|| GeometryError::invalid("position latitude is not a number"))?;
    Ok(Coord { x, y })
}

fn non_empty_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, GeometryError> {
    match value.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        Some(_) => Err(GeometryError::invalid(format!("{what} coordinates are empty"))),
        None => Err(GeometryError::invalid(format!(
            "{what} coordinates are not an array"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, Geometry};
    use serde_json::json;

    use super::*;

    #[test]
    fn polygon_keeps_lng_lat_axis_order() {
        let raw = json!({
            "type": "Polygon",
            "coordinates": [[[-86.17, 39.81], [-86.16, 39.81], [-86.16, 39.82], [-86.17, 39.81]]]
        });
        let Some(Geometry::Polygon(poly)) = build_geometry(&raw).unwrap() else {
            panic!("expected polygon");
        };
        assert_eq!(poly.exterior().0[0], coord! { x: -86.17, y: 39.81 });
        assert!(poly.interiors().is_empty());
    }

    #[test]
    fn polygon_trailing_rings_are_holes() {
        let raw = json!({
            "type": "polygon",
            "coordinates": [
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 2.0]]
            ]
        });
        let Some(Geometry::Polygon(poly)) = build_geometry(&raw).unwrap() else {
            panic!("expected polygon");
        };
        assert_eq!(poly.interiors().len(), 1);
    }

    #[test]
    fn multipolygon_aggregates_each_part() {
        let raw = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [
                    [[5.0, 5.0], [9.0, 5.0], [9.0, 9.0], [5.0, 5.0]],
                    [[6.0, 6.0], [7.0, 6.0], [7.0, 7.0], [6.0, 6.0]]
                ]
            ]
        });
        let Some(Geometry::MultiPolygon(multi)) = build_geometry(&raw).unwrap() else {
            panic!("expected multipolygon");
        };
        assert_eq!(multi.0.len(), 2);
        assert_eq!(multi.0[1].interiors().len(), 1);
    }

    #[test]
    fn unsupported_type_is_none() {
        let raw = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert_eq!(build_geometry(&raw).unwrap(), None);
    }

    #[test]
    fn extra_position_values_are_ignored() {
        let raw = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0, 12.5], [1.0, 0.0, 12.5], [1.0, 1.0, 12.5]]]
        });
        assert!(build_geometry(&raw).unwrap().is_some());
    }

    #[test]
    fn malformed_outlines_are_errors() {
        let cases = [
            json!("not an object"),
            json!({"type": "Polygon"}),
            json!({"type": "Polygon", "coordinates": []}),
            json!({"type": "Polygon", "coordinates": "nope"}),
            json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]}),
            json!({"type": "Polygon", "coordinates": [[[0.0], [1.0, 0.0], [1.0, 1.0]]]}),
            json!({"type": "Polygon", "coordinates": [[["a", 0.0], [1.0, 0.0], [1.0, 1.0]]]}),
            json!({"type": "MultiPolygon", "coordinates": []}),
            json!({"type": "MultiPolygon", "coordinates": [[]]}),
        ];
        for raw in cases {
            assert!(
                matches!(
                    build_geometry(&raw),
                    Err(GeometryError::InvalidGeometry { .. })
                ),
                "expected error for {raw}"
            );
        }
    }
}
