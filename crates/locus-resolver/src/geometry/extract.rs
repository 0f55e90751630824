use locus_places::GeocodeResponse;
use serde_json::Value;

const BUILDING: &str = "BUILDING";

/// Collects every `displayPolygon` attached to a `structureType: "BUILDING"`
/// object anywhere under `node`, depth first.
///
/// Matching objects are still descended into, so a building nested inside
/// another building's subtree is also found.
#[must_use]
pub fn extract_building_outlines(node: &Value) -> Vec<Value> {
    let mut found = Vec::new();
    walk(node, &mut found);
    found
}

fn walk(node: &Value, found: &mut Vec<Value>) {
    match node {
        Value::Object(map) => {
            if map.get("structureType").and_then(Value::as_str) == Some(BUILDING) {
                if let Some(polygon) = map.get("displayPolygon") {
                    found.push(polygon.clone());
                }
            }
            for value in map.values() {
                walk(value, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, found);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Building outlines across all destinations: each destination's primary
/// place first, then its containing places.
#[must_use]
pub fn outlines_in_response(response: &GeocodeResponse) -> Vec<Value> {
    let mut found = Vec::new();
    for destination in &response.destinations {
        if let Some(primary) = &destination.primary {
            if primary.structure_type.as_deref() == Some(BUILDING) {
                if let Some(polygon) = &primary.display_polygon {
                    found.push(polygon.clone());
                }
            }
        }
        for place in &destination.containing_places {
            walk(place, &mut found);
        }
    }
    found
}
