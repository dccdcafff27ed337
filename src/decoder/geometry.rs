//! Map geometries, in either of the two collection shapes the backend has
//! emitted.
//!
//! * Per-feature: a GeoJSON-like `FeatureCollection`, one path per feature,
//!   deduplicated on `(label, rounded length)` except for ferry and sail
//!   legs.
//! * Per-corridor: `{ "geometries": [...] }` (or a bare array), where one
//!   corridor may carry several coordinate arrays; each array is kept and
//!   labelled with a composed key.
//!
//! The shape is probed from the keys present rather than assumed.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::error::DecodeError;
use crate::results::{Geometry, LabelParams};

/// Labels exempt from deduplication.
const KEEP_DUPLICATES: &[&str] = &["Ferry", "Sail"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    label: String,
    length: f64,
    colors: String,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinates {
    Line(Vec<[f64; 2]>),
    MultiLine(Vec<Vec<[f64; 2]>>),
}

impl Coordinates {
    /// One polyline per line; the lines of a multi-line are not joined.
    fn into_paths(self) -> Vec<Vec<[f64; 2]>> {
        match self {
            Coordinates::Line(points) => vec![points],
            Coordinates::MultiLine(lines) => lines,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorridorCollection {
    geometries: Vec<Corridor>,
}

#[derive(Debug, Deserialize)]
struct Corridor {
    transport_means: String,
    #[serde(default)]
    country_label: Option<String>,
    coordinates: Vec<Vec<[f64; 2]>>,
    length: f64,
    color: String,
}

/// Which collection shape a payload uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryShape {
    PerFeature,
    PerCorridor,
}

/// Detects the collection shape from its top-level structure.
pub fn probe_shape(value: &Value) -> Option<GeometryShape> {
    match value {
        Value::Object(map) if map.contains_key("features") => Some(GeometryShape::PerFeature),
        Value::Object(map) if map.contains_key("geometries") => Some(GeometryShape::PerCorridor),
        Value::Array(_) => Some(GeometryShape::PerCorridor),
        _ => None,
    }
}

fn invalid(source: serde_json::Error) -> DecodeError {
    DecodeError::InvalidJson {
        field: "gdf",
        source,
    }
}

fn round_km(length: f64) -> f64 {
    length.round()
}

/// Decodes a geometry collection. A JSON string holding the collection is
/// accepted as well as the collection itself.
pub fn decode_geometries(value: Value) -> Result<Vec<Geometry>, DecodeError> {
    let value = match value {
        Value::String(raw) => serde_json::from_str(&raw).map_err(invalid)?,
        other => other,
    };

    match probe_shape(&value) {
        Some(GeometryShape::PerFeature) => {
            let collection: FeatureCollection = serde_json::from_value(value).map_err(invalid)?;
            Ok(decode_features(collection.features))
        }
        Some(GeometryShape::PerCorridor) => {
            let corridors: Vec<Corridor> = match value {
                Value::Array(_) => serde_json::from_value(value).map_err(invalid)?,
                _ => {
                    serde_json::from_value::<CorridorCollection>(value)
                        .map_err(invalid)?
                        .geometries
                }
            };
            Ok(decode_corridors(corridors))
        }
        None => Err(DecodeError::UnknownGeometryShape),
    }
}

fn decode_features(features: Vec<Feature>) -> Vec<Geometry> {
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    let mut geometries = Vec::with_capacity(features.len());

    for feature in features {
        let props = feature.properties;
        let length = round_km(props.length);

        if !KEEP_DUPLICATES.contains(&props.label.as_str())
            && !seen.insert((props.label.clone(), length as i64))
        {
            debug!(label = %props.label, length, "Dropping duplicate geometry");
            continue;
        }

        for path in feature.geometry.coordinates.into_paths() {
            geometries.push(Geometry {
                transport_means: props.label.clone(),
                label: props.label.clone(),
                label_params: None,
                color: props.colors.clone(),
                coordinates: path,
                length,
            });
        }
    }

    geometries
}

/// Label key for one corridor path.
pub fn corridor_label(transport_means: &str, country_label: Option<&str>) -> String {
    match country_label {
        Some(country) if transport_means == "Road" && !country.is_empty() => {
            "road_with_country".to_string()
        }
        _ => format!("{}_with_details", transport_means.to_lowercase()),
    }
}

fn decode_corridors(corridors: Vec<Corridor>) -> Vec<Geometry> {
    let mut geometries = Vec::new();

    for corridor in corridors {
        let length = round_km(corridor.length);
        let label = corridor_label(&corridor.transport_means, corridor.country_label.as_deref());

        for path in corridor.coordinates {
            geometries.push(Geometry {
                label: label.clone(),
                label_params: Some(LabelParams {
                    length,
                    country: corridor.country_label.clone(),
                }),
                transport_means: corridor.transport_means.clone(),
                color: corridor.color.clone(),
                coordinates: path,
                length,
            });
        }
    }

    geometries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(label: &str, length: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": { "label": label, "length": length, "colors": "#ff0000" },
            "geometry": { "type": "LineString", "coordinates": [[2.35, 48.85], [4.83, 45.76]] }
        })
    }

    #[test]
    fn test_probe_shape() {
        assert_eq!(
            probe_shape(&json!({"features": []})),
            Some(GeometryShape::PerFeature)
        );
        assert_eq!(
            probe_shape(&json!({"geometries": []})),
            Some(GeometryShape::PerCorridor)
        );
        assert_eq!(probe_shape(&json!([])), Some(GeometryShape::PerCorridor));
        assert_eq!(probe_shape(&json!({"foo": 1})), None);
        assert_eq!(probe_shape(&json!(3)), None);
    }

    #[test]
    fn test_road_duplicates_are_dropped() {
        let collection = json!({ "features": [feature("Road", 120.2), feature("Road", 119.8)] });
        let geometries = decode_geometries(collection).unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].length, 120.0);
    }

    #[test]
    fn test_ferry_and_sail_duplicates_are_kept() {
        for label in ["Ferry", "Sail"] {
            let collection = json!({ "features": [feature(label, 120.0), feature(label, 120.0)] });
            assert_eq!(decode_geometries(collection).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_different_lengths_are_kept() {
        let collection = json!({ "features": [feature("Road", 120.0), feature("Road", 121.0)] });
        assert_eq!(decode_geometries(collection).unwrap().len(), 2);
    }

    #[test]
    fn test_feature_collection_as_json_string() {
        let raw = json!({ "features": [feature("Train", 450.4)] }).to_string();
        let geometries = decode_geometries(Value::String(raw)).unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].label, "Train");
        assert_eq!(geometries[0].color, "#ff0000");
        assert_eq!(geometries[0].coordinates, vec![[2.35, 48.85], [4.83, 45.76]]);
        assert_eq!(geometries[0].length, 450.0);
    }

    #[test]
    fn test_multi_line_feature_keeps_lines_apart() {
        let collection = json!({ "features": [{
            "properties": { "label": "Road", "length": 900.0, "colors": "#000" },
            "geometry": { "coordinates": [[[0.0, 0.0], [1.0, 0.0]], [[50.0, 50.0], [51.0, 50.0]]] }
        }]});
        let geometries = decode_geometries(collection).unwrap();

        assert_eq!(geometries.len(), 2);
        assert_eq!(geometries[0].coordinates, vec![[0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(geometries[1].coordinates, vec![[50.0, 50.0], [51.0, 50.0]]);
        assert!(geometries.iter().all(|g| g.label == "Road" && g.length == 900.0));
    }

    #[test]
    fn test_corridor_fans_out_without_dedup() {
        let collection = json!({ "geometries": [
            {
                "transport_means": "Road",
                "country_label": "France",
                "coordinates": [[[2.0, 48.0], [3.0, 47.0]], [[3.0, 47.0], [4.0, 46.0]]],
                "length": 312.6,
                "color": "#00ff00"
            },
            {
                "transport_means": "Road",
                "country_label": "France",
                "coordinates": [[[2.0, 48.0], [3.0, 47.0]]],
                "length": 312.6,
                "color": "#00ff00"
            },
            {
                "transport_means": "Train",
                "coordinates": [[[4.0, 46.0], [5.0, 45.0]]],
                "length": 80.0,
                "color": "#0000ff"
            }
        ]});
        let geometries = decode_geometries(collection).unwrap();

        assert_eq!(geometries.len(), 4);
        assert_eq!(geometries[0].label, "road_with_country");
        assert_eq!(
            geometries[0].label_params,
            Some(LabelParams {
                length: 313.0,
                country: Some("France".to_string())
            })
        );
        assert_eq!(geometries[3].label, "train_with_details");
        assert_eq!(geometries[3].transport_means, "Train");
    }

    #[test]
    fn test_corridor_bare_array() {
        let collection = json!([{
            "transport_means": "Ferry",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0]]],
            "length": 40.0,
            "color": "#abcdef"
        }]);
        let geometries = decode_geometries(collection).unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].label, "ferry_with_details");
    }

    #[test]
    fn test_corridor_label() {
        assert_eq!(corridor_label("Road", Some("Spain")), "road_with_country");
        assert_eq!(corridor_label("Road", None), "road_with_details");
        assert_eq!(corridor_label("Road", Some("")), "road_with_details");
        assert_eq!(corridor_label("Plane", Some("Spain")), "plane_with_details");
    }

    #[test]
    fn test_unknown_shape_and_bad_json() {
        assert!(matches!(
            decode_geometries(json!({"type": "nothing"})),
            Err(DecodeError::UnknownGeometryShape)
        ));
        assert!(matches!(
            decode_geometries(Value::String("{not json".to_string())),
            Err(DecodeError::InvalidJson { field: "gdf", .. })
        ));
        assert!(matches!(
            decode_geometries(json!({"features": [{"properties": {}}]})),
            Err(DecodeError::InvalidJson { .. })
        ));
    }
}
