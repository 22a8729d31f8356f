//! County boundaries from a topology document.
//!
//! Arc stitching, quantisation and ring padding are left to the `topojson`
//! crate; this module checks arc references up front, converts the result
//! through `geojson` into `geo` shapes and keys each one by FIPS code.

use crate::types::CountyFeature;
use geojson::feature::Id;
use geo::MultiPolygon;
use thiserror::Error;
use topojson::{to_geojson, Geometry, TopoJson, Topology, Value};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology document: {0}")]
    Parse(String),
    #[error("expected a Topology document")]
    NotATopology,
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("topology could not be converted: {0}")]
    Conversion(String),
}

/// Why a single county was left out.
#[derive(Debug, Error, PartialEq)]
enum FeatureError {
    #[error("references arc {0}, which does not exist")]
    ArcOutOfRange(i64),
    #[error("has a ring with no positions")]
    EmptyRing,
    #[error("has no numeric id")]
    MissingId,
    #[error("is not a polygon")]
    Unsupported,
    #[error("has no geometry")]
    NoGeometry,
    #[error("could not be converted: {0}")]
    Conversion(String),
}

#[derive(Debug)]
pub struct CountyTopology {
    topology: Topology,
}

impl CountyTopology {
    pub fn parse(text: &str) -> Result<Self, TopologyError> {
        match text.parse::<TopoJson>() {
            Ok(TopoJson::Topology(topology)) => Ok(Self { topology }),
            Ok(_) => Err(TopologyError::NotATopology),
            Err(e) => Err(TopologyError::Parse(format!("{:?}", e))),
        }
    }

    /// Features of the named object. Counties that cannot be decoded are
    /// logged and left out.
    pub fn features(&self, object: &str) -> Result<Vec<CountyFeature>, TopologyError> {
        let mut topology = self.topology.clone();
        let arc_count = topology.arcs.len();
        let named = topology
            .objects
            .iter_mut()
            .find(|o| o.name == object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;

        // Bad arc references would abort the whole conversion, so drop those
        // counties before handing the topology over.
        match &mut named.geometry.value {
            Value::GeometryCollection(children) => {
                children.retain(|child| match check_arcs(&child.value, arc_count) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(id = ?child.id, "skipping county geometry: {e}");
                        false
                    }
                });
            }
            value => {
                if let Err(e) = check_arcs(value, arc_count) {
                    warn!(id = ?named.geometry.id, "skipping county geometry: {e}");
                    return Ok(Vec::new());
                }
            }
        }

        let collection = to_geojson(&topology, &object.to_string())
            .map_err(|e| TopologyError::Conversion(format!("{:?}", e)))?;

        let mut features = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let id = feature.id.clone();
            match county_feature(feature) {
                Ok(county) => features.push(county),
                Err(e) => warn!(?id, "skipping county geometry: {e}"),
            }
        }
        debug!(object, count = features.len(), "decoded topology features");
        Ok(features)
    }
}

fn check_refs(refs: &[i32], arc_count: usize) -> Result<(), FeatureError> {
    if refs.is_empty() {
        return Err(FeatureError::EmptyRing);
    }
    for &r in refs {
        let index = if r < 0 { !r } else { r };
        if index as usize >= arc_count {
            return Err(FeatureError::ArcOutOfRange(i64::from(r)));
        }
    }
    Ok(())
}

fn check_arcs(value: &Value, arc_count: usize) -> Result<(), FeatureError> {
    match value {
        Value::Polygon(rings) => {
            if rings.is_empty() {
                return Err(FeatureError::EmptyRing);
            }
            rings.iter().try_for_each(|ring| check_refs(ring, arc_count))
        }
        Value::MultiPolygon(parts) => parts.iter().try_for_each(|rings| {
            if rings.is_empty() {
                return Err(FeatureError::EmptyRing);
            }
            rings.iter().try_for_each(|ring| check_refs(ring, arc_count))
        }),
        Value::LineString(refs) => check_refs(refs, arc_count),
        Value::MultiLineString(lines) => {
            lines.iter().try_for_each(|refs| check_refs(refs, arc_count))
        }
        Value::GeometryCollection(children) => children
            .iter()
            .try_for_each(|child: &Geometry| check_arcs(&child.value, arc_count)),
        Value::Point(_) | Value::MultiPoint(_) => Ok(()),
    }
}

fn feature_id(id: Option<&Id>) -> Option<u32> {
    match id? {
        Id::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Id::String(s) => s.trim().parse().ok(),
    }
}

fn county_feature(feature: geojson::Feature) -> Result<CountyFeature, FeatureError> {
    let id = feature_id(feature.id.as_ref()).ok_or(FeatureError::MissingId)?;
    let geometry = feature.geometry.ok_or(FeatureError::NoGeometry)?;
    let geometry: geo::Geometry<f64> = geometry
        .value
        .try_into()
        .map_err(|e| FeatureError::Conversion(format!("{:?}", e)))?;

    let geometry = match geometry {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
        _ => return Err(FeatureError::Unsupported),
    };
    Ok(CountyFeature { id, geometry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> CountyTopology {
        CountyTopology::parse(&value.to_string()).unwrap()
    }

    fn sample() -> CountyTopology {
        // Two squares sharing the edge x = 12, quantised with scale 2.
        parse(json!({
            "type": "Topology",
            "transform": { "scale": [2.0, 2.0], "translate": [10.0, 20.0] },
            "objects": {
                "counties": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "id": 1001, "arcs": [[0, 1]] },
                        { "type": "Polygon", "id": "01003", "arcs": [[-1, 2]] },
                        { "type": "Polygon", "arcs": [[0, 1]] },
                        { "type": "Polygon", "id": 1005, "arcs": [[7]] },
                        { "type": "Point", "id": 1007, "coordinates": [0, 0] },
                        { "type": "MultiPolygon", "id": 1009, "arcs": [[[0, 1]], [[-1, 2]]] }
                    ]
                }
            },
            "arcs": [
                [[1, 0], [0, 1]],
                [[1, 1], [-1, 0], [0, -1], [1, 0]],
                [[1, 0], [1, 0], [0, 1], [-1, 0]]
            ]
        }))
    }

    #[test]
    fn decodes_quantised_polygons_and_skips_bad_ones() {
        let features = sample().features("counties").unwrap();
        let ids: Vec<u32> = features.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1001, 1003, 1009]);

        let first = &features[0].geometry.0[0];
        let expected: Vec<Coord<f64>> = [(12.0, 20.0), (12.0, 22.0), (10.0, 22.0), (10.0, 20.0), (12.0, 20.0)]
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect();
        assert_eq!(first.exterior().0, expected);
        assert!(first.exterior().is_closed());
    }

    #[test]
    fn reversed_arc_is_walked_backwards() {
        let features = sample().features("counties").unwrap();
        let second = features[1].geometry.0[0].exterior();
        assert_eq!(second.0[0], Coord { x: 12.0, y: 22.0 });
        assert_eq!(second.0[1], Coord { x: 12.0, y: 20.0 });
        assert!(second.is_closed());
        assert_eq!(features[2].geometry.0.len(), 2);
    }

    #[test]
    fn untransformed_arcs_are_absolute() {
        let topology = parse(json!({
            "type": "Topology",
            "objects": { "c": { "type": "Polygon", "id": 5, "arcs": [[0]] } },
            "arcs": [[[0, 0], [3, 0], [3, 3], [0, 0]]]
        }));
        let features = topology.features("c").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geometry.0[0].exterior().0[2], Coord { x: 3.0, y: 3.0 });
    }

    #[test]
    fn degenerate_island_keeps_the_county() {
        let topology = parse(json!({
            "type": "Topology",
            "objects": {
                "counties": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "MultiPolygon", "id": 1001, "arcs": [[[0]], [[1]]] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [10, 0], [10, 10], [0, 0]],
                [[50, 50], [51, 50]]
            ]
        }));
        let features = topology.features("counties").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, 1001);
        assert_eq!(features[0].geometry.0[0].exterior().0.len(), 4);
    }

    #[test]
    fn empty_ring_drops_only_that_county() {
        let topology = parse(json!({
            "type": "Topology",
            "objects": {
                "counties": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "id": 1001, "arcs": [[0]] },
                        { "type": "Polygon", "id": 1003, "arcs": [[]] }
                    ]
                }
            },
            "arcs": [[[0, 0], [10, 0], [10, 10], [0, 0]]]
        }));
        let ids: Vec<u32> = topology
            .features("counties")
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![1001]);
    }

    #[test]
    fn arc_checks() {
        assert_eq!(check_refs(&[0, -2], 2), Ok(()));
        assert_eq!(check_refs(&[-3], 2), Err(FeatureError::ArcOutOfRange(-3)));
        assert_eq!(check_refs(&[], 2), Err(FeatureError::EmptyRing));
    }

    #[test]
    fn missing_object_and_wrong_type_fail() {
        assert!(matches!(
            sample().features("states"),
            Err(TopologyError::MissingObject(name)) if name == "states"
        ));
        let err = CountyTopology::parse(
            &json!({ "type": "FeatureCollection", "features": [] }).to_string(),
        );
        assert!(err.is_err());
        assert!(CountyTopology::parse("{ not json").is_err());
    }
}
