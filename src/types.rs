use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// County boundary decoded from the topology, keyed by FIPS code.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyFeature {
    pub id: u32,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EducationRecord {
    pub fips: u32,
    pub state: String,
    pub area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// Renders an attainment value the way the `data-education` attributes expect:
/// absent data is spelled out as `undefined`.
pub fn education_attr(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "undefined".to_string(),
    }
}
