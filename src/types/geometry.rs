//! GeoJSON polygon used to restrict data-quality reports to an area.

use serde::{Deserialize, Serialize};

/// GeoJSON geometry type tag. Only polygons are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonKind {
    Polygon,
}

/// A GeoJSON polygon: an outer ring followed by optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub kind: PolygonKind,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    /// Check ring structure: at least one ring, each closed with four or more positions.
    pub fn validate(&self) -> Result<(), String> {
        if self.coordinates.is_empty() {
            return Err("polygon has no rings".to_string());
        }
        for (index, ring) in self.coordinates.iter().enumerate() {
            if ring.len() < 4 {
                return Err(format!("ring {} has {} positions, need at least 4", index, ring.len()));
            }
            if ring.first() != ring.last() {
                return Err(format!("ring {} is not closed", index));
            }
            if ring.iter().flatten().any(|c| !c.is_finite()) {
                return Err(format!("ring {} has a non-finite coordinate", index));
            }
        }
        Ok(())
    }

    /// Serialize to GeoJSON text for `ST_GeomFromGeoJSON`.
    pub fn to_geojson(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
