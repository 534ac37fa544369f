//! District records as handed over by the ingestion layer

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// `[longitude, latitude]`
pub type Position = [f64; 2];

/// Closed linear ring (first == last by GeoJSON convention, not enforced)
pub type Ring = Vec<Position>;

/// GeoJSON linear rings need at least four positions
pub const MIN_RING_POSITIONS: usize = 4;

/// Governance semantics of a boundary
///
/// The numeric code is committed into the leaf. Codes are stable: append new
/// variants, never renumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryType {
    CongressionalDistrict,
    StateLegislativeUpper,
    StateLegislativeLower,
    County,
    CityCouncilDistrict,
    ParliamentaryConstituency,
    Ward,
    Municipality,
    ElectoralDistrict,
    SchoolBoardDistrict,
}

impl BoundaryType {
    pub fn code(self) -> u64 {
        match self {
            BoundaryType::CongressionalDistrict => 1,
            BoundaryType::StateLegislativeUpper => 2,
            BoundaryType::StateLegislativeLower => 3,
            BoundaryType::County => 4,
            BoundaryType::CityCouncilDistrict => 5,
            BoundaryType::ParliamentaryConstituency => 6,
            BoundaryType::Ward => 7,
            BoundaryType::Municipality => 8,
            BoundaryType::ElectoralDistrict => 9,
            BoundaryType::SchoolBoardDistrict => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryType::CongressionalDistrict => "congressional-district",
            BoundaryType::StateLegislativeUpper => "state-legislative-upper",
            BoundaryType::StateLegislativeLower => "state-legislative-lower",
            BoundaryType::County => "county",
            BoundaryType::CityCouncilDistrict => "city-council-district",
            BoundaryType::ParliamentaryConstituency => "parliamentary-constituency",
            BoundaryType::Ward => "ward",
            BoundaryType::Municipality => "municipality",
            BoundaryType::ElectoralDistrict => "electoral-district",
            BoundaryType::SchoolBoardDistrict => "school-board-district",
        }
    }
}

/// GeoJSON `Polygon` / `MultiPolygon`
///
/// Any other GeoJSON `type` fails deserialization. Ring and vertex order are
/// committed exactly as given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Stream tag committed ahead of the coordinates
    pub fn tag(&self) -> u64 {
        match self {
            Geometry::Polygon(_) => 1,
            Geometry::MultiPolygon(_) => 2,
        }
    }

    /// Polygons as a uniform slice view (a Polygon is a single-element list)
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polygons) => polygons.iter().map(Vec::as_slice).collect(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons()
            .iter()
            .flat_map(|rings| rings.iter())
            .map(Vec::len)
            .sum()
    }
}

/// One district as produced by ingestion
///
/// `name` is display-only and never hashed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictInput {
    pub id: String,
    pub name: String,
    pub country: String,
    pub region: String,
    pub boundary_type: BoundaryType,
    pub authority: u32,
    pub geometry: Geometry,
}

impl DistrictInput {
    /// Parse one record from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of records
    pub fn batch_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Structural checks that must pass before a leaf is built
    ///
    /// Coordinate ranges are checked by the field codec during encoding.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(AtlasError::EmptyIdentifier);
        }

        let invalid = |reason: String| AtlasError::InvalidGeometry {
            district: self.id.clone(),
            reason,
        };

        let polygons = self.geometry.polygons();
        if polygons.is_empty() {
            return Err(invalid("multipolygon has no polygons".to_string()));
        }

        for (p, rings) in polygons.iter().enumerate() {
            if rings.is_empty() {
                return Err(invalid(format!("polygon {} has no rings", p)));
            }
            for (r, ring) in rings.iter().enumerate() {
                if ring.len() < MIN_RING_POSITIONS {
                    return Err(invalid(format!(
                        "polygon {} ring {} has {} positions, need at least {}",
                        p,
                        r,
                        ring.len(),
                        MIN_RING_POSITIONS
                    )));
                }
            }
        }

        Ok(())
    }
}
