//! Error taxonomy for census construction, proof lookup and proof replay
//!
//! Verification mismatches are NOT errors: `verify_*` returns `Ok(false)`.
//! Only structurally broken proofs (sibling/index length mismatch) surface here.

use thiserror::Error as ThisError;

pub type Result<T> = core::result::Result<T, AtlasError>;

#[derive(Debug, ThisError)]
pub enum AtlasError {
    // ------------------------------------------------------------------
    // Input validation (fatal, no partial tree)
    // ------------------------------------------------------------------
    #[error("invalid geometry for district {district}: {reason}")]
    InvalidGeometry { district: String, reason: String },

    #[error("coordinate out of range: lon={lon}, lat={lat}")]
    CoordinateOutOfRange { lon: f64, lat: f64 },

    #[error("district identifier must not be empty")]
    EmptyIdentifier,

    #[error("duplicate district id: {0}")]
    DuplicateDistrict(String),

    #[error("cannot build a census from an empty batch")]
    EmptyBatch,

    #[error("country code {0} is not present in the registry")]
    UnknownCountry(String),

    #[error("cannot build a Merkle level from zero values")]
    EmptyLevel,

    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------
    #[error("district not found: {0}")]
    DistrictNotFound(String),

    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("leaf index {index} out of range for level of {len} values")]
    IndexOutOfRange { index: usize, len: usize },

    // ------------------------------------------------------------------
    // Structural proof errors
    // ------------------------------------------------------------------
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    // ------------------------------------------------------------------
    // Primitive contract / configuration
    // ------------------------------------------------------------------
    #[error("pair hash violates its contract: {0}")]
    HashContractViolation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
