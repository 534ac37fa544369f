// Shadow Atlas - Hierarchical Merkle commitment to the global district census
// district -> country -> continent -> global root, over the BN254 scalar field
// Poseidon via Axiom halo2_base (same gadget the membership circuits constrain)

pub mod error;
pub mod field; // Field codec: bytes / coordinates -> Fr
pub mod poseidon_hash; // Pair hash contract + Poseidon adapter
pub mod district; // Input records (GeoJSON Polygon / MultiPolygon)
pub mod leaf; // Canonical leaf encoding
pub mod merkle; // Level tree builder (reused at every hierarchy layer)
pub mod registry; // Country -> continent lookup
pub mod config;
pub mod atlas; // Hierarchy assembler
pub mod proof; // Proof generation + stateless verification

pub use atlas::{
    build, CensusBuilder, CensusSummary, CensusTree, ContinentNode, CountryNode, LeafEntry,
    RegionNode,
};
pub use config::AtlasConfig;
pub use district::{BoundaryType, DistrictInput, Geometry};
pub use error::{AtlasError, Result};
pub use field::{encode_bytes, encode_coordinate, field_to_hex, hex_to_field, parse_field};
pub use leaf::encode_leaf;
pub use merkle::{LevelTree, MerklePath};
pub use poseidon_hash::{check_conformance, PairHash, PoseidonPairHash};
pub use proof::{
    generate_proof, generate_regional_proof, verify_proof, verify_proof_against_root,
    verify_regional_proof, verify_regional_proof_against_root, DistrictProof, RegionalProof,
};
pub use registry::{CountryEntry, CountryRegistry};

// Re-export field type for callers assembling inputs by hand
pub use halo2_proofs::halo2curves::bn256::Fr;
