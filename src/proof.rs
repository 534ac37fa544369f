// Proof Generator + Proof Verifier
//
// DISTRICT PROOF (two bundles):
//   districtProof: leaf --(country level tree)--> countryRoot
//   countryProof:  countryRoot --(continent tree)--> continentRoot --(global tree)--> globalRoot
//                  (siblings/indices appended in that traversal order)
//
// REGIONAL PROOF (privacy-preserving):
//   continentalRoot --(global tree)--> globalRoot
//   No country code or name is carried, by construction.
//
// VERIFICATION is stateless: no tree access, only the injected pair hash.
// - mismatch anywhere          -> Ok(false)
// - sibling/index length drift -> Err(MalformedProof)

use halo2_proofs::halo2curves::bn256::Fr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atlas::CensusTree;
use crate::district::BoundaryType;
use crate::error::{AtlasError, Result};
use crate::field::{hex_serde, hex_serde_vec};
use crate::merkle::{replay_path, validate_path_lengths, MerklePath};
use crate::poseidon_hash::PairHash;

// ============================================================================
// PROOF ARTIFACTS
// ============================================================================

/// Leaf -> country root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictPath {
    #[serde(with = "hex_serde")]
    pub leaf: Fr,
    #[serde(with = "hex_serde_vec")]
    pub siblings: Vec<Fr>,
    pub path_indices: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub country_root: Fr,
}

/// Country root -> continent root -> global root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPath {
    #[serde(with = "hex_serde_vec")]
    pub siblings: Vec<Fr>,
    pub path_indices: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub country_root: Fr,
    #[serde(with = "hex_serde")]
    pub global_root: Fr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub district_id: String,
    pub country_code: String,
    pub country_name: String,
    pub region_id: String,
    pub boundary_type: BoundaryType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictProof {
    pub district_proof: DistrictPath,
    pub country_proof: CountryPath,
    pub metadata: ProofMetadata,
}

/// Continent root -> global root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentalPath {
    #[serde(with = "hex_serde_vec")]
    pub siblings: Vec<Fr>,
    pub path_indices: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub global_root: Fr,
}

/// Continent-level metadata only (no country identifiers)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalMetadata {
    pub region: String,
    pub country_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalProof {
    #[serde(with = "hex_serde")]
    pub continental_root: Fr,
    pub continental_proof: ContinentalPath,
    pub metadata: RegionalMetadata,
}

impl DistrictProof {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl RegionalProof {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Full two-bundle membership proof for one district
pub fn generate_proof(tree: &CensusTree, district_id: &str) -> Result<DistrictProof> {
    let loc = tree
        .locate(district_id)
        .ok_or_else(|| AtlasError::DistrictNotFound(district_id.to_string()))?;

    let continent = &tree.continents()[loc.continent];
    let country = &continent.countries[loc.country];
    let region = &country.regions[loc.region];
    let entry = &region.leaves[loc.region_leaf];

    let leaf_path = country.tree.proof_of(loc.country_leaf)?;

    // country -> continent, then continent -> global
    let mut upper_path = continent.tree.proof_of(loc.country)?;
    upper_path.extend(tree.global_tree().proof_of(loc.continent)?);

    debug!(
        district = district_id,
        country = %country.code,
        district_depth = leaf_path.depth(),
        country_depth = upper_path.depth(),
        "generated district proof"
    );

    Ok(DistrictProof {
        district_proof: DistrictPath {
            leaf: entry.leaf_hash,
            siblings: leaf_path.siblings,
            path_indices: leaf_path.path_indices,
            country_root: country.root,
        },
        country_proof: CountryPath {
            siblings: upper_path.siblings,
            path_indices: upper_path.path_indices,
            country_root: country.root,
            global_root: tree.global_root(),
        },
        metadata: ProofMetadata {
            district_id: entry.district_id.clone(),
            country_code: country.code.clone(),
            country_name: country.name.clone(),
            region_id: region.code.clone(),
            boundary_type: entry.boundary_type,
        },
    })
}

/// Continent-level proof that reveals no contributing country
pub fn generate_regional_proof(tree: &CensusTree, continent_name: &str) -> Result<RegionalProof> {
    let index = tree
        .continent_index(continent_name)
        .ok_or_else(|| AtlasError::RegionNotFound(continent_name.to_string()))?;

    let continent = &tree.continents()[index];
    let MerklePath {
        siblings,
        path_indices,
    } = tree.global_tree().proof_of(index)?;

    debug!(
        continent = continent_name,
        depth = siblings.len(),
        "generated regional proof"
    );

    Ok(RegionalProof {
        continental_root: continent.root,
        continental_proof: ContinentalPath {
            siblings,
            path_indices,
            global_root: tree.global_root(),
        },
        metadata: RegionalMetadata {
            region: continent.name.clone(),
            country_count: continent.country_count,
        },
    })
}

// ============================================================================
// VERIFICATION
// ============================================================================

/// Replay both bundles; `Ok(false)` on any cryptographic mismatch
pub fn verify_proof<H: PairHash + ?Sized>(proof: &DistrictProof, hasher: &H) -> Result<bool> {
    let district = &proof.district_proof;
    let country = &proof.country_proof;

    // Structural checks first, so a malformed proof is always an error
    validate_path_lengths(district.siblings.len(), district.path_indices.len())?;
    validate_path_lengths(country.siblings.len(), country.path_indices.len())?;

    // Stage 1: leaf -> country root
    let computed_country =
        replay_path(district.leaf, &district.siblings, &district.path_indices, hasher)?;
    if computed_country != Some(district.country_root) {
        return Ok(false);
    }

    // Both bundles must be anchored at the same country root
    if country.country_root != district.country_root {
        return Ok(false);
    }

    // Stage 2: country root -> global root
    let computed_global =
        replay_path(country.country_root, &country.siblings, &country.path_indices, hasher)?;
    Ok(computed_global == Some(country.global_root))
}

/// Replay the continent -> global path
pub fn verify_regional_proof<H: PairHash + ?Sized>(proof: &RegionalProof, hasher: &H) -> Result<bool> {
    let path = &proof.continental_proof;
    let computed = replay_path(proof.continental_root, &path.siblings, &path.path_indices, hasher)?;
    Ok(computed == Some(path.global_root))
}

/// `verify_proof` plus a check that the proof targets a trusted published root
pub fn verify_proof_against_root<H: PairHash + ?Sized>(
    proof: &DistrictProof,
    trusted_global_root: Fr,
    hasher: &H,
) -> Result<bool> {
    if proof.country_proof.global_root != trusted_global_root {
        return Ok(false);
    }
    verify_proof(proof, hasher)
}

/// `verify_regional_proof` plus a check against a trusted published root
pub fn verify_regional_proof_against_root<H: PairHash + ?Sized>(
    proof: &RegionalProof,
    trusted_global_root: Fr,
    hasher: &H,
) -> Result<bool> {
    if proof.continental_proof.global_root != trusted_global_root {
        return Ok(false);
    }
    verify_regional_proof(proof, hasher)
}
