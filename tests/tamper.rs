//! Tamper detection for district and regional proofs
//!
//! Every single-field mutation must make verification return `false`
//! (never an error): leaf, siblings, path indices, both roots, swapped
//! siblings, cross-country replay.

mod common;

use common::*;
use shadow_atlas::{
    generate_proof, generate_regional_proof, verify_proof, verify_regional_proof, AtlasError,
    CensusTree, DistrictProof, Fr, PairHash, PoseidonPairHash,
};

fn fixture() -> (CensusTree, PoseidonPairHash) {
    let tree = builder().build(&eleven_districts()).unwrap();
    (tree, PoseidonPairHash::new())
}

/// Nodes visited while replaying a path (value BEFORE each level)
fn replay_trace(start: Fr, siblings: &[Fr], indices: &[u8], hasher: &PoseidonPairHash) -> Vec<Fr> {
    let mut trace = Vec::with_capacity(siblings.len());
    let mut current = start;
    for (sibling, index) in siblings.iter().zip(indices) {
        trace.push(current);
        current = if *index == 0 {
            hasher.hash_pair(current, *sibling)
        } else {
            hasher.hash_pair(*sibling, current)
        };
    }
    trace
}

#[test]
fn test_tampered_leaf_rejected() {
    let (tree, hasher) = fixture();
    let mut proof = generate_proof(&tree, "US-NY-NYC-CD10").unwrap();
    proof.district_proof.leaf = flip_low_bit(proof.district_proof.leaf);
    assert!(!verify_proof(&proof, &hasher).unwrap());
}

#[test]
fn test_every_tampered_sibling_rejected() {
    let (tree, hasher) = fixture();
    let proof = generate_proof(&tree, "US-NY-NYC-CD10").unwrap();

    for i in 0..proof.district_proof.siblings.len() {
        let mut tampered = proof.clone();
        tampered.district_proof.siblings[i] = flip_low_bit(tampered.district_proof.siblings[i]);
        assert!(!verify_proof(&tampered, &hasher).unwrap(), "district sibling {}", i);
    }

    for i in 0..proof.country_proof.siblings.len() {
        let mut tampered = proof.clone();
        tampered.country_proof.siblings[i] = flip_low_bit(tampered.country_proof.siblings[i]);
        assert!(!verify_proof(&tampered, &hasher).unwrap(), "country sibling {}", i);
    }
}

#[test]
fn test_every_flipped_index_rejected() {
    let (tree, hasher) = fixture();

    for id in tree.district_ids().map(str::to_string).collect::<Vec<_>>() {
        let proof = generate_proof(&tree, &id).unwrap();

        // A node paired with its own duplicate hashes identically in either
        // direction; those positions carry no ordering information.
        let district_trace = replay_trace(
            proof.district_proof.leaf,
            &proof.district_proof.siblings,
            &proof.district_proof.path_indices,
            &hasher,
        );
        for i in 0..proof.district_proof.path_indices.len() {
            if district_trace[i] == proof.district_proof.siblings[i] {
                continue;
            }
            let mut tampered = proof.clone();
            tampered.district_proof.path_indices[i] ^= 1;
            assert!(!verify_proof(&tampered, &hasher).unwrap(), "{} district index {}", id, i);
        }

        let country_trace = replay_trace(
            proof.country_proof.country_root,
            &proof.country_proof.siblings,
            &proof.country_proof.path_indices,
            &hasher,
        );
        for i in 0..proof.country_proof.path_indices.len() {
            if country_trace[i] == proof.country_proof.siblings[i] {
                continue;
            }
            let mut tampered = proof.clone();
            tampered.country_proof.path_indices[i] ^= 1;
            assert!(!verify_proof(&tampered, &hasher).unwrap(), "{} country index {}", id, i);
        }
    }
}

#[test]
fn test_all_indices_flipped_rejected() {
    let (tree, hasher) = fixture();
    let mut proof = generate_proof(&tree, "US-TX-AUS-CD21").unwrap();
    for index in proof
        .district_proof
        .path_indices
        .iter_mut()
        .chain(proof.country_proof.path_indices.iter_mut())
    {
        *index ^= 1;
    }
    assert!(!verify_proof(&proof, &hasher).unwrap());
}

#[test]
fn test_swapped_siblings_rejected() {
    let (tree, hasher) = fixture();
    // US has 4 districts -> depth-2 district path with distinct siblings
    let mut proof = generate_proof(&tree, "US-CA-SF-CD02").unwrap();
    assert_eq!(proof.district_proof.siblings.len(), 2);
    proof.district_proof.siblings.swap(0, 1);
    assert!(!verify_proof(&proof, &hasher).unwrap());
}

#[test]
fn test_non_binary_index_rejected_not_error() {
    let (tree, hasher) = fixture();
    let mut proof = generate_proof(&tree, "US-CA-SF-CD02").unwrap();
    proof.district_proof.path_indices[0] = 7;
    assert!(!verify_proof(&proof, &hasher).unwrap());
}

#[test]
fn test_tampered_roots_rejected() {
    let (tree, hasher) = fixture();
    let proof = generate_proof(&tree, "FR-IDF-PAR-01").unwrap();

    let mut bad_country = proof.clone();
    bad_country.district_proof.country_root = flip_low_bit(bad_country.district_proof.country_root);
    assert!(!verify_proof(&bad_country, &hasher).unwrap());

    let mut bad_anchor = proof.clone();
    bad_anchor.country_proof.country_root = flip_low_bit(bad_anchor.country_proof.country_root);
    assert!(!verify_proof(&bad_anchor, &hasher).unwrap());

    let mut bad_global = proof;
    bad_global.country_proof.global_root = flip_low_bit(bad_global.country_proof.global_root);
    assert!(!verify_proof(&bad_global, &hasher).unwrap());
}

#[test]
fn test_cross_country_replay_rejected() {
    let (tree, hasher) = fixture();
    let us_proof = generate_proof(&tree, "US-CA-LA-CD01").unwrap();
    let ca_proof = generate_proof(&tree, "CA-ON-TOR-01").unwrap();
    let ca_root = tree.country("CA").unwrap().root;

    // US district path against Canada's root
    let mut replayed = us_proof.clone();
    replayed.district_proof.country_root = ca_root;
    replayed.country_proof.country_root = ca_root;
    assert!(!verify_proof(&replayed, &hasher).unwrap());

    // US district path spliced onto Canada's upper path
    let spliced = DistrictProof {
        district_proof: us_proof.district_proof.clone(),
        country_proof: ca_proof.country_proof.clone(),
        metadata: us_proof.metadata.clone(),
    };
    assert!(!verify_proof(&spliced, &hasher).unwrap());
}

#[test]
fn test_truncated_path_is_malformed_or_invalid() {
    let (tree, hasher) = fixture();
    let proof = generate_proof(&tree, "US-CA-LA-CD01").unwrap();

    // Drop a sibling only: structural error
    let mut uneven = proof.clone();
    uneven.district_proof.siblings.pop();
    assert!(matches!(
        verify_proof(&uneven, &hasher),
        Err(AtlasError::MalformedProof(_))
    ));

    // Drop a whole level: well-typed but wrong
    let mut truncated = proof;
    truncated.district_proof.siblings.pop();
    truncated.district_proof.path_indices.pop();
    assert!(!verify_proof(&truncated, &hasher).unwrap());
}

#[test]
fn test_tampered_regional_proof_rejected() {
    let (tree, hasher) = fixture();
    let proof = generate_regional_proof(&tree, "europe").unwrap();
    assert!(verify_regional_proof(&proof, &hasher).unwrap());

    let mut bad_root = proof.clone();
    bad_root.continental_root = flip_low_bit(bad_root.continental_root);
    assert!(!verify_regional_proof(&bad_root, &hasher).unwrap());

    let mut bad_sibling = proof.clone();
    bad_sibling.continental_proof.siblings[0] = flip_low_bit(bad_sibling.continental_proof.siblings[0]);
    assert!(!verify_regional_proof(&bad_sibling, &hasher).unwrap());

    let mut flipped = proof.clone();
    flipped.continental_proof.path_indices[0] ^= 1;
    assert!(!verify_regional_proof(&flipped, &hasher).unwrap());

    // Other continent's root against europe's path
    let mut swapped = proof;
    swapped.continental_root = tree.continent("americas").unwrap().root;
    assert!(!verify_regional_proof(&swapped, &hasher).unwrap());
}
