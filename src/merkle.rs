// Level Tree Builder - binary Merkle tree over an ordered list of field elements
// Hierarchy-agnostic: reused unchanged for district -> country, country ->
// continent and continent -> global.
//
// ODD LEVELS: the last node is DUPLICATED and paired with itself.
// SINGLE VALUE: the value is its own root, the path is empty.
// PATH INDICES: 0 = current node is the LEFT child, 1 = RIGHT child.

use halo2_proofs::halo2curves::bn256::Fr;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::field::hex_serde_vec;
use crate::poseidon_hash::PairHash;

/// Validate Merkle path inputs BEFORE replaying them
///
/// Path must contain exactly one direction per sibling. Returning a `Result`
/// here (instead of panicking mid-replay) keeps malformed proofs from taking
/// down a verifier process.
pub fn validate_path_lengths(siblings: usize, path_indices: usize) -> Result<()> {
    if siblings != path_indices {
        return Err(AtlasError::MalformedProof(format!(
            "got {} siblings but {} path indices. \
             Path must contain exactly one direction per tree level.",
            siblings, path_indices
        )));
    }
    Ok(())
}

/// Authentication path from a value up to its level root
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerklePath {
    #[serde(with = "hex_serde_vec")]
    pub siblings: Vec<Fr>,
    pub path_indices: Vec<u8>,
}

impl MerklePath {
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Append another path (used to chain country -> continent -> global)
    pub fn extend(&mut self, other: MerklePath) {
        self.siblings.extend(other.siblings);
        self.path_indices.extend(other.path_indices);
    }

    /// Replay the path from `start`
    ///
    /// `Ok(None)` when a path index is neither 0 nor 1: the path is invalid,
    /// but well-typed, so callers report it as a failed verification.
    pub fn compute_root<H: PairHash + ?Sized>(&self, start: Fr, hasher: &H) -> Result<Option<Fr>> {
        replay_path(start, &self.siblings, &self.path_indices, hasher)
    }
}

/// Replay sibling/direction pairs from `start`
pub fn replay_path<H: PairHash + ?Sized>(
    start: Fr,
    siblings: &[Fr],
    path_indices: &[u8],
    hasher: &H,
) -> Result<Option<Fr>> {
    validate_path_lengths(siblings.len(), path_indices.len())?;

    let mut current = start;
    for (sibling, index) in siblings.iter().zip(path_indices.iter()) {
        current = match index {
            0 => hasher.hash_pair(current, *sibling),
            1 => hasher.hash_pair(*sibling, current),
            _ => return Ok(None),
        };
    }
    Ok(Some(current))
}

/// Fully materialized level tree (all layers kept for path extraction)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelTree {
    /// layers[0] = input values, last layer = [root]
    layers: Vec<Vec<Fr>>,
}

impl LevelTree {
    /// Build bottom-up over `values` in the given order
    pub fn build<H: PairHash + ?Sized>(values: Vec<Fr>, hasher: &H) -> Result<Self> {
        if values.is_empty() {
            return Err(AtlasError::EmptyLevel);
        }

        let mut layers = vec![values];
        while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<Fr> = current
                .chunks(2)
                .map(|pair| {
                    let left = pair[0];
                    // Odd tail: pair the last node with itself
                    let right = pair.get(1).copied().unwrap_or(left);
                    hasher.hash_pair(left, right)
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    pub fn root(&self) -> Fr {
        // Non-empty by construction
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of input values
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn values(&self) -> &[Fr] {
        &self.layers[0]
    }

    /// Authentication path for the value at `index`
    pub fn proof_of(&self, index: usize) -> Result<MerklePath> {
        if index >= self.len() {
            return Err(AtlasError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }

        let mut path = MerklePath::default();
        let mut current_index = index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_index = current_index ^ 1; // Flip last bit
            // Duplicated tail: a lone last node is its own sibling
            let sibling = layer.get(sibling_index).unwrap_or(&layer[current_index]);

            path.siblings.push(*sibling);
            path.path_indices.push((current_index & 1) as u8);

            current_index /= 2;
        }

        Ok(path)
    }
}
