// Pair Hash Adapter - Poseidon over BN254 via Axiom halo2_base
// Production-proven: Axiom Mainnet V2, Trail of Bits audited (2023)
// Reference: https://github.com/axiom-crypto/halo2-lib
//
// The census engine never implements hashing itself. Everything above this
// module only sees the `PairHash` contract:
//   (a) deterministic
//   (b) total on [0, p)^2 (a == b and a == 0 included)
//   (c) NON-COMMUTATIVE: hash(a, b) != hash(b, a) for a != b
// (c) is what makes a swapped sibling detectable. The hot path does NOT
// re-verify these properties; run `check_conformance` before deploying a
// substitute primitive.

use std::fmt;

use halo2_base::{
    gates::{
        circuit::{builder::RangeCircuitBuilder, CircuitBuilderStage},
        RangeInstructions,
    },
    poseidon::hasher::{spec::OptimizedPoseidonSpec, PoseidonHasher},
};
use halo2_proofs::halo2curves::{bn256::Fr, ff::Field};

use crate::error::{AtlasError, Result};

// Poseidon parameters (aligned with Axiom standard, same as the circuits)
pub const T: usize = 3;      // State size
pub const RATE: usize = 2;   // Absorption rate (inputs per permutation)
pub const R_F: usize = 8;    // Full rounds
pub const R_P: usize = 57;   // Partial rounds (Axiom standard, vs PSE's 56)

/// Rows for the scratch builder; one Poseidon permutation fits easily
const K: usize = 10;

/// Two-input hash used for leaves and every Merkle level
pub trait PairHash: Send + Sync {
    /// `hash(left, right)`; argument order is significant
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr;
}

/// Native evaluation of the exact Poseidon gadget the circuits constrain
///
/// Values are extracted from a throwaway mock builder, so roots computed here
/// are bit-identical to what the membership circuits recompute
/// in-circuit. Round constants and MDS matrices are generated ONCE per instance
/// and cloned into each hasher.
#[derive(Clone)]
pub struct PoseidonPairHash {
    spec: OptimizedPoseidonSpec<Fr, T, RATE>,
}

impl PoseidonPairHash {
    pub fn new() -> Self {
        Self {
            spec: OptimizedPoseidonSpec::new::<R_F, R_P, 0>(),
        }
    }
}

impl fmt::Debug for PoseidonPairHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseidonPairHash")
            .field("t", &T)
            .field("rate", &RATE)
            .field("r_f", &R_F)
            .field("r_p", &R_P)
            .finish()
    }
}

impl Default for PoseidonPairHash {
    fn default() -> Self {
        Self::new()
    }
}

impl PairHash for PoseidonPairHash {
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        let mut builder = RangeCircuitBuilder::<Fr>::from_stage(CircuitBuilderStage::Mock).use_k(K);
        builder.set_lookup_bits(8);
        let range = builder.range_chip();
        let gate = range.gate();
        let ctx = builder.main(0);

        let left_assigned = ctx.load_witness(left);
        let right_assigned = ctx.load_witness(right);

        let mut poseidon = PoseidonHasher::<Fr, T, RATE>::new(self.spec.clone());
        poseidon.initialize_consts(ctx, gate);

        // Array length = 2 gives domain separation from single-element hashing
        let hash = poseidon.hash_fix_len_array(ctx, gate, &[left_assigned, right_assigned]);

        *hash.value()
    }
}

impl<H: PairHash + ?Sized> PairHash for &H {
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        (**self).hash_pair(left, right)
    }
}

impl<H: PairHash + ?Sized> PairHash for Box<H> {
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        (**self).hash_pair(left, right)
    }
}

// ============================================================================
// CONFORMANCE
// ============================================================================

/// Check an injected primitive against the properties the engine relies on
///
/// Covers determinism, totality at the field edges (0, equal inputs, p-1, p-2)
/// and non-commutativity. Intended for deployment-time vetting and test suites,
/// not per-call use.
pub fn check_conformance<H: PairHash + ?Sized>(hasher: &H) -> Result<()> {
    let p_minus_one = -Fr::ONE;
    let p_minus_two = -Fr::from(2u64);

    let pairs = [
        (Fr::from(12345u64), Fr::from(67890u64)),
        (Fr::ZERO, Fr::ONE),
        (Fr::ZERO, p_minus_one),
        (p_minus_one, p_minus_two),
        (Fr::ONE, p_minus_one),
    ];

    for (a, b) in pairs {
        let ab = hasher.hash_pair(a, b);
        if ab != hasher.hash_pair(a, b) {
            return Err(AtlasError::HashContractViolation(
                "hash_pair is not deterministic".to_string(),
            ));
        }
        if ab == hasher.hash_pair(b, a) {
            return Err(AtlasError::HashContractViolation(format!(
                "hash_pair is commutative on ({:?}, {:?})",
                a, b
            )));
        }
    }

    // Totality on degenerate inputs: must return without panicking
    for v in [Fr::ZERO, Fr::ONE, p_minus_one] {
        let _ = hasher.hash_pair(v, v);
    }

    Ok(())
}
