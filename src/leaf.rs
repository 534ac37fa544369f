// Leaf Encoder - one district record -> one field element
//
// leaf = fold(pair_hash, DOMAIN, [
//     boundary_type_code,
//     authority,
//     id_byte_len, id_chunk_0, id_chunk_1, ...,
//     geometry_tag, polygon_count,
//       ring_count, vertex_count, lon, lat, lon, lat, ...   (per polygon / ring)
// ])
//
// `name` is NOT part of the sequence. Boundary type and authority are, so two
// identical geometries with different governance semantics never share a leaf.
// Length markers keep the stream prefix-free (no aliasing between id chunks,
// rings, or polygons).

use blake2::{Blake2b512, Digest};
use halo2_proofs::halo2curves::bn256::Fr;

use crate::district::{DistrictInput, Geometry};
use crate::error::{AtlasError, Result};
use crate::field::{encode_bytes, encode_coordinate, CHUNK_BYTES};
use crate::poseidon_hash::PairHash;

/// Label the leaf domain constant is derived from
pub const LEAF_DOMAIN_LABEL: &[u8] = b"shadow-atlas/district-leaf/v1";

/// Domain-separation seed: first 31 bytes of Blake2b-512(label), big-endian
pub fn leaf_domain() -> Result<Fr> {
    let digest = Blake2b512::digest(LEAF_DOMAIN_LABEL);
    encode_bytes(&digest[..CHUNK_BYTES])?
        .into_iter()
        .next()
        .ok_or_else(|| AtlasError::InvalidFieldElement("empty domain digest".to_string()))
}

/// Ordered field-element stream committed by a leaf (seed excluded)
pub fn leaf_sequence(district: &DistrictInput) -> Result<Vec<Fr>> {
    district.validate()?;

    let id_bytes = district.id.as_bytes();
    let mut sequence = Vec::with_capacity(8 + 2 * district.geometry.vertex_count());

    sequence.push(Fr::from(district.boundary_type.code()));
    sequence.push(Fr::from(u64::from(district.authority)));
    sequence.push(Fr::from(id_bytes.len() as u64));
    sequence.extend(encode_bytes(id_bytes)?);
    sequence.extend(geometry_sequence(&district.geometry)?);

    Ok(sequence)
}

fn geometry_sequence(geometry: &Geometry) -> Result<Vec<Fr>> {
    let polygons = geometry.polygons();
    let mut sequence = vec![Fr::from(geometry.tag()), Fr::from(polygons.len() as u64)];

    for rings in polygons {
        sequence.push(Fr::from(rings.len() as u64));
        for ring in rings {
            sequence.push(Fr::from(ring.len() as u64));
            for [lon, lat] in ring {
                sequence.extend(encode_coordinate(*lon, *lat)?);
            }
        }
    }

    Ok(sequence)
}

/// Canonical leaf for one district
pub fn encode_leaf<H: PairHash + ?Sized>(district: &DistrictInput, hasher: &H) -> Result<Fr> {
    let domain = leaf_domain()?;
    Ok(leaf_sequence(district)?
        .into_iter()
        .fold(domain, |acc, next| hasher.hash_pair(acc, next)))
}
