//! Shared fixtures for integration tests
#![allow(dead_code)]

use shadow_atlas::{
    BoundaryType, CensusBuilder, CountryRegistry, DistrictInput, Fr, Geometry, PoseidonPairHash,
};
use tracing_subscriber::EnvFilter;

/// Route build logs to the test writer; `RUST_LOG=shadow_atlas=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Closed 5-position square with its south-west corner at (lon, lat)
pub fn square(lon: f64, lat: f64, size: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        [lon, lat],
        [lon + size, lat],
        [lon + size, lat + size],
        [lon, lat + size],
        [lon, lat],
    ]])
}

pub fn district(
    id: &str,
    country: &str,
    region: &str,
    boundary_type: BoundaryType,
    lon: f64,
    lat: f64,
) -> DistrictInput {
    DistrictInput {
        id: id.to_string(),
        name: format!("District {}", id),
        country: country.to_string(),
        region: region.to_string(),
        boundary_type,
        authority: 1,
        geometry: square(lon, lat, 0.05),
    }
}

/// Single-district scenario
pub fn la_district() -> DistrictInput {
    district(
        "US-CA-LA-CD01",
        "US",
        "CA",
        BoundaryType::CongressionalDistrict,
        -118.2437,
        34.0522,
    )
}

/// 11 districts across 5 countries:
/// americas = {CA, US}, europe = {DE, FR, GB}
pub fn eleven_districts() -> Vec<DistrictInput> {
    use BoundaryType::*;
    vec![
        la_district(),
        district("US-CA-SF-CD02", "US", "CA", CongressionalDistrict, -122.4194, 37.7749),
        district("US-NY-NYC-CD10", "US", "NY", CongressionalDistrict, -74.0060, 40.7128),
        district("US-TX-AUS-CD21", "US", "TX", CongressionalDistrict, -97.7431, 30.2672),
        district("CA-ON-TOR-01", "CA", "ON", ElectoralDistrict, -79.3832, 43.6532),
        district("CA-BC-VAN-01", "CA", "BC", ElectoralDistrict, -123.1207, 49.2827),
        district("GB-ENG-LDN-01", "GB", "ENG", ParliamentaryConstituency, -0.1276, 51.5072),
        district("GB-SCT-EDI-01", "GB", "SCT", ParliamentaryConstituency, -3.1883, 55.9533),
        district("FR-IDF-PAR-01", "FR", "IDF", ElectoralDistrict, 2.3522, 48.8566),
        district("FR-ARA-LYO-01", "FR", "ARA", ElectoralDistrict, 4.8357, 45.7640),
        district("DE-BE-BER-01", "DE", "BE", CityCouncilDistrict, 13.4050, 52.5200),
    ]
}

pub fn builder() -> CensusBuilder<PoseidonPairHash> {
    CensusBuilder::new(PoseidonPairHash::new(), CountryRegistry::builtin())
}

/// Flip the lowest bit of a field element (p - 1 would flip to p, so that one
/// value falls back to +1)
pub fn flip_low_bit(value: Fr) -> Fr {
    let mut bytes = value.to_bytes();
    bytes[0] ^= 1;
    Option::<Fr>::from(Fr::from_bytes(&bytes)).unwrap_or(value + Fr::from(1u64))
}
