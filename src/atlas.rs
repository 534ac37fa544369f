// Hierarchy Assembler - district leaves -> country -> continent -> global root
//
// ALGORITHM:
// 1. Validate + encode every district to a leaf
// 2. Sort by (country, region, id)   <- makes the root independent of input order
// 3. LevelTree per country over its sorted leaves -> country root
// 4. Countries sorted by code, grouped by continent -> continent root
// 5. Continents sorted by name -> global root
//
// Regions are metadata: each region gets its own root for reporting, but that
// root is NOT fed into the country tree.
//
// ORDERING IS A CORRECTNESS REQUIREMENT: subtrees may be built on the rayon
// pool, but results are collected in sorted order before the next level.

use std::collections::{BTreeMap, BTreeSet};

use halo2_proofs::halo2curves::bn256::Fr;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AtlasConfig;
use crate::district::{BoundaryType, DistrictInput};
use crate::error::{AtlasError, Result};
use crate::field::{field_to_hex, hex_serde};
use crate::leaf::encode_leaf;
use crate::merkle::LevelTree;
use crate::poseidon_hash::PairHash;
use crate::registry::CountryRegistry;

// ============================================================================
// TREE ARTIFACT
// ============================================================================

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafEntry {
    pub district_id: String,
    #[serde(with = "hex_serde")]
    pub leaf_hash: Fr,
    pub boundary_type: BoundaryType,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNode {
    pub code: String,
    /// Metadata root over this region's leaves (not part of the global commitment)
    #[serde(with = "hex_serde")]
    pub root: Fr,
    pub district_count: usize,
    pub leaves: Vec<LeafEntry>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryNode {
    pub code: String,
    pub name: String,
    #[serde(with = "hex_serde")]
    pub root: Fr,
    pub district_count: usize,
    pub regions: Vec<RegionNode>,
    #[serde(skip)]
    pub(crate) tree: LevelTree,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentNode {
    pub name: String,
    #[serde(with = "hex_serde")]
    pub root: Fr,
    pub country_count: usize,
    pub district_count: usize,
    pub countries: Vec<CountryNode>,
    #[serde(skip)]
    pub(crate) tree: LevelTree,
}

/// Position of a district inside the built hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DistrictLocation {
    pub continent: usize,
    pub country: usize,
    pub region: usize,
    /// Index within the region's leaf list
    pub region_leaf: usize,
    /// Index within the country level tree
    pub country_leaf: usize,
}

/// The built census: immutable, queried by the proof generator
///
/// Callers needing an updated census build a new tree; there is no
/// incremental update.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusTree {
    #[serde(with = "hex_serde")]
    global_root: Fr,
    total_districts: usize,
    continents: Vec<ContinentNode>,
    #[serde(skip)]
    tree: LevelTree,
    #[serde(skip)]
    index: BTreeMap<String, DistrictLocation>,
}

/// Counts per hierarchy level, for reporting
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusSummary {
    pub global_root: String,
    pub total_districts: usize,
    pub continents: usize,
    pub countries: usize,
    pub regions: usize,
}

impl CensusTree {
    pub fn global_root(&self) -> Fr {
        self.global_root
    }

    pub fn total_districts(&self) -> usize {
        self.total_districts
    }

    pub fn continents(&self) -> &[ContinentNode] {
        &self.continents
    }

    pub fn continent(&self, name: &str) -> Option<&ContinentNode> {
        self.continents.iter().find(|continent| continent.name == name)
    }

    pub(crate) fn continent_index(&self, name: &str) -> Option<usize> {
        self.continents.iter().position(|continent| continent.name == name)
    }

    pub fn country(&self, code: &str) -> Option<&CountryNode> {
        self.continents
            .iter()
            .flat_map(|continent| continent.countries.iter())
            .find(|country| country.code == code)
    }

    pub fn find_district(&self, id: &str) -> Option<&LeafEntry> {
        let loc = self.locate(id)?;
        Some(
            &self.continents[loc.continent].countries[loc.country].regions[loc.region].leaves
                [loc.region_leaf],
        )
    }

    /// District ids in commitment order
    pub fn district_ids(&self) -> impl Iterator<Item = &str> {
        self.continents
            .iter()
            .flat_map(|continent| continent.countries.iter())
            .flat_map(|country| country.regions.iter())
            .flat_map(|region| region.leaves.iter())
            .map(|leaf| leaf.district_id.as_str())
    }

    pub fn summary(&self) -> CensusSummary {
        let countries = self.continents.iter().map(|c| c.countries.len()).sum();
        let regions = self
            .continents
            .iter()
            .flat_map(|c| c.countries.iter())
            .map(|country| country.regions.len())
            .sum();

        CensusSummary {
            global_root: field_to_hex(&self.global_root),
            total_districts: self.total_districts,
            continents: self.continents.len(),
            countries,
            regions,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn locate(&self, id: &str) -> Option<DistrictLocation> {
        self.index.get(id).copied()
    }

    pub(crate) fn global_tree(&self) -> &LevelTree {
        &self.tree
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// One validated, encoded district
struct EncodedDistrict<'a> {
    district: &'a DistrictInput,
    leaf: Fr,
}

pub struct CensusBuilder<H> {
    hasher: H,
    registry: CountryRegistry,
    parallel: bool,
}

impl<H: PairHash> CensusBuilder<H> {
    pub fn new(hasher: H, registry: CountryRegistry) -> Self {
        Self {
            hasher,
            registry,
            parallel: true,
        }
    }

    pub fn from_config(hasher: H, config: &AtlasConfig) -> Self {
        Self {
            hasher,
            registry: config.registry(),
            parallel: config.effective_parallel(),
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn registry(&self) -> &CountryRegistry {
        &self.registry
    }

    /// Build the full hierarchy. Any input error aborts the whole batch.
    pub fn build(&self, districts: &[DistrictInput]) -> Result<CensusTree> {
        if districts.is_empty() {
            return Err(AtlasError::EmptyBatch);
        }
        self.check_batch(districts)?;

        // 1. Encode (the expensive part: one pair hash per committed element)
        let mut encoded = self.map_items(districts.iter().collect(), |district| {
            encode_leaf(district, &self.hasher).map(|leaf| EncodedDistrict { district, leaf })
        })?;

        // 2. Canonical order
        encoded.sort_by(|a, b| {
            (&a.district.country, &a.district.region, &a.district.id)
                .cmp(&(&b.district.country, &b.district.region, &b.district.id))
        });

        // 3. Country subtrees (BTreeMap iteration = country code order)
        let mut by_country: BTreeMap<&str, Vec<EncodedDistrict<'_>>> = BTreeMap::new();
        for entry in encoded {
            by_country
                .entry(entry.district.country.as_str())
                .or_default()
                .push(entry);
        }
        let countries = self.map_items(by_country.into_iter().collect(), |(code, members)| {
            self.build_country(code, members)
        })?;

        // 4. Continent subtrees (BTreeMap iteration = continent name order)
        let mut by_continent: BTreeMap<String, Vec<CountryNode>> = BTreeMap::new();
        for country in countries {
            let continent = self
                .registry
                .continent_of(&country.code)
                .ok_or_else(|| AtlasError::UnknownCountry(country.code.clone()))?;
            by_continent.entry(continent.to_string()).or_default().push(country);
        }

        let mut continents = Vec::with_capacity(by_continent.len());
        for (name, countries) in by_continent {
            continents.push(self.build_continent(name, countries)?);
        }

        // 5. Global root
        let tree = LevelTree::build(continents.iter().map(|c| c.root).collect(), &self.hasher)?;
        let global_root = tree.root();
        let index = index_districts(&continents);
        let total_districts = index.len();

        info!(
            total_districts,
            countries = continents.iter().map(|c| c.country_count).sum::<usize>(),
            continents = continents.len(),
            global_root = %field_to_hex(&global_root),
            "built census tree"
        );

        Ok(CensusTree {
            global_root,
            total_districts,
            continents,
            tree,
            index,
        })
    }

    /// Duplicate ids and unknown countries fail before any hashing
    fn check_batch(&self, districts: &[DistrictInput]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for district in districts {
            if !seen.insert(district.id.as_str()) {
                return Err(AtlasError::DuplicateDistrict(district.id.clone()));
            }
            if self.registry.lookup(&district.country).is_none() {
                return Err(AtlasError::UnknownCountry(district.country.clone()));
            }
        }
        Ok(())
    }

    fn build_country(&self, code: &str, members: Vec<EncodedDistrict<'_>>) -> Result<CountryNode> {
        let name = self
            .registry
            .lookup(code)
            .map(|entry| entry.name.clone())
            .ok_or_else(|| AtlasError::UnknownCountry(code.to_string()))?;

        let tree = LevelTree::build(members.iter().map(|m| m.leaf).collect(), &self.hasher)?;

        // Members are sorted by region, so regions are contiguous runs
        let mut regions: Vec<RegionNode> = Vec::new();
        let mut region_leaves: Vec<Fr> = Vec::new();
        for member in &members {
            let entry = LeafEntry {
                district_id: member.district.id.clone(),
                leaf_hash: member.leaf,
                boundary_type: member.district.boundary_type,
            };
            let same_region = regions
                .last()
                .map_or(false, |region| region.code == member.district.region);

            if same_region {
                if let Some(region) = regions.last_mut() {
                    region.leaves.push(entry);
                }
            } else {
                self.seal_region(regions.last_mut(), &mut region_leaves)?;
                regions.push(RegionNode {
                    code: member.district.region.clone(),
                    root: Fr::from(0u64),
                    district_count: 0,
                    leaves: vec![entry],
                });
            }
            region_leaves.push(member.leaf);
        }
        self.seal_region(regions.last_mut(), &mut region_leaves)?;

        debug!(
            country = code,
            districts = members.len(),
            regions = regions.len(),
            root = %field_to_hex(&tree.root()),
            "built country subtree"
        );

        Ok(CountryNode {
            code: code.to_string(),
            name,
            root: tree.root(),
            district_count: members.len(),
            regions,
            tree,
        })
    }

    /// Finalize the metadata root of the region that just ended
    fn seal_region(&self, region: Option<&mut RegionNode>, leaves: &mut Vec<Fr>) -> Result<()> {
        if let Some(region) = region {
            let tree = LevelTree::build(std::mem::take(leaves), &self.hasher)?;
            region.root = tree.root();
            region.district_count = tree.len();
        }
        Ok(())
    }

    fn build_continent(&self, name: String, countries: Vec<CountryNode>) -> Result<ContinentNode> {
        let tree = LevelTree::build(countries.iter().map(|c| c.root).collect(), &self.hasher)?;
        let district_count = countries.iter().map(|c| c.district_count).sum();

        debug!(
            continent = %name,
            countries = countries.len(),
            districts = district_count,
            root = %field_to_hex(&tree.root()),
            "built continent subtree"
        );

        Ok(ContinentNode {
            root: tree.root(),
            country_count: countries.len(),
            district_count,
            name,
            countries,
            tree,
        })
    }

    /// Order-preserving map, on the rayon pool when enabled
    fn map_items<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U> + Send + Sync,
    {
        if self.parallel {
            items.into_par_iter().map(f).collect()
        } else {
            items.into_iter().map(f).collect()
        }
    }
}

fn index_districts(continents: &[ContinentNode]) -> BTreeMap<String, DistrictLocation> {
    let mut index = BTreeMap::new();
    for (ci, continent) in continents.iter().enumerate() {
        for (ki, country) in continent.countries.iter().enumerate() {
            let mut country_leaf = 0;
            for (ri, region) in country.regions.iter().enumerate() {
                for (li, leaf) in region.leaves.iter().enumerate() {
                    index.insert(
                        leaf.district_id.clone(),
                        DistrictLocation {
                            continent: ci,
                            country: ki,
                            region: ri,
                            region_leaf: li,
                            country_leaf,
                        },
                    );
                    country_leaf += 1;
                }
            }
        }
    }
    index
}

/// Build with the given primitive and registry (parallel subtrees)
pub fn build<H: PairHash>(
    districts: &[DistrictInput],
    hasher: H,
    registry: CountryRegistry,
) -> Result<CensusTree> {
    CensusBuilder::new(hasher, registry).build(districts)
}
