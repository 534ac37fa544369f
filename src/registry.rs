//! Country -> continent lookup
//!
//! Loaded once (built-in table plus config overrides) and passed explicitly
//! to the builder. Used for grouping and proof metadata, never hashed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// ISO 3166-1 alpha-2
    pub code: String,
    pub name: String,
    /// Lowercase continent key (`africa`, `americas`, `asia`, `europe`, `oceania`)
    pub continent: String,
}

impl CountryEntry {
    pub fn new(code: &str, name: &str, continent: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            continent: continent.to_string(),
        }
    }
}

// (code, display name, continent)
const BUILTIN_COUNTRIES: &[(&str, &str, &str)] = &[
    // Africa
    ("DZ", "Algeria", "africa"),
    ("EG", "Egypt", "africa"),
    ("ET", "Ethiopia", "africa"),
    ("GH", "Ghana", "africa"),
    ("KE", "Kenya", "africa"),
    ("MA", "Morocco", "africa"),
    ("NG", "Nigeria", "africa"),
    ("SN", "Senegal", "africa"),
    ("TZ", "Tanzania", "africa"),
    ("UG", "Uganda", "africa"),
    ("ZA", "South Africa", "africa"),
    // Americas
    ("AR", "Argentina", "americas"),
    ("BR", "Brazil", "americas"),
    ("CA", "Canada", "americas"),
    ("CL", "Chile", "americas"),
    ("CO", "Colombia", "americas"),
    ("CR", "Costa Rica", "americas"),
    ("JM", "Jamaica", "americas"),
    ("MX", "Mexico", "americas"),
    ("PE", "Peru", "americas"),
    ("US", "United States", "americas"),
    ("UY", "Uruguay", "americas"),
    // Asia
    ("BD", "Bangladesh", "asia"),
    ("ID", "Indonesia", "asia"),
    ("IL", "Israel", "asia"),
    ("IN", "India", "asia"),
    ("JP", "Japan", "asia"),
    ("KR", "South Korea", "asia"),
    ("MY", "Malaysia", "asia"),
    ("PH", "Philippines", "asia"),
    ("PK", "Pakistan", "asia"),
    ("SG", "Singapore", "asia"),
    ("TH", "Thailand", "asia"),
    ("TW", "Taiwan", "asia"),
    // Europe
    ("AT", "Austria", "europe"),
    ("BE", "Belgium", "europe"),
    ("CH", "Switzerland", "europe"),
    ("CZ", "Czechia", "europe"),
    ("DE", "Germany", "europe"),
    ("DK", "Denmark", "europe"),
    ("EE", "Estonia", "europe"),
    ("ES", "Spain", "europe"),
    ("FI", "Finland", "europe"),
    ("FR", "France", "europe"),
    ("GB", "United Kingdom", "europe"),
    ("GR", "Greece", "europe"),
    ("HU", "Hungary", "europe"),
    ("IE", "Ireland", "europe"),
    ("IS", "Iceland", "europe"),
    ("IT", "Italy", "europe"),
    ("LT", "Lithuania", "europe"),
    ("LU", "Luxembourg", "europe"),
    ("LV", "Latvia", "europe"),
    ("NL", "Netherlands", "europe"),
    ("NO", "Norway", "europe"),
    ("PL", "Poland", "europe"),
    ("PT", "Portugal", "europe"),
    ("RO", "Romania", "europe"),
    ("SE", "Sweden", "europe"),
    ("SI", "Slovenia", "europe"),
    ("SK", "Slovakia", "europe"),
    ("UA", "Ukraine", "europe"),
    // Oceania
    ("AU", "Australia", "oceania"),
    ("FJ", "Fiji", "oceania"),
    ("NZ", "New Zealand", "oceania"),
    ("PG", "Papua New Guinea", "oceania"),
    ("WS", "Samoa", "oceania"),
];

/// Read-only after construction; cheap to clone
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountryRegistry {
    entries: BTreeMap<String, CountryEntry>,
}

impl CountryRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in ISO 3166-1 table
    pub fn builtin() -> Self {
        let entries = BUILTIN_COUNTRIES
            .iter()
            .map(|(code, name, continent)| (code.to_string(), CountryEntry::new(code, name, continent)))
            .collect();
        Self { entries }
    }

    /// Apply overrides on top of the current table
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = CountryEntry>) -> Self {
        for entry in overrides {
            if let Some(previous) = self.insert(entry) {
                warn!(
                    code = %previous.code,
                    continent = %previous.continent,
                    "registry override replaced built-in country entry"
                );
            }
        }
        self
    }

    /// Insert or replace; returns the replaced entry
    pub fn insert(&mut self, entry: CountryEntry) -> Option<CountryEntry> {
        self.entries.insert(entry.code.clone(), entry)
    }

    pub fn lookup(&self, code: &str) -> Option<&CountryEntry> {
        self.entries.get(code)
    }

    pub fn continent_of(&self, code: &str) -> Option<&str> {
        self.lookup(code).map(|entry| entry.continent.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
