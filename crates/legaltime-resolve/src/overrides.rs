//! Read-only override tables consumed by the region resolver.
//!
//! Three simple key/value documents, loaded once at startup: a disable list
//! of location names to exclude outright, a remap dictionary from raw
//! location name to region code, and a name-alias table mapping common
//! free-text names (full state names and the like) to codes. The alias
//! table's value set doubles as the universe of known region codes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use legaltime_types::RegionCode;

use crate::error::ResolveError;

/// On-disk shape of the place-overrides document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceOverrides {
    /// Location names excluded outright (error places, hopeless ambiguity).
    #[serde(default)]
    pub disable: BTreeSet<String>,
    /// Raw location name to region code corrections.
    #[serde(default)]
    pub remap: BTreeMap<String, RegionCode>,
}

/// All override tables, plus the derived universe of known codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTables {
    disable: BTreeSet<String>,
    remap: BTreeMap<String, RegionCode>,
    aliases: BTreeMap<String, RegionCode>,
    codes: BTreeSet<RegionCode>,
}

impl OverrideTables {
    /// Load the place-overrides and name-alias documents from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::TableIo`] / [`ResolveError::TableParse`] on
    /// unreadable or malformed documents; both are fatal configuration
    /// errors.
    pub fn load(overrides_path: &Path, aliases_path: &Path) -> Result<Self, ResolveError> {
        let overrides: PlaceOverrides = read_json(overrides_path)?;
        let aliases: BTreeMap<String, RegionCode> = read_json(aliases_path)?;
        Ok(Self::from_parts(overrides, aliases))
    }

    /// Assemble tables from already-parsed documents (tests, embedding).
    pub fn from_parts(
        overrides: PlaceOverrides,
        aliases: BTreeMap<String, RegionCode>,
    ) -> Self {
        let codes = aliases.values().cloned().collect();
        Self {
            disable: overrides.disable,
            remap: overrides.remap,
            aliases,
            codes,
        }
    }

    /// Whether a location name is on the disable list.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disable.contains(name)
    }

    /// The remapped code for a raw location name, if any.
    pub fn remapped(&self, name: &str) -> Option<&RegionCode> {
        self.remap.get(name)
    }

    /// The aliased code for a free-text location name, if any.
    pub fn alias(&self, name: &str) -> Option<&RegionCode> {
        self.aliases.get(name)
    }

    /// Whether a code belongs to the known-region universe.
    pub fn is_known_code(&self, code: &RegionCode) -> bool {
        self.codes.contains(code)
    }
}

/// Read and deserialize one JSON document.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ResolveError> {
    let text = std::fs::read_to_string(path).map_err(|source| ResolveError::TableIo {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ResolveError::TableParse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_tables() -> OverrideTables {
        let overrides: PlaceOverrides = serde_json::from_str(
            r#"{
                "disable": ["Nowhere, USA"],
                "remap": {"The Mile High City": "CO"}
            }"#,
        )
        .unwrap();
        let aliases: BTreeMap<String, RegionCode> = serde_json::from_str(
            r#"{"Colorado": "CO", "Wyoming": "WY", "District of Columbia": "DC"}"#,
        )
        .unwrap();
        OverrideTables::from_parts(overrides, aliases)
    }

    #[test]
    fn lookup_paths_work() {
        let tables = sample_tables();
        assert!(tables.is_disabled("Nowhere, USA"));
        assert!(!tables.is_disabled("Denver, CO"));
        assert_eq!(
            tables.remapped("The Mile High City"),
            Some(&RegionCode::new("CO"))
        );
        assert_eq!(tables.alias("Wyoming"), Some(&RegionCode::new("WY")));
        assert_eq!(tables.alias("Colorado Springs"), None);
    }

    #[test]
    fn code_universe_derives_from_aliases() {
        let tables = sample_tables();
        assert!(tables.is_known_code(&RegionCode::new("CO")));
        assert!(tables.is_known_code(&RegionCode::new("DC")));
        assert!(!tables.is_known_code(&RegionCode::new("ZZ")));
    }

    #[test]
    fn missing_table_file_is_io_error() {
        let missing = Path::new("/nonexistent/overrides.json");
        let result = OverrideTables::load(missing, missing);
        assert!(matches!(result, Err(ResolveError::TableIo { .. })));
    }
}
