//! Region resolution: override tables first, names second, geometry last.
//!
//! The pipeline mirrors how much signal each source carries: an explicit
//! disable or remap entry beats any inference; a recognizable name beats
//! geometry; the geospatial overlap decides only when nothing textual did.
//! Genuinely ambiguous boxes stay unresolved — reported, never guessed.

use legaltime_boundaries::{BoundaryStore, OverlapParams, disambiguate};
use legaltime_types::{Decision, EventRecord, QueryBox, RegionCode};
use tracing::debug;

use crate::error::ResolveError;
use crate::overrides::OverrideTables;

/// The capital district resolves like a state during geometry matching but
/// is not a state for reporting purposes; it is filtered after resolution.
const EXCLUDED_CAPITAL_CODE: &str = "DC";

/// Resolves events to administrative region codes.
#[derive(Debug)]
pub struct RegionResolver<'a> {
    store: &'a BoundaryStore,
    tables: &'a OverrideTables,
}

impl<'a> RegionResolver<'a> {
    /// Build a resolver over loaded reference data and override tables.
    pub const fn new(store: &'a BoundaryStore, tables: &'a OverrideTables) -> Self {
        Self { store, tables }
    }

    /// Resolve one event to a region code, or `None` when the event is
    /// disabled, unmatched, or ambiguous (the explicit unresolved marker).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownRegion`] when a stage produces a code
    /// outside the known-code universe — corrupt tables or reference data.
    pub fn resolve(&self, event: &EventRecord) -> Result<Option<RegionCode>, ResolveError> {
        let resolved = self.resolve_stages(event.name.as_deref(), &event.query)?;

        let Some(code) = resolved else {
            return Ok(None);
        };
        if code.as_str() == EXCLUDED_CAPITAL_CODE {
            return Ok(None);
        }
        if !self.tables.is_known_code(&code) {
            return Err(ResolveError::UnknownRegion { code });
        }
        Ok(Some(code))
    }

    /// Run the stages in precedence order; first hit wins.
    fn resolve_stages(
        &self,
        name: Option<&str>,
        query: &QueryBox,
    ) -> Result<Option<RegionCode>, ResolveError> {
        if let Some(name) = name {
            if self.tables.is_disabled(name) {
                return Ok(None);
            }
            if let Some(code) = self.tables.remapped(name) {
                return Ok(Some(code.clone()));
            }
            if let Some(code) = self.tables.alias(name) {
                return Ok(Some(code.clone()));
            }
            if let Some(code) = self.city_suffix_match(name) {
                return Ok(Some(code));
            }
        }
        self.resolve_geospatial(query)
    }

    /// Match names shaped like `"<city>, XX"` where `XX` is a known region
    /// code. A two-letter suffix that is not on the code list is a false
    /// positive and falls through.
    fn city_suffix_match(&self, name: &str) -> Option<RegionCode> {
        let (city, suffix) = name.rsplit_once(", ")?;
        if suffix.len() != 2 || !suffix.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        if city.is_empty()
            || !city
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '\'' || c == ' ' || c == '-')
        {
            return None;
        }
        let code = RegionCode::new(suffix);
        self.tables.is_known_code(&code).then_some(code)
    }

    /// Geospatial fallback: only a decisive overlap resolves; `Ranked` and
    /// `NoMatch` both stay unresolved.
    fn resolve_geospatial(&self, query: &QueryBox) -> Result<Option<RegionCode>, ResolveError> {
        match disambiguate(query, self.store.regions(), &OverlapParams::regions())? {
            Decision::Unique(label) => Ok(Some(RegionCode::new(label))),
            Decision::Ranked(candidates) => {
                debug!(
                    top = candidates.first().map(|c| c.label.as_str()),
                    count = candidates.len(),
                    "region overlap ambiguous, left unresolved"
                );
                Ok(None)
            }
            Decision::NoMatch => Ok(None),
        }
    }
}
