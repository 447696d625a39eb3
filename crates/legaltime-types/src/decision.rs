//! Disambiguation outcomes: ranked candidates and the three-way decision.

use serde::{Deserialize, Serialize};

/// One labeled region considered as a match for a query box, with its share
/// of the total intersection area.
///
/// Over a returned candidate set the shares sum to 100 within rounding
/// tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Region code or timezone identifier, depending on the dataset queried.
    pub label: String,
    /// Percentage of the total intersection area this region contributes.
    pub share: f64,
}

impl Candidate {
    /// Build a candidate from a label and its overlap share.
    pub fn new(label: impl Into<String>, share: f64) -> Self {
        Self {
            label: label.into(),
            share,
        }
    }
}

/// Outcome of area-weighted disambiguation for one query box.
///
/// `Ranked` and `NoMatch` are first-class results, not errors: callers must
/// handle genuine ambiguity explicitly rather than treating it as a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// Exactly one region matched, or one region's share cleared the
    /// decisiveness threshold.
    Unique(String),
    /// Multiple regions matched and none was decisive; candidates are
    /// ordered by descending share.
    Ranked(Vec<Candidate>),
    /// Nothing matched (even after the retry budget), or the query
    /// degenerately matched the entire dataset.
    NoMatch,
}

impl Decision {
    /// The top-ranked label, if any region matched at all.
    pub fn top_label(&self) -> Option<&str> {
        match self {
            Self::Unique(label) => Some(label),
            Self::Ranked(candidates) => candidates.first().map(|c| c.label.as_str()),
            Self::NoMatch => None,
        }
    }
}
