//! Provides the high-level API for comparing two API surfaces.

use crate::compat::{CheckEngine, CheckReport};
use crate::error::{Error, Result};
use crate::generate_fingerprint;
use crate::model::{ElementId, ElementRef, Universe};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The result of a compatibility comparison between two API surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Compatibility {
    /// No differences were found.
    Green,
    /// Differences were found, none of them breaking.
    Yellow,
    /// At least one difference is breaking in some dimension.
    Red,
}

impl Compatibility {
    pub fn of(report: &CheckReport<'_>) -> Self {
        if report.has_breaking_changes {
            Compatibility::Red
        } else if report.differences.is_empty() {
            Compatibility::Green
        } else {
            Compatibility::Yellow
        }
    }
}

/// One declaration tree together with its fingerprint.
#[derive(Debug)]
pub struct ApiSurface {
    pub universe: Universe,
    /// The semantic fingerprint, see [`generate_fingerprint`].
    pub fingerprint: String,
}

impl ApiSurface {
    /// Loads and validates a universe from JSON and fingerprints it.
    pub fn try_from_json(json: &str) -> Result<Self> {
        let universe = Universe::from_json_str(json)?;
        Ok(Self::from_universe(universe))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::try_from_json(&content)
    }

    pub fn from_universe(universe: Universe) -> Self {
        let fingerprint = generate_fingerprint(&universe);
        Self { universe, fingerprint }
    }

    /// Whether both surfaces declare the same API, regardless of declaration
    /// order.
    pub fn is_identical_to(&self, other: &ApiSurface) -> bool {
        self.fingerprint == other.fingerprint
    }
}

/// An old element and its counterpart in the new universe, if it has one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPair {
    pub old: ElementId,
    #[serde(default)]
    pub new: Option<ElementId>,
}

/// Two universes and the element pairs to compare, as produced by the
/// declaration tree walker.
#[derive(Debug, Serialize, Deserialize)]
pub struct Comparison {
    pub old: Universe,
    pub new: Universe,
    #[serde(default)]
    pub pairs: Vec<ElementPair>,
}

impl Comparison {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let comparison: Comparison = serde_json::from_str(json)?;
        comparison.validate()?;
        Ok(comparison)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        self.old.validate()?;
        self.new.validate()?;

        for (i, pair) in self.pairs.iter().enumerate() {
            if pair.old.0 >= self.old.element_count() {
                return Err(Error::Malformed(format!(
                    "pair #{i} refers to old element #{} which does not exist",
                    pair.old.0
                )));
            }
            match pair.new {
                Some(new) if new.0 >= self.new.element_count() => {
                    return Err(Error::Malformed(format!(
                        "pair #{i} refers to new element #{} which does not exist",
                        new.0
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Element handles for every pair
    pub fn element_pairs(&self) -> impl Iterator<Item = (ElementRef<'_>, Option<ElementRef<'_>>)> {
        self.pairs
            .iter()
            .map(|pair| (self.old.element_ref(pair.old), pair.new.map(|id| self.new.element_ref(id))))
    }

    /// Runs the engine over every pair.
    pub fn check(&self, engine: &CheckEngine) -> CheckReport<'_> {
        engine.check_pairs(self.element_pairs())
    }

    /// Runs the engine and classifies the outcome.
    pub fn compare_with(&self, engine: &CheckEngine) -> (Compatibility, CheckReport<'_>) {
        let report = self.check(engine);
        (Compatibility::of(&report), report)
    }
}
