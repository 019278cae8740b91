//! Built-in walkthroughs
//!
//! Curated walkthrough files embedded in the binary at compile time, so
//! `mathwalk run --preset halves-and-thirds` works with no files on disk.

use std::path::Path;
use std::sync::LazyLock;

use crate::config::{ConfigLoader, LoadResult, suggest};
use crate::error::ConfigError;
use crate::problem::ProblemKind;

// ============================================================================
// Types
// ============================================================================

/// A walkthrough embedded in the binary.
#[derive(Debug)]
pub struct Preset {
    /// Unique identifier (kebab-case, e.g. `halves-and-thirds`).
    pub name: &'static str,

    /// Problem kind, for filtering.
    pub kind: ProblemKind,

    /// Short description.
    pub description: &'static str,

    /// Raw YAML content.
    pub yaml: &'static str,
}

impl Preset {
    /// Parses and validates the embedded YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the embedded file does not load.
    pub fn load(&self, loader: &ConfigLoader) -> Result<LoadResult, ConfigError> {
        loader.load_from_str(self.yaml, Path::new(self.name))
    }
}

// ============================================================================
// Registry
// ============================================================================

static PRESETS: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    vec![
        Preset {
            name: "place-value",
            kind: ProblemKind::PlaceValue,
            description: "Digits of 3045 and its expanded form",
            yaml: include_str!("../../presets/place-value.yaml"),
        },
        Preset {
            name: "quarters",
            kind: ProblemKind::FractionAdd,
            description: "1/4 + 2/4, denominators already match",
            yaml: include_str!("../../presets/quarters.yaml"),
        },
        Preset {
            name: "halves-and-thirds",
            kind: ProblemKind::FractionAdd,
            description: "1/2 + 1/3 through the least common denominator",
            yaml: include_str!("../../presets/halves-and-thirds.yaml"),
        },
        Preset {
            name: "take-away-sixths",
            kind: ProblemKind::FractionSubtract,
            description: "5/6 - 1/3, simplified at the end",
            yaml: include_str!("../../presets/take-away-sixths.yaml"),
        },
        Preset {
            name: "flip-and-multiply",
            kind: ProblemKind::FractionDivide,
            description: "3/4 ÷ 1/2 by multiplying by the reciprocal",
            yaml: include_str!("../../presets/flip-and-multiply.yaml"),
        },
        Preset {
            name: "thirteen-by-four",
            kind: ProblemKind::Division,
            description: "Deal 13 items into 4 groups, one left over",
            yaml: include_str!("../../presets/thirteen-by-four.yaml"),
        },
        Preset {
            name: "factor-twelve",
            kind: ProblemKind::Factoring,
            description: "x² + 7x + 12, with its roots",
            yaml: include_str!("../../presets/factor-twelve.yaml"),
        },
        Preset {
            name: "prime-quadratic",
            kind: ProblemKind::Factoring,
            description: "x² + x + 1 has no integer factor pair",
            yaml: include_str!("../../presets/prime-quadratic.yaml"),
        },
        Preset {
            name: "hole-at-two",
            kind: ProblemKind::Limit,
            description: "(x² - 4)/(x - 2) approached from the left",
            yaml: include_str!("../../presets/hole-at-two.yaml"),
        },
        Preset {
            name: "secant-to-tangent",
            kind: ProblemKind::Tangent,
            description: "Slope of x² at x = 1 as secants shrink",
            yaml: include_str!("../../presets/secant-to-tangent.yaml"),
        },
    ]
});

// ============================================================================
// Public API
// ============================================================================

/// Looks up a preset by exact name.
#[must_use]
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Looks up a preset, suggesting the closest name when there is none.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] for an unknown name.
pub fn resolve_preset(name: &str) -> Result<&'static Preset, ConfigError> {
    find_preset(name).ok_or_else(|| ConfigError::UnknownPreset {
        name: name.to_owned(),
        suggestion: suggest(name, PRESETS.iter().map(|p| p.name)).map(str::to_owned),
    })
}

/// Lists presets, optionally only those of one kind.
#[must_use]
pub fn list_presets(kind: Option<ProblemKind>) -> Vec<&'static Preset> {
    PRESETS
        .iter()
        .filter(|p| kind.is_none_or(|k| p.kind == k))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
