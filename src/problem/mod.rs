//! Problem kinds and their walkthroughs
//!
//! A [`ProblemSpec`] is what the caller asks for: a kind, some operands and
//! optional flags. [`Problem::validate`] checks it once and either produces
//! a typed [`Problem`] or an [`InvalidProblemError`]; invalid input is never
//! patched up with defaults. A valid problem then builds its
//! [`Walkthrough`]: the phase timeline plus the strategy that computes the
//! derived values along it.

pub mod division;
pub mod factoring;
pub mod fraction;
pub mod limit;
pub mod place_value;
pub mod tangent;

use std::fmt;
use std::num::NonZeroU32;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::derive::DerivedStrategy;
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::phase::Timeline;

pub use division::DivisionProblem;
pub use factoring::FactoringProblem;
pub use fraction::{FractionOp, FractionProblem};
pub use limit::LimitProblem;
pub use place_value::PlaceValueProblem;
pub use tangent::TangentProblem;

/// Ticks every walkthrough spends on its opening phase.
pub const SETUP_TICKS: u64 = 10;

// ============================================================================
// Kinds and parameters
// ============================================================================

/// Supported problem kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    /// Place value of each digit of a whole number.
    PlaceValue,
    /// Sum of two fractions.
    FractionAdd,
    /// Difference of two fractions.
    FractionSubtract,
    /// Quotient of two fractions.
    FractionDivide,
    /// Whole-number division by dealing items into groups.
    Division,
    /// Factoring a quadratic over the integers.
    Factoring,
    /// Removable-discontinuity limit.
    Limit,
    /// Tangent slope as the limit of secant slopes.
    Tangent,
}

impl ProblemKind {
    /// All kinds, in listing order.
    pub const ALL: [Self; 8] = [
        Self::PlaceValue,
        Self::FractionAdd,
        Self::FractionSubtract,
        Self::FractionDivide,
        Self::Division,
        Self::Factoring,
        Self::Limit,
        Self::Tangent,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlaceValue => "place-value",
            Self::FractionAdd => "fraction-add",
            Self::FractionSubtract => "fraction-subtract",
            Self::FractionDivide => "fraction-divide",
            Self::Division => "division",
            Self::Factoring => "factoring",
            Self::Limit => "limit",
            Self::Tangent => "tangent",
        }
    }

    /// Names of the operands, in order.
    #[must_use]
    pub const fn operand_names(self) -> &'static [&'static str] {
        match self {
            Self::PlaceValue => &["number"],
            Self::FractionAdd | Self::FractionSubtract | Self::FractionDivide => &[
                "first numerator",
                "first denominator",
                "second numerator",
                "second denominator",
            ],
            Self::Division => &["dividend", "divisor"],
            Self::Factoring => &["a", "b", "c"],
            Self::Limit => &["point"],
            Self::Tangent => &["a", "b", "c", "x0"],
        }
    }

    /// Flags this kind understands.
    #[must_use]
    pub const fn flags(self) -> &'static [FlagSpec] {
        match self {
            Self::PlaceValue => place_value::FLAGS,
            Self::Factoring => factoring::FLAGS,
            Self::Limit => limit::FLAGS,
            Self::FractionAdd
            | Self::FractionSubtract
            | Self::FractionDivide
            | Self::Division
            | Self::Tangent => &[],
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PlaceValue => "Reveal each digit with its place value, then the expanded form",
            Self::FractionAdd => "Add two fractions via the least common denominator",
            Self::FractionSubtract => "Subtract two fractions via the least common denominator",
            Self::FractionDivide => "Divide fractions by multiplying by the reciprocal",
            Self::Division => "Deal items round-robin into equal groups",
            Self::Factoring => "Search factor pairs of ac that sum to b",
            Self::Limit => "Approach a removable discontinuity from either side",
            Self::Tangent => "Shrink a secant line until it becomes the tangent",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flag value as written in a walkthrough file or on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// `true` / `false`
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Anything else
    Text(String),
}

impl FlagValue {
    /// Interprets command-line text: booleans and integers first, then text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => raw
                .parse::<i64>()
                .map_or_else(|_| Self::Text(raw.to_owned()), Self::Int),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Accepted values of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `true` or `false`
    Bool,
    /// One of a fixed set of words
    Choice(&'static [&'static str]),
}

/// Static description of one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    /// Flag name
    pub name: &'static str,
    /// Accepted values
    pub kind: FlagKind,
    /// Value used when the flag is absent
    pub default: &'static str,
    /// What the flag changes
    pub description: &'static str,
}

/// Operands and flags of a problem. Immutable once validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemParameters {
    /// Numeric operands, meaning depends on the kind
    #[serde(default)]
    pub operands: Vec<f64>,
    /// Variant flags
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub flags: IndexMap<String, FlagValue>,
}

impl ProblemParameters {
    /// Parameters with operands only.
    #[must_use]
    pub fn new(operands: Vec<f64>) -> Self {
        Self {
            operands,
            flags: IndexMap::new(),
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    fn bool_flag(&self, name: &str, default: bool) -> Result<bool, InvalidProblemError> {
        match self.flags.get(name) {
            None => Ok(default),
            Some(FlagValue::Bool(v)) => Ok(*v),
            Some(other) => Err(InvalidProblemError::InvalidFlag {
                flag: name.to_owned(),
                value: other.to_string(),
                expected: "true or false",
            }),
        }
    }

    fn choice_flag(
        &self,
        name: &str,
        choices: &'static [&'static str],
        expected: &'static str,
        default: &'static str,
    ) -> Result<&'static str, InvalidProblemError> {
        let Some(value) = self.flags.get(name) else {
            return Ok(default);
        };
        let text = value.to_string();
        choices
            .iter()
            .copied()
            .find(|c| *c == text)
            .ok_or_else(|| InvalidProblemError::InvalidFlag {
                flag: name.to_owned(),
                value: text,
                expected,
            })
    }
}

/// What the caller asks to animate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Problem kind
    pub kind: ProblemKind,
    /// Operands and flags
    #[serde(flatten)]
    pub params: ProblemParameters,
}

impl ProblemSpec {
    /// Spec with operands only.
    #[must_use]
    pub fn new(kind: ProblemKind, operands: Vec<f64>) -> Self {
        Self {
            kind,
            params: ProblemParameters::new(operands),
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: FlagValue) -> Self {
        self.params = self.params.with_flag(name, value);
        self
    }
}

// ============================================================================
// Pacing
// ============================================================================

/// Multiplier applied to every phase duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pacing(NonZeroU32);

impl Pacing {
    /// Normal speed.
    pub const NORMAL: Self = Self(NonZeroU32::MIN);

    /// Wraps a multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroPacing`] for zero.
    pub const fn new(multiplier: u32) -> Result<Self, ConfigurationError> {
        match NonZeroU32::new(multiplier) {
            Some(m) => Ok(Self(m)),
            None => Err(ConfigurationError::ZeroPacing),
        }
    }

    /// The multiplier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Scales a base duration in ticks.
    #[must_use]
    pub fn ticks(self, base: u64) -> u64 {
        base.saturating_mul(u64::from(self.0.get()))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::NORMAL
    }
}

// ============================================================================
// Validated problems
// ============================================================================

/// A validated problem, ready to build a walkthrough.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    /// Place value
    PlaceValue(PlaceValueProblem),
    /// Fraction addition, subtraction or division
    Fraction(FractionProblem),
    /// Whole-number division
    Division(DivisionProblem),
    /// Quadratic factoring
    Factoring(FactoringProblem),
    /// Removable-discontinuity limit
    Limit(LimitProblem),
    /// Secant to tangent
    Tangent(TangentProblem),
}

/// Timeline plus the strategy computing values along it.
#[derive(Debug)]
pub struct Walkthrough {
    /// Phases and their thresholds
    pub timeline: Timeline,
    /// Derived-value computation
    pub strategy: Box<dyn DerivedStrategy>,
}

impl Problem {
    /// Checks operands and flags.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidProblemError`] when the operand count is wrong,
    /// an operand is not finite, not whole where it must be, out of range,
    /// or makes the mathematics undefined; or when a flag value is not
    /// accepted. Unknown flag names are ignored here and reported by the
    /// file validator.
    pub fn validate(spec: &ProblemSpec) -> Result<Self, InvalidProblemError> {
        let operands = expect_operands(spec.kind, &spec.params)?;
        let params = &spec.params;
        Ok(match spec.kind {
            ProblemKind::PlaceValue => {
                Self::PlaceValue(PlaceValueProblem::from_params(operands, params)?)
            }
            ProblemKind::FractionAdd => {
                Self::Fraction(FractionProblem::from_operands(FractionOp::Add, operands)?)
            }
            ProblemKind::FractionSubtract => Self::Fraction(FractionProblem::from_operands(
                FractionOp::Subtract,
                operands,
            )?),
            ProblemKind::FractionDivide => {
                Self::Fraction(FractionProblem::from_operands(FractionOp::Divide, operands)?)
            }
            ProblemKind::Division => Self::Division(DivisionProblem::from_operands(operands)?),
            ProblemKind::Factoring => {
                Self::Factoring(FactoringProblem::from_params(operands, params)?)
            }
            ProblemKind::Limit => Self::Limit(LimitProblem::from_params(operands, params)?),
            ProblemKind::Tangent => Self::Tangent(TangentProblem::from_operands(operands)?),
        })
    }

    /// Kind of this problem.
    #[must_use]
    pub const fn kind(&self) -> ProblemKind {
        match self {
            Self::PlaceValue(_) => ProblemKind::PlaceValue,
            Self::Fraction(p) => p.kind(),
            Self::Division(_) => ProblemKind::Division,
            Self::Factoring(_) => ProblemKind::Factoring,
            Self::Limit(_) => ProblemKind::Limit,
            Self::Tangent(_) => ProblemKind::Tangent,
        }
    }

    /// Builds the timeline and strategy at the given pacing.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the generated timeline violates
    /// its ordering rules.
    pub fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        match self {
            Self::PlaceValue(p) => p.walkthrough(pacing),
            Self::Fraction(p) => p.walkthrough(pacing),
            Self::Division(p) => p.walkthrough(pacing),
            Self::Factoring(p) => p.walkthrough(pacing),
            Self::Limit(p) => p.walkthrough(pacing),
            Self::Tangent(p) => p.walkthrough(pacing),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceValue(p) => write!(f, "{p}"),
            Self::Fraction(p) => write!(f, "{p}"),
            Self::Division(p) => write!(f, "{p}"),
            Self::Factoring(p) => write!(f, "{p}"),
            Self::Limit(p) => write!(f, "{p}"),
            Self::Tangent(p) => write!(f, "{p}"),
        }
    }
}

// ============================================================================
// Operand helpers
// ============================================================================

fn expect_operands(
    kind: ProblemKind,
    params: &ProblemParameters,
) -> Result<&[f64], InvalidProblemError> {
    let names = kind.operand_names();
    if params.operands.len() != names.len() {
        return Err(InvalidProblemError::OperandCount {
            kind,
            expected: names.len(),
            got: params.operands.len(),
        });
    }
    for (value, name) in params.operands.iter().zip(names) {
        if !value.is_finite() {
            return Err(InvalidProblemError::NonFinite { operand: name });
        }
    }
    Ok(&params.operands)
}

/// Checks that `value` is a whole number within `min..=max`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole(
    operand: &'static str,
    value: f64,
    min: i64,
    max: i64,
) -> Result<i64, InvalidProblemError> {
    if !value.is_finite() {
        return Err(InvalidProblemError::NonFinite { operand });
    }
    if value.fract() != 0.0 {
        return Err(InvalidProblemError::NotInteger { operand, value });
    }
    if value < min as f64 || value > max as f64 {
        return Err(InvalidProblemError::OutOfRange {
            operand,
            value,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(value as i64)
}

/// Checks that `value` lies within `-limit..=limit`.
fn bounded(operand: &'static str, value: f64, limit: f64) -> Result<f64, InvalidProblemError> {
    if !value.is_finite() {
        return Err(InvalidProblemError::NonFinite { operand });
    }
    if value.abs() > limit {
        return Err(InvalidProblemError::OutOfRange {
            operand,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(value)
}

/// Formats `coef·x + constant`, dropping unit coefficients and zero terms.
pub(crate) fn linear(coef: i64, constant: i64) -> String {
    let mut out = match coef {
        0 => String::new(),
        1 => "x".to_owned(),
        -1 => "-x".to_owned(),
        c => format!("{c}x"),
    };
    if constant != 0 || out.is_empty() {
        if out.is_empty() {
            out = constant.to_string();
        } else if constant < 0 {
            out.push_str(&format!(" - {}", constant.unsigned_abs()));
        } else {
            out.push_str(&format!(" + {constant}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_kebab_case() {
        let json = serde_json::to_string(&ProblemKind::FractionAdd).unwrap();
        assert_eq!(json, "\"fraction-add\"");
        for kind in ProblemKind::ALL {
            let back: ProblemKind =
                serde_json::from_str(&format!("\"{}\"", kind.as_str())).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_flag_value_parse() {
        assert_eq!(FlagValue::parse("true"), FlagValue::Bool(true));
        assert_eq!(FlagValue::parse("-3"), FlagValue::Int(-3));
        assert_eq!(FlagValue::parse("left"), FlagValue::Text("left".into()));
    }

    #[test]
    fn test_operand_count_checked() {
        let spec = ProblemSpec::new(ProblemKind::Division, vec![13.0]);
        assert_eq!(
            Problem::validate(&spec),
            Err(InvalidProblemError::OperandCount {
                kind: ProblemKind::Division,
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_non_finite_operand_rejected() {
        let spec = ProblemSpec::new(ProblemKind::Limit, vec![f64::NAN]);
        assert_eq!(
            Problem::validate(&spec),
            Err(InvalidProblemError::NonFinite { operand: "point" })
        );
    }

    #[test]
    fn test_whole_rejects_fraction_and_range() {
        assert!(matches!(
            whole("n", 2.5, 0, 10),
            Err(InvalidProblemError::NotInteger { .. })
        ));
        assert!(matches!(
            whole("n", 11.0, 0, 10),
            Err(InvalidProblemError::OutOfRange { .. })
        ));
        assert_eq!(whole("n", -0.0, 0, 10), Ok(0));
    }

    #[test]
    fn test_pacing() {
        assert_eq!(Pacing::new(0), Err(ConfigurationError::ZeroPacing));
        let pacing = Pacing::new(3).unwrap();
        assert_eq!(pacing.ticks(10), 30);
        assert_eq!(Pacing::default().ticks(7), 7);
    }

    #[test]
    fn test_spec_deserializes_flat() {
        let yaml = "kind: limit\noperands: [1]\nflags:\n  side: left\n";
        let spec: ProblemSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.kind, ProblemKind::Limit);
        assert_eq!(spec.params.operands, vec![1.0]);
        assert_eq!(
            spec.params.flags.get("side"),
            Some(&FlagValue::Text("left".into()))
        );
    }

    #[test]
    fn test_linear_formatting() {
        assert_eq!(linear(3, 2), "3x + 2");
        assert_eq!(linear(1, -4), "x - 4");
        assert_eq!(linear(-1, 0), "-x");
        assert_eq!(linear(0, 5), "5");
        assert_eq!(linear(0, 0), "0");
    }

    #[test]
    fn test_every_kind_has_a_description_and_operands() {
        for kind in ProblemKind::ALL {
            assert!(!kind.description().is_empty());
            assert!(!kind.operand_names().is_empty());
        }
    }
}
