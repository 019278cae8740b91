//! Error types for `mathwalk`
//!
//! Three families of failure exist:
//! - [`ConfigurationError`]: a walkthrough cannot be assembled (malformed
//!   timeline, zero tick period). Fatal, raised at construction.
//! - [`InvalidProblemError`]: the problem itself is mathematically undefined
//!   or out of range. Recoverable; the session shows an explanation instead
//!   of animating.
//! - [`ConfigError`]: a walkthrough file could not be loaded or validated.

use std::path::PathBuf;
use thiserror::Error;

use crate::phase::Phase;
use crate::problem::ProblemKind;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `mathwalk` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration file error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// The requested problem cannot be animated
    pub const INVALID_PROBLEM: i32 = 4;

    /// Engine configuration error (malformed timeline, zero tick period)
    pub const ENGINE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `mathwalk` operations.
///
/// Aggregates the domain errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum MathWalkError {
    /// Walkthrough file loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Engine could not be assembled
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Problem parameters are undefined or out of range
    #[error(transparent)]
    InvalidProblem(#[from] InvalidProblemError),

    /// Bad command-line usage not caught by the argument parser
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MathWalkError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Configuration(_) => ExitCode::ENGINE_ERROR,
            Self::InvalidProblem(_) => ExitCode::INVALID_PROBLEM,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Engine Configuration Errors
// ============================================================================

/// Errors raised while assembling a walkthrough engine.
///
/// These indicate a programming or configuration mistake, never a bad
/// problem: a timeline that violates its ordering rules, or playback
/// settings that would stall the clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Timeline has no entries
    #[error("timeline is empty")]
    EmptyTimeline,

    /// First timeline entry does not start at tick 0
    #[error("first phase '{phase}' starts at tick {starts_at}, expected 0")]
    FirstPhaseNotAtZero {
        /// The first phase
        phase: Phase,
        /// Its configured threshold
        starts_at: u64,
    },

    /// Thresholds are not strictly increasing
    #[error("phase '{phase}' starts at tick {starts_at}, not after the previous threshold {previous}")]
    NonIncreasingThreshold {
        /// Offending phase
        phase: Phase,
        /// Its threshold
        starts_at: u64,
        /// Threshold of the phase before it
        previous: u64,
    },

    /// Same phase listed twice
    #[error("phase '{0}' appears more than once in the timeline")]
    DuplicatePhase(Phase),

    /// Timeline does not end in the terminal phase
    #[error("timeline ends with '{last}' instead of the terminal phase")]
    MissingTerminal {
        /// Last phase of the timeline
        last: Phase,
    },

    /// Terminal phase appears before the end
    #[error("terminal phase appears at position {index}, before the end of the timeline")]
    EarlyTerminal {
        /// Position of the terminal phase
        index: usize,
    },

    /// Tick period of zero
    #[error("tick period must be greater than zero")]
    ZeroTickPeriod,

    /// Pacing multiplier of zero
    #[error("pacing must be at least 1")]
    ZeroPacing,
}

// ============================================================================
// Invalid Problem Errors
// ============================================================================

/// The problem cannot be animated because its parameters are undefined or
/// out of range.
///
/// Never replaced by default operands: the session surfaces the error and
/// stays still.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidProblemError {
    /// Wrong number of operands for the problem kind
    #[error("{kind} expects {expected} operand(s), got {got}")]
    OperandCount {
        /// Problem kind
        kind: ProblemKind,
        /// Required operand count
        expected: usize,
        /// Supplied operand count
        got: usize,
    },

    /// Operand is NaN or infinite
    #[error("{operand} is not a finite number")]
    NonFinite {
        /// Operand name
        operand: &'static str,
    },

    /// Operand must be a whole number
    #[error("{operand} must be a whole number, got {value}")]
    NotInteger {
        /// Operand name
        operand: &'static str,
        /// Supplied value
        value: f64,
    },

    /// Operand outside the supported range
    #[error("{operand} = {value} is outside the supported range {min}..={max}")]
    OutOfRange {
        /// Operand name
        operand: &'static str,
        /// Supplied value
        value: f64,
        /// Smallest accepted value
        min: f64,
        /// Largest accepted value
        max: f64,
    },

    /// A fraction has a zero denominator
    #[error("{operand} is zero; a fraction cannot have a zero denominator")]
    ZeroDenominator {
        /// Operand name
        operand: &'static str,
    },

    /// Division by zero
    #[error("cannot divide by zero")]
    DivisionByZero,

    /// Leading coefficient of a quadratic is zero
    #[error("leading coefficient is zero; the expression is not quadratic")]
    ZeroLeadingCoefficient,

    /// A flag value is not accepted
    #[error("flag '{flag}' has invalid value '{value}', expected {expected}")]
    InvalidFlag {
        /// Flag name
        flag: String,
        /// Supplied value
        value: String,
        /// Description of accepted values
        expected: &'static str,
    },
}

// ============================================================================
// Configuration File Errors
// ============================================================================

/// Walkthrough file loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the walkthrough file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Walkthrough validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the walkthrough file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in the file is not set
    #[error("environment variable '{var}' not set ({location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Message supplied with the `${VAR:?message}` reference
        location: String,
    },

    /// No built-in preset with this name
    #[error("unknown preset '{name}'{}", did_you_mean(.suggestion.as_deref()))]
    UnknownPreset {
        /// Requested name
        name: String,
        /// Closest known preset name
        suggestion: Option<String>,
    },
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found while validating a walkthrough file.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "playback.tick_period")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the walkthrough from being used
    Error,
    /// Worth reporting, does not block loading
    Warning,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `mathwalk` operations.
pub type Result<T> = std::result::Result<T, MathWalkError>;

// ============================================================================
// Tests
// ============================================================================
