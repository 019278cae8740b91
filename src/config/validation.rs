//! Walkthrough file validation.
//!
//! Runs on the deserialized [`WalkthroughConfig`] and collects every issue
//! instead of stopping at the first. A problem that cannot be animated is
//! only a warning here: the session still starts and shows its explanatory
//! panel. `--strict` promotes warnings to errors.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{Playback, WalkthroughConfig};
use crate::error::{Severity, ValidationIssue};
use crate::problem::{Pacing, Problem, ProblemSpec};

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.7;

// ============================================================================
// Public API
// ============================================================================

/// Result of validating a walkthrough file.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent loading.
    pub errors: Vec<ValidationIssue>,

    /// Issues worth reporting.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Moves every warning into the errors.
    pub fn promote_warnings(&mut self) {
        for mut issue in self.warnings.drain(..) {
            issue.severity = Severity::Error;
            self.errors.push(issue);
        }
    }
}

/// Walkthrough file validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a walkthrough file and returns every issue found.
    pub fn validate(
        &mut self,
        config: &WalkthroughConfig,
        limits: &ConfigLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_metadata(config);
        self.validate_playback(&config.playback, limits);
        self.validate_problem(&config.problem, limits);
        self.validate_cues(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    /// Validates playback settings alone, for values merged in after the
    /// file was loaded.
    pub fn validate_playback_only(
        &mut self,
        playback: &Playback,
        limits: &ConfigLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();
        self.validate_playback(playback, limits);
        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_metadata(&mut self, config: &WalkthroughConfig) {
        if let Some(name) = &config.name {
            if name.trim().is_empty() {
                self.add_error("name", "name cannot be empty when given");
            } else if name.len() > 64 {
                self.add_warning("name", "name is unusually long (> 64 characters)");
            }
        }
    }

    fn validate_playback(&mut self, playback: &Playback, limits: &ConfigLimits) {
        if playback.tick_period.is_zero() {
            self.add_error("playback.tick_period", "tick period must be greater than zero");
        } else if playback.tick_period > limits.max_tick_period {
            self.add_error(
                "playback.tick_period",
                &format!(
                    "tick period exceeds the limit of {}",
                    humantime::format_duration(limits.max_tick_period)
                ),
            );
        }

        if playback.pacing == 0 {
            self.add_error("playback.pacing", "pacing must be at least 1");
        } else if playback.pacing > limits.max_pacing {
            self.add_error(
                "playback.pacing",
                &format!("pacing exceeds the limit of {}", limits.max_pacing),
            );
        }

        if playback.max_ticks == Some(0) {
            self.add_error("playback.max_ticks", "max_ticks must be at least 1");
        }

        if playback.paused && !playback.show_solution {
            self.add_warning(
                "playback.paused",
                "paused has no visible effect while show_solution is false",
            );
        }
    }

    fn validate_problem(&mut self, problem: &ProblemSpec, limits: &ConfigLimits) {
        if problem.params.operands.len() > limits.max_operands {
            self.add_error(
                "problem.operands",
                &format!("more than {} operands", limits.max_operands),
            );
            return;
        }

        let known = problem.kind.flags();
        for name in problem.params.flags.keys() {
            if known.iter().any(|spec| spec.name == name.as_str()) {
                continue;
            }
            let path = format!("problem.flags.{name}");
            let message = match suggest(name, known.iter().map(|spec| spec.name)) {
                Some(suggestion) => format!(
                    "'{name}' is not a {} flag and is ignored (did you mean '{suggestion}'?)",
                    problem.kind
                ),
                None => format!("'{name}' is not a {} flag and is ignored", problem.kind),
            };
            self.add_warning(&path, &message);
        }

        if let Err(e) = Problem::validate(problem) {
            self.add_warning(
                "problem",
                &format!("problem cannot be animated and will show an explanation: {e}"),
            );
        }
    }

    /// Warns about cue overrides for phases the walkthrough never enters.
    fn validate_cues(&mut self, config: &WalkthroughConfig) {
        if config.cues.is_empty() {
            return;
        }
        let Ok(problem) = Problem::validate(&config.problem) else {
            return;
        };
        let pacing = Pacing::new(config.playback.pacing).unwrap_or_default();
        let Ok(walkthrough) = problem.walkthrough(pacing) else {
            return;
        };
        for phase in config.cues.keys() {
            if !walkthrough.timeline.contains(*phase) {
                self.add_warning(
                    &format!("cues.{phase}"),
                    &format!("phase '{phase}' never occurs in this walkthrough"),
                );
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

/// Closest candidate to `input` by Jaro-Winkler similarity, if close enough.
#[must_use]
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(input, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
