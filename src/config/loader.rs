//! Walkthrough file loader
//!
//! Loading pipeline:
//! 1. Size check and read
//! 2. UTF-8 BOM strip
//! 3. Environment variable expansion (pre-parse, on raw text)
//! 4. YAML parsing
//! 5. Deserialization to [`WalkthroughConfig`]
//! 6. Validation
//! 7. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_yaml::Value;

use crate::config::schema::WalkthroughConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Limits that keep a walkthrough file within sensible bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLimits {
    /// Maximum file size in bytes.
    pub max_file_size: usize,

    /// Maximum number of operands.
    pub max_operands: usize,

    /// Longest allowed tick period.
    pub max_tick_period: Duration,

    /// Largest allowed pacing multiplier.
    pub max_pacing: u32,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_file_size: env_or("MATHWALK_MAX_CONFIG_SIZE", 1024 * 1024),
            max_operands: env_or("MATHWALK_MAX_OPERANDS", 16),
            max_tick_period: Duration::from_millis(env_or("MATHWALK_MAX_TICK_PERIOD_MS", 10_000)),
            max_pacing: env_or("MATHWALK_MAX_PACING", 100),
        }
    }
}

/// Options for the loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size and value limits.
    pub limits: ConfigLimits,

    /// Treat validation warnings as errors.
    pub strict: bool,
}

/// Result of loading a walkthrough file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated walkthrough.
    pub config: Arc<WalkthroughConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Where the warning applies.
    pub location: Option<String>,
}

/// Walkthrough file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default limits, not strict.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads a walkthrough file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or is too large
    /// - A required environment variable is unset
    /// - YAML parsing or deserialization fails
    /// - Validation finds errors (or warnings, in strict mode)
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let max = self.options.limits.max_file_size;
        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > max {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {max} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_from_str(&raw, path)
    }

    /// Loads a walkthrough from text. `origin` is only used in messages.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file checks.
    pub fn load_from_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new(origin);
        let substituted = env_sub.substitute(raw)?;
        warnings.extend(env_sub.warnings);

        let root: Value = serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: "walkthrough file is empty".to_string(),
            });
        }

        let config: WalkthroughConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: format!("failed to deserialize walkthrough: {e}"),
            })?;

        let mut result = Validator::new().validate(&config, &self.options.limits);
        if self.options.strict {
            result.promote_warnings();
        }
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }

        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text before parsing so substituted numbers and booleans
/// keep their YAML types.
struct EnvSubstitution {
    origin: PathBuf,
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    fn new(origin: &Path) -> Self {
        Self {
            origin: origin.to_path_buf(),
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw_yaml: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let reference = self.parse_reference(&mut chars)?;
                    self.expand(reference, &mut result)?;
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn expand(&mut self, reference: VarRef, out: &mut String) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(&reference.name) {
            out.push_str(&value);
            return Ok(());
        }
        match reference.fallback {
            Fallback::Default(default) => out.push_str(&default),
            Fallback::Required(message) => {
                return Err(ConfigError::EnvVarNotSet {
                    var: reference.name,
                    location: message,
                });
            }
            Fallback::Empty => self.warnings.push(LoadWarning {
                message: format!(
                    "environment variable '{}' is not set, using empty string",
                    reference.name
                ),
                location: Some(self.origin.display().to_string()),
            }),
        }
        Ok(())
    }

    /// Parses the inside of `${...}`; the opening brace is already consumed.
    fn parse_reference(
        &self,
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    ) -> Result<VarRef, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next() {
            match c {
                '}' => {
                    return Ok(VarRef {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let default = self.read_until_close(chars)?;
                    return Ok(VarRef {
                        name,
                        fallback: Fallback::Default(default),
                    });
                }
                ':' if chars.peek() == Some(&'?') => {
                    chars.next();
                    let message = self.read_until_close(chars)?;
                    return Ok(VarRef {
                        name,
                        fallback: Fallback::Required(message),
                    });
                }
                _ => name.push(c),
            }
        }

        Err(self.unclosed(&name))
    }

    /// Reads up to the matching `}`, allowing nested braces.
    fn read_until_close(
        &self,
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1;

        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }

        Err(self.unclosed(&value))
    }

    fn unclosed(&self, partial: &str) -> ConfigError {
        ConfigError::ParseError {
            path: self.origin.clone(),
            line: None,
            message: format!("unclosed environment variable reference: ${{{partial}"),
        }
    }
}

/// A parsed `${...}` reference.
struct VarRef {
    name: String,
    fallback: Fallback,
}

/// What to do when the variable is unset.
enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

/// Parses an environment variable, falling back to `default`.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;

    fn substitute(raw: &str) -> (Result<String, ConfigError>, Vec<LoadWarning>) {
        let mut sub = EnvSubstitution::new(Path::new("test.yaml"));
        let result = sub.substitute(raw);
        (result, sub.warnings)
    }

    #[test]
    fn test_env_substitution_simple() {
        // PATH is always set
        let (result, _) = substitute("path: ${PATH}");
        let result = result.unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
    }

    #[test]
    fn test_env_substitution_default() {
        let (result, warnings) = substitute("pacing: ${MATHWALK_TEST_UNSET_PACING_XYZ:-3}");
        assert_eq!(result.unwrap(), "pacing: 3");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_env_substitution_nested_braces_in_default() {
        let (result, _) = substitute("x: ${MATHWALK_TEST_UNSET_XYZ:-{a}}");
        assert_eq!(result.unwrap(), "x: {a}");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let (result, _) = substitute("value: ${MATHWALK_TEST_REQUIRED_XYZ:?must be set}");
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "MATHWALK_TEST_REQUIRED_XYZ");
                assert_eq!(location, "must be set");
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let (result, _) = substitute("price: $$100 and $5");
        assert_eq!(result.unwrap(), "price: $100 and $5");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let (result, warnings) = substitute("value: ${MATHWALK_TEST_WARN_XYZ}");
        assert_eq!(result.unwrap(), "value: ");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("MATHWALK_TEST_WARN_XYZ"));
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let (result, _) = substitute("value: ${OOPS");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_from_str_strips_bom() {
        let raw = "\u{feff}problem:\n  kind: division\n  operands: [13, 4]\n";
        let loaded = ConfigLoader::with_defaults()
            .load_from_str(raw, Path::new("bom.yaml"))
            .unwrap();
        assert_eq!(loaded.config.problem.kind, ProblemKind::Division);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = ConfigLoader::with_defaults()
            .load_from_str("# nothing here\n", Path::new("empty.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = ConfigLoader::with_defaults()
            .load_from_str("problem:\n  kind: [unclosed\n", Path::new("bad.yaml"))
            .unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_promotes_warnings() {
        let raw = "problem:\n  kind: division\n  operands: [13, 0]\n";
        let lenient = ConfigLoader::with_defaults()
            .load_from_str(raw, Path::new("zero.yaml"))
            .unwrap();
        assert_eq!(lenient.warnings.len(), 1);

        let strict = ConfigLoader::new(LoaderOptions {
            strict: true,
            ..LoaderOptions::default()
        });
        let err = strict.load_from_str(raw, Path::new("zero.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_config_limits_default() {
        let limits = ConfigLimits::default();
        assert_eq!(limits.max_operands, 16);
        assert_eq!(limits.max_pacing, 100);
    }
}
