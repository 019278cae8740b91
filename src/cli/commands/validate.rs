//! `mathwalk validate`
//!
//! Loads each file through the full loader pipeline and reports every
//! result before failing, so one bad file does not hide the others.

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, MathWalkError};

/// Validate walkthrough files.
///
/// # Errors
///
/// Returns the first file's error if any file fails to load.
pub fn run(args: &ValidateArgs) -> Result<(), MathWalkError> {
    let loader = ConfigLoader::new(LoaderOptions {
        strict: args.strict,
        ..LoaderOptions::default()
    });

    let mut first_error = None;
    let mut report = Vec::with_capacity(args.files.len());

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating walkthrough");

        match loader.load(path) {
            Ok(result) => {
                for warning in &result.warnings {
                    tracing::warn!(
                        location = warning.location.as_deref().unwrap_or("<unknown>"),
                        "{}",
                        warning.message
                    );
                }
                let warnings: Vec<String> =
                    result.warnings.iter().map(|w| w.message.clone()).collect();
                if args.format == OutputFormat::Human {
                    println!("✓ {}", path.display());
                    for warning in &warnings {
                        println!("    warning: {warning}");
                    }
                }
                report.push(json!({
                    "file": path.display().to_string(),
                    "valid": true,
                    "kind": result.config.problem.kind,
                    "warnings": warnings,
                }));
            }
            Err(e) => {
                let issues: Vec<String> = match &e {
                    ConfigError::ValidationError { errors, .. } => {
                        errors.iter().map(ToString::to_string).collect()
                    }
                    _ => Vec::new(),
                };
                if args.format == OutputFormat::Human {
                    println!("✗ {}: {e}", path.display());
                    for issue in &issues {
                        println!("    {issue}");
                    }
                }
                report.push(json!({
                    "file": path.display().to_string(),
                    "valid": false,
                    "error": e.to_string(),
                    "issues": issues,
                }));
                first_error.get_or_insert(e);
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
