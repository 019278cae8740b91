//! CLI argument definitions
//!
//! All Clap derive structs for `mathwalk` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;
use crate::problem::{FlagValue, ProblemKind};

// ============================================================================
// Root CLI
// ============================================================================

/// Step-by-step animated walkthroughs of math problems.
#[derive(Parser, Debug)]
#[command(name = "mathwalk", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "MATHWALK_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "MATHWALK_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a walkthrough.
    Run(RunArgs),

    /// Validate walkthrough files without playing them.
    Validate(ValidateArgs),

    /// List problem kinds and built-in presets.
    List(ListArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
pub struct RunArgs {
    /// Path to a walkthrough file.
    #[arg(short, long, group = "source", env = "MATHWALK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name of a built-in preset.
    #[arg(short, long, group = "source")]
    pub preset: Option<String>,

    /// Problem kind, given directly with `--operands`.
    #[arg(short, long, group = "source", requires = "operands")]
    pub kind: Option<ProblemKind>,

    /// Operands for `--kind`, comma separated or repeated.
    #[arg(
        long,
        requires = "kind",
        value_delimiter = ',',
        num_args = 1..,
        allow_negative_numbers = true
    )]
    pub operands: Vec<f64>,

    /// Problem flag as `name=value`; repeatable.
    #[arg(long = "flag", value_parser = parse_flag)]
    pub flags: Vec<(String, FlagValue)>,

    /// Period between ticks, e.g. `50ms`.
    #[arg(long, value_parser = humantime::parse_duration, env = "MATHWALK_TICK_PERIOD")]
    pub tick_period: Option<Duration>,

    /// Phase duration multiplier.
    #[arg(long)]
    pub pacing: Option<u32>,

    /// Stop after this many ticks.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Compute every tick immediately instead of in real time.
    #[arg(long)]
    pub instant: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write JSONL session events to this file (`-` for stderr).
    #[arg(long, env = "MATHWALK_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "MATHWALK_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Do not print sound cues.
    #[arg(long)]
    pub mute: bool,

    /// Treat walkthrough file warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Parses `name=value` into a flag.
///
/// # Errors
///
/// Returns a message when `=` is missing or the name is empty.
pub fn parse_flag(raw: &str) -> Result<(String, FlagValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("flag name missing in '{raw}'"));
    }
    Ok((name.to_owned(), FlagValue::parse(value.trim())))
}

// ============================================================================
// Validate / List
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Walkthrough files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// What to list.
    #[arg(default_value = "all")]
    pub category: ListCategory,

    /// Only presets of this kind.
    #[arg(long)]
    pub kind: Option<ProblemKind>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// What `list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListCategory {
    /// Problem kinds with their operands and flags.
    Kinds,
    /// Built-in presets.
    Presets,
    /// Both.
    #[default]
    All,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Run(run) => run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_run_with_config() {
        let args = run_args(&["mathwalk", "run", "--config", "walk.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("walk.yaml")));
        assert_eq!(args.format, OutputFormat::Human);
    }

    #[test]
    fn test_run_with_kind_and_operands() {
        let args = run_args(&[
            "mathwalk",
            "run",
            "--kind",
            "factoring",
            "--operands",
            "1,-5,6",
            "--flag",
            "show_roots=true",
        ]);
        assert_eq!(args.kind, Some(ProblemKind::Factoring));
        assert_eq!(args.operands, vec![1.0, -5.0, 6.0]);
        assert_eq!(
            args.flags,
            vec![("show_roots".to_owned(), FlagValue::Bool(true))]
        );
    }

    #[test]
    fn test_run_requires_a_source() {
        assert!(Cli::try_parse_from(["mathwalk", "run"]).is_err());
    }

    #[test]
    fn test_sources_mutually_exclusive() {
        let cli = Cli::try_parse_from([
            "mathwalk",
            "run",
            "--config",
            "c.yaml",
            "--preset",
            "quarters",
        ]);
        assert!(cli.is_err(), "expected mutual exclusion error");
    }

    #[test]
    fn test_kind_requires_operands() {
        assert!(Cli::try_parse_from(["mathwalk", "run", "--kind", "limit"]).is_err());
    }

    #[test]
    fn test_tick_period_parses_humantime() {
        let args = run_args(&[
            "mathwalk",
            "run",
            "--preset",
            "quarters",
            "--tick-period",
            "250ms",
        ]);
        assert_eq!(args.tick_period, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(
            parse_flag("side=left"),
            Ok(("side".to_owned(), FlagValue::Text("left".to_owned())))
        );
        assert!(parse_flag("side").is_err());
        assert!(parse_flag("=left").is_err());
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["mathwalk", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["mathwalk", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_color_choices_parse() {
        for variant in ["auto", "always", "never"] {
            let cli = Cli::try_parse_from(["mathwalk", "--color", variant, "list"]);
            assert!(cli.is_ok(), "failed to parse color={variant}");
        }
    }

    #[test]
    fn test_list_default_category() {
        let cli = Cli::try_parse_from(["mathwalk", "list"]).unwrap();
        match cli.command {
            Commands::List(args) => assert_eq!(args.category, ListCategory::All),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
