//! `mathwalk version`

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::problem::ProblemKind;

/// Print version information, plus the supported problem kinds in JSON.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
        }
        OutputFormat::Json => {
            let kinds: Vec<&str> = ProblemKind::ALL.iter().map(|k| k.as_str()).collect();
            println!(
                "{}",
                json!({ "name": name, "version": version, "kinds": kinds })
            );
        }
    }
}
