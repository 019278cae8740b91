//! `mathwalk list`

use serde_json::{Value, json};

use crate::cli::args::{ListArgs, ListCategory, OutputFormat};
use crate::error::MathWalkError;
use crate::presets::list_presets;
use crate::problem::ProblemKind;

/// List problem kinds, presets or both.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn run(args: &ListArgs) -> Result<(), MathWalkError> {
    let show_kinds = matches!(args.category, ListCategory::Kinds | ListCategory::All);
    let show_presets = matches!(args.category, ListCategory::Presets | ListCategory::All);

    match args.format {
        OutputFormat::Human => {
            if show_kinds {
                print_kinds(args.kind);
            }
            if show_kinds && show_presets {
                println!();
            }
            if show_presets {
                print_presets(args.kind);
            }
        }
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            if show_kinds {
                out.insert("kinds".into(), kinds_json(args.kind));
            }
            if show_presets {
                out.insert("presets".into(), presets_json(args.kind));
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
        }
    }
    Ok(())
}

fn selected_kinds(filter: Option<ProblemKind>) -> impl Iterator<Item = ProblemKind> {
    ProblemKind::ALL
        .into_iter()
        .filter(move |k| filter.is_none_or(|f| f == *k))
}

fn print_kinds(filter: Option<ProblemKind>) {
    println!("Problem kinds:");
    for kind in selected_kinds(filter) {
        println!("  {:<18} {}", kind.as_str(), kind.description());
        println!("  {:<18} operands: {}", "", kind.operand_names().join(", "));
        for flag in kind.flags() {
            println!(
                "  {:<18} --flag {}=… (default {}) {}",
                "", flag.name, flag.default, flag.description
            );
        }
    }
}

fn print_presets(filter: Option<ProblemKind>) {
    println!("Presets:");
    for preset in list_presets(filter) {
        println!(
            "  {:<20} {:<18} {}",
            preset.name,
            preset.kind.as_str(),
            preset.description
        );
    }
}

fn kinds_json(filter: Option<ProblemKind>) -> Value {
    selected_kinds(filter)
        .map(|kind| {
            let flags: Vec<Value> = kind
                .flags()
                .iter()
                .map(|f| json!({ "name": f.name, "default": f.default, "description": f.description }))
                .collect();
            json!({
                "kind": kind,
                "description": kind.description(),
                "operands": kind.operand_names(),
                "flags": flags,
            })
        })
        .collect()
}

fn presets_json(filter: Option<ProblemKind>) -> Value {
    list_presets(filter)
        .into_iter()
        .map(|p| json!({ "name": p.name, "kind": p.kind, "description": p.description }))
        .collect()
}
