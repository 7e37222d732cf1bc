use anyhow::Result;
use std::io::Write;
use type_index::{ListOptions, NavigationEngine};

use crate::cli::ListArgs;
use crate::commands::write_json;

pub fn run(
    engine: &NavigationEngine,
    args: &ListArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let options = ListOptions {
        recurse: args.recurse,
        force: args.force,
    };
    let children = engine.list_children(&args.path, &options)?;

    if json {
        return write_json(out, &children);
    }

    for child in &children {
        if args.names {
            writeln!(out, "{}", child.name)?;
        } else {
            let kind = if child.is_container { "namespace" } else { "type" };
            writeln!(out, "{kind:<9} {}", child.path)?;
        }
    }
    Ok(())
}
