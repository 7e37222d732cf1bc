use anyhow::Result;
use std::io::Write;
use type_index::{Item, NavigationEngine};

use crate::cli::PathArgs;
use crate::commands::write_json;

pub fn run(
    engine: &NavigationEngine,
    args: &PathArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let item = engine.get_item(&args.path)?;

    if json {
        return write_json(out, &item);
    }

    match item {
        Item::Namespace(view) => {
            let sources: Vec<&str> = view.sources.iter().map(|id| id.as_str()).collect();
            writeln!(out, "Namespace : {}", view.full_name)?;
            writeln!(out, "Name      : {}", view.name)?;
            writeln!(out, "Parent    : {}", view.namespace)?;
            writeln!(out, "Sources   : {}", sources.join(", "))?;
        }
        Item::Type(record) => {
            writeln!(out, "Type      : {}", record.full_name)?;
            writeln!(out, "Name      : {}", record.name)?;
            writeln!(out, "Namespace : {}", record.namespace)?;
            writeln!(out, "Source    : {}", record.source)?;
            writeln!(out, "Members   : {}", record.members.len())?;
        }
    }
    Ok(())
}
