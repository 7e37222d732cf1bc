use anyhow::Result;
use std::io::Write;
use type_index::{NavigationEngine, PropertyOptions};

use crate::cli::PropertiesArgs;
use crate::commands::write_json;

pub fn run(
    engine: &NavigationEngine,
    args: &PropertiesArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let options = PropertyOptions {
        members: !args.no_members,
        interfaces: args.interfaces,
        attributes: args.attributes,
        enum_values: args.enum_values,
    };
    let properties = engine.get_properties(&args.path, &args.pick, &options)?;

    if json {
        return write_json(out, &properties);
    }

    let width = properties.keys().map(|name| name.len()).max().unwrap_or(0);
    for (name, signatures) in &properties {
        for signature in signatures {
            writeln!(out, "{name:<width$} : {signature}")?;
        }
    }
    Ok(())
}
