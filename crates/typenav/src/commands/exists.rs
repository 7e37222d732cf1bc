use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use type_index::NavigationEngine;

use crate::cli::PathArgs;
use crate::commands::write_json;

#[derive(Serialize)]
struct ExistsOutput<'a> {
    path: &'a str,
    exists: bool,
    is_container: bool,
}

/// Prints whether the path exists and returns the answer for the exit status.
pub fn run(
    engine: &NavigationEngine,
    args: &PathArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<bool> {
    let exists = engine.exists(&args.path);

    if json {
        write_json(
            out,
            &ExistsOutput {
                path: &args.path,
                exists,
                is_container: engine.is_container(&args.path),
            },
        )?;
    } else {
        writeln!(out, "{exists}")?;
    }
    Ok(exists)
}
