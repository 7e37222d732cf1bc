pub mod exists;
pub mod item;
pub mod list;
pub mod properties;
pub mod shell;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

pub(crate) fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
