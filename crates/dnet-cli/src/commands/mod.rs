pub mod analyze;
pub mod completions;
pub mod losses;
pub mod pf;
pub mod regions;

use std::io::{self, Write};

use anyhow::Result;
use dnet_cli::common::{write_json, OutputFormat};
use serde::Serialize;

/// Write `report` to stdout as JSON or through the given table renderer.
pub(crate) fn emit<T, F>(report: &T, format: OutputFormat, render: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => write_json(report, &mut out, true)?,
        OutputFormat::Table => render(report, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
