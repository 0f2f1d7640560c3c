//! Zipguard CLI - extracts the bundled archive into the working directory.

mod error;
mod output;

use std::path::Path;

use anyhow::Result;
use zipguard_core::ExtractOptions;
use zipguard_core::extract_file;

/// Archive location, relative to the working directory.
const ARCHIVE_PATH: &str = "code/neomart1.zip";
/// Extraction root.
const OUTPUT_DIR: &str = ".";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let archive = Path::new(ARCHIVE_PATH);
    let report = error::add_archive_context(
        extract_file(archive, OUTPUT_DIR, &ExtractOptions::trusted()),
        archive,
    )?;

    let out = output::HumanOutput::new();
    out.extraction_result(&report);

    if report.is_success() {
        Ok(())
    } else {
        out.failures(&report);
        Err(error::entry_failures(&report, archive))
    }
}
