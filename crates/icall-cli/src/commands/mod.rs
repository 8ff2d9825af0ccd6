//! Subcommand implementations

pub mod check;
pub mod info;
pub mod lookup;
pub mod stats;

use anyhow::Context;
use icall_engine::TableManifest;
use std::path::Path;

pub(crate) fn load_manifest(header: &Path) -> anyhow::Result<TableManifest> {
    let manifest = TableManifest::from_file(header)
        .with_context(|| format!("failed to read {}", header.display()))?;
    log::debug!(
        "{}: {} tables, {} entries",
        header.display(),
        manifest.tables.len(),
        manifest.entry_count()
    );
    Ok(manifest)
}
