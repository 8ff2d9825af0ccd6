//! `icall check` — Validate a generated header.

use std::path::Path;

use anyhow::Context;
use icall_engine::DispatchConfig;

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput, header: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = config {
        DispatchConfig::from_file(path)
            .with_context(|| format!("invalid dispatch config {}", path.display()))?;
    }

    let manifest = super::load_manifest(header)?;
    if manifest.tables.is_empty() {
        anyhow::bail!("{} declares no icall tables", header.display());
    }

    let mut failed = 0;
    for table in &manifest.tables {
        match table.validate() {
            Ok(()) => {
                out.success("  ok   ");
                out.plain(&format!("{} ({} entries)", table.name, table.len()));
                out.newline();
            }
            Err(e) => {
                failed += 1;
                out.error("  FAIL ");
                out.plain(&format!("{}: {}", table.name, e));
                out.newline();
            }
        }
    }
    out.flush();

    if failed > 0 {
        anyhow::bail!("{} of {} tables failed validation", failed, manifest.tables.len());
    }
    Ok(())
}
