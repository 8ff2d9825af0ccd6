//! `icall stats` — Per-table convention and signature breakdown.

use std::collections::BTreeMap;
use std::path::Path;

use icall_sdk::{CallConvention, SignatureClass};

use crate::output::StyledOutput;

#[derive(Default)]
struct TableStats {
    wrapped: usize,
    raw: usize,
    unknown_flags: usize,
    undeclared: usize,
    classes: BTreeMap<SignatureClass, usize>,
}

pub fn execute(out: &mut StyledOutput, header: &Path) -> anyhow::Result<()> {
    let manifest = super::load_manifest(header)?;

    for table in &manifest.tables {
        let mut stats = TableStats::default();
        for entry in &table.entries {
            match entry.convention() {
                Some(CallConvention::Wrapped) => stats.wrapped += 1,
                Some(CallConvention::Raw) => stats.raw += 1,
                None => stats.unknown_flags += 1,
            }
            match &entry.signature {
                Some(signature) => *stats.classes.entry(signature.class()).or_default() += 1,
                None => stats.undeclared += 1,
            }
        }

        out.bold(&table.name);
        out.plain(&format!(" ({} entries)", table.len()));
        out.newline();
        out.plain(&format!("  wrapped:      {}\n", stats.wrapped));
        out.plain(&format!("  raw:          {}\n", stats.raw));
        if stats.unknown_flags > 0 {
            out.warning(&format!("  unknown flag: {}\n", stats.unknown_flags));
        }
        for (class, count) in &stats.classes {
            out.dim(&format!("  {:<14}", format!("{}:", class)));
            out.plain(&format!("{}\n", count));
        }
        if stats.undeclared > 0 {
            out.dim(&format!("  {:<14}", "undeclared:"));
            out.plain(&format!("{}\n", stats.undeclared));
        }
    }

    out.plain(&format!(
        "\n{} tables, {} entries\n",
        manifest.tables.len(),
        manifest.entry_count()
    ));
    out.flush();
    Ok(())
}
