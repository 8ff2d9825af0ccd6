//! `icall lookup` — Resolve a token against one assembly table.

use std::path::Path;

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput, header: &Path, token: u32, assembly: &str) -> anyhow::Result<()> {
    let manifest = super::load_manifest(header)?;
    let table = manifest
        .table(assembly)
        .ok_or_else(|| anyhow::anyhow!("no icall table for assembly '{}'", assembly))?;
    // Lookup is a binary search and is only meaningful on a sorted table.
    table.validate()?;

    let entry = table
        .lookup(token)
        .ok_or_else(|| anyhow::anyhow!("icall token {} is not in the {} table", token, assembly))?;

    out.bold(&entry.symbol);
    out.newline();
    out.dim("  token:      ");
    out.plain(&entry.token.to_string());
    out.newline();
    out.dim("  convention: ");
    match entry.convention() {
        Some(convention) => out.info(&convention.to_string()),
        None => out.warning(&format!("unknown ({:#04x})", entry.flags)),
    }
    out.newline();
    out.dim("  signature:  ");
    match &entry.signature {
        Some(signature) => out.plain(&format!("{} [{}]", signature, signature.class())),
        None => out.plain("(undeclared)"),
    }
    out.newline();
    out.flush();
    Ok(())
}
