//! Excel export command implementation

use std::path::Path;

use super::common::CommandContext;
use crate::export::write_workbook;

pub fn handle_write_excel(ctx: &CommandContext, output: &Path) -> anyhow::Result<()> {
    let summary = write_workbook(&ctx.db, output)?;
    println!(
        "✓ wrote {} players and {} matches to {}",
        summary.players,
        summary.matches,
        output.display()
    );
    Ok(())
}
