//! Stats command implementation

use super::common::CommandContext;
use crate::Result;

pub fn handle_stats(ctx: &CommandContext, as_json: bool) -> Result<()> {
    let stats = ctx.db.stats()?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("players:      {}", stats.players);
    println!("  thin:       {}", stats.thin_players);
    println!("matches:      {}", stats.matches);
    println!("teams:        {}", stats.teams);
    Ok(())
}
