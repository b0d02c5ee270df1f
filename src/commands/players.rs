//! Single-player commands: add, show, query and delete.

use super::common::CommandContext;
use crate::{
    error::DuprError,
    storage::Player,
    sync::{query_player, AddOutcome, SyncContext},
    PlayerId, Result,
};

/// Fetch a player into the cache unless a full record is already there.
pub async fn handle_add_player(ctx: &mut CommandContext, id: PlayerId) -> Result<()> {
    // checked here as well so a cached player needs no login
    if let Some(existing) = ctx.db.find_player(id)? {
        if !existing.is_thin {
            println!("{} is already cached", existing);
            return Ok(());
        }
    }

    let mut client = ctx.connect().await?;
    let outcome = SyncContext::new(&mut client, &mut ctx.db)
        .with_policy(ctx.policy)
        .add_player(id)
        .await?;
    match outcome {
        AddOutcome::Cached(p) => println!("{} is already cached", p),
        AddOutcome::Fetched(p) => println!("✓ added {}", p),
    }
    Ok(())
}

/// Print a cached player.
pub fn handle_get_player(ctx: &CommandContext, id: PlayerId, as_json: bool) -> Result<()> {
    let player = ctx
        .db
        .find_player(id)?
        .ok_or_else(|| DuprError::PlayerNotFound { id: id.to_string() })?;
    let match_count = ctx.db.match_ids_for_player(id)?.len();

    if as_json {
        let mut value = serde_json::to_value(&player)?;
        value["matches"] = match_count.into();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_player(&player);
        println!("  matches:  {}", match_count);
    }
    Ok(())
}

/// Fetch a player and their history from DUPR and print them; nothing is stored.
pub async fn handle_query_player(ctx: &CommandContext, id: PlayerId) -> Result<()> {
    let mut client = ctx.connect().await?;
    let remote = query_player(&mut client, id).await?;

    print_player(&remote.player);
    println!("  matches:  {}", remote.matches.len());
    for m in &remote.matches {
        println!("    {} {} ({})", m.record.event_date, m.record.name, m.record.format);
    }
    if remote.rejected > 0 {
        println!("  {} history entries could not be read", remote.rejected);
    }
    Ok(())
}

/// Remove a player from the cache.
pub fn handle_delete_player(ctx: &mut CommandContext, id: PlayerId) -> Result<()> {
    if ctx.db.remove_player(id)? {
        println!("✓ removed player {}", id);
    } else {
        println!("player {} not found", id);
    }
    Ok(())
}

fn print_player(player: &Player) {
    println!("{}", player);
    if let Some(code) = &player.dupr_code {
        println!("  DUPR id:  {}", code);
    }
    println!("  doubles:  {}", player.rating.doubles_display());
    println!("  singles:  {}", player.rating.singles_display());
    if player.is_thin {
        println!("  (only seen in match history)");
    }
}
