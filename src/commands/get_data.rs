//! Get data command implementation

use super::common::CommandContext;
use crate::{sync::SyncContext, ClubId, Result};
use serde_json::Value;
use tracing::info;

/// Sync the club members and their histories, then backfill missing ratings.
pub async fn handle_get_data(
    ctx: &mut CommandContext,
    club_id: Option<ClubId>,
    skip_backfill: bool,
) -> Result<()> {
    let club = ctx.config.resolve_club_id(club_id)?;
    let mut client = ctx.connect().await?;
    let profile = client.get_profile().await?;
    let user = profile_name(&profile);
    info!(user, "logged in");

    println!("Fetching club {} from DUPR...", club);
    let mut sync = SyncContext::new(&mut client, &mut ctx.db).with_policy(ctx.policy);
    let report = sync.sync_club(club).await?;
    println!("✓ {}", report);

    if !skip_backfill {
        let backfill = sync.backfill_ratings().await?;
        println!("✓ backfill: {}", backfill);
    }

    Ok(())
}

/// Display name from a `/user/{v}/profile/` result.
pub fn profile_name(profile: &Value) -> &str {
    profile
        .get("fullName")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}
