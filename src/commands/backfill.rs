//! Backfill command implementation

use super::common::CommandContext;
use crate::{sync::SyncContext, Result};

pub async fn handle_backfill(ctx: &mut CommandContext) -> Result<()> {
    let mut client = ctx.connect().await?;
    let report = SyncContext::new(&mut client, &mut ctx.db)
        .with_policy(ctx.policy)
        .backfill_ratings()
        .await?;
    println!("✓ {}", report);
    Ok(())
}
