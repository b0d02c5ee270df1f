//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use duprly::{
    cli::{Commands, Duprly},
    commands::{backfill, get_data, players, stats, write_excel, CommandContext},
    core::Config,
    logging,
    reconcile::NullRatingPolicy,
};

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = Duprly::parse();
    logging::init(app.verbose);

    let config = Config::from_env().context("failed to read configuration")?;
    let policy = if app.keep_known_ratings {
        NullRatingPolicy::KeepKnown
    } else {
        NullRatingPolicy::Overwrite
    };
    let mut ctx =
        CommandContext::new(config, app.db, policy).context("failed to open the cache database")?;

    match app.command {
        Commands::GetData {
            club_id,
            skip_backfill,
        } => get_data::handle_get_data(&mut ctx, club_id, skip_backfill).await?,
        Commands::AddPlayer { id } => players::handle_add_player(&mut ctx, id).await?,
        Commands::GetPlayer { id, json } => players::handle_get_player(&ctx, id, json)?,
        Commands::QueryPlayer { id } => players::handle_query_player(&ctx, id).await?,
        Commands::DeletePlayer { id } => players::handle_delete_player(&mut ctx, id)?,
        Commands::Backfill => backfill::handle_backfill(&mut ctx).await?,
        Commands::WriteExcel { output } => write_excel::handle_write_excel(&ctx, &output)?,
        Commands::Stats { json } => stats::handle_stats(&ctx, json)?,
    }

    Ok(())
}
