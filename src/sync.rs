//! Sync orchestration: pull remote data through a [`DuprApi`] and reconcile
//! it into a [`LocalStore`].
//!
//! Every operation takes explicit client and store handles. Records are
//! committed one at a time as they are reconciled, so an aborted run keeps
//! whatever it already stored.

use crate::cli::types::{ClubId, PlayerId};
use crate::dupr::normalize::{normalize_match, normalize_player, NormalizedMatch};
use crate::dupr::{fetch_all, DuprApi, Endpoint, EndpointPages, Paged};
use crate::error::{DuprError, Result};
use crate::reconcile::{NullRatingPolicy, PageReport, Reconciler};
use crate::storage::{LocalStore, Player, PlayerFilter};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};


/// Tally of a club sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub members: PageReport,
    pub matches: PageReport,
    /// Members whose match history was walked.
    pub histories: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "members: {}", self.members)?;
        write!(
            f,
            "matches: {} (from {} histories)",
            self.matches, self.histories
        )
    }
}

/// Tally of a rating backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub selected: usize,
    pub refreshed: PageReport,
    pub not_found: usize,
}

impl fmt::Display for BackfillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} players without a doubles rating: {}, {} not found upstream",
            self.selected, self.refreshed, self.not_found
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Full record was already cached; nothing fetched.
    Cached(Player),
    Fetched(Player),
}

impl AddOutcome {
    pub fn player(&self) -> &Player {
        match self {
            AddOutcome::Cached(p) | AddOutcome::Fetched(p) => p,
        }
    }
}

/// Remote player as seen by `query-player`; nothing is stored.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub player: Player,
    pub matches: Vec<NormalizedMatch>,
    /// History entries that failed to normalize.
    pub rejected: usize,
}

/// Client and store handles plus the reconciliation policy for one run.
pub struct SyncContext<'a, A, S> {
    pub api: &'a mut A,
    pub store: &'a mut S,
    pub policy: NullRatingPolicy,
}

impl<'a, A: DuprApi, S: LocalStore> SyncContext<'a, A, S> {
    pub fn new(api: &'a mut A, store: &'a mut S) -> Self {
        Self {
            api,
            store,
            policy: NullRatingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NullRatingPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn reconciler(&mut self) -> Reconciler<'_, S> {
        Reconciler::with_policy(&mut *self.store, self.policy)
    }

    /// Fetch every member of `club`, then every member's match history.
    ///
    /// Partial pages are reconciled before a pagination error is returned.
    pub async fn sync_club(&mut self, club: ClubId) -> Result<SyncReport> {
        info!(%club, "fetching club members");
        let mut report = SyncReport::default();

        let paged = fetch_all(EndpointPages::new(&mut *self.api, Endpoint::ClubMembers(club))).await;
        let Paged { items, error, fetches } = paged;
        report.members = self.reconciler().reconcile_players(&items);
        info!(fetches, members = items.len(), report = %report.members, "club members reconciled");
        if let Some(e) = error {
            return Err(e);
        }

        for raw in &items {
            let player_id = match normalize_player(raw) {
                Ok(p) => p.player_id,
                // already counted as failed above
                Err(_) => continue,
            };
            let history = self.sync_history(player_id).await;
            report.histories += 1;
            match history {
                Ok(matches) => report.matches.absorb(matches),
                Err((matches, e)) => {
                    report.matches.absorb(matches);
                    warn!(%player_id, stored = %report, "sync stopped");
                    return Err(e);
                }
            }
        }

        info!(report = %report, "club sync finished");
        Ok(report)
    }

    /// Walk one player's match history and reconcile every entry.
    ///
    /// On a pagination error the matches already fetched are still stored and
    /// their tally is returned alongside the error.
    pub async fn sync_history(
        &mut self,
        player_id: PlayerId,
    ) -> std::result::Result<PageReport, (PageReport, DuprError)> {
        let paged = fetch_all(EndpointPages::new(
            &mut *self.api,
            Endpoint::MatchHistory(player_id),
        ))
        .await;
        let report = self.reconciler().reconcile_matches(&paged.items);
        debug!(%player_id, entries = paged.items.len(), report = %report, "history reconciled");

        match paged.error {
            Some(e) => Err((report, e)),
            None => Ok(report),
        }
    }

    /// Cache a player by id, fetching only when no full record is stored.
    pub async fn add_player(&mut self, player_id: PlayerId) -> Result<AddOutcome> {
        if let Some(existing) = self.store.find_player(player_id)? {
            if !existing.is_thin {
                debug!(%player_id, "player already cached");
                return Ok(AddOutcome::Cached(existing));
            }
        }

        let raw = self
            .api
            .fetch_single(&Endpoint::Player(player_id))
            .await?
            .ok_or_else(|| DuprError::PlayerNotFound {
                id: player_id.to_string(),
            })?;
        self.reconciler().reconcile_player(&raw)?;

        let stored = self
            .store
            .find_player(player_id)?
            .ok_or_else(|| DuprError::Cache {
                message: format!("player {} missing after insert", player_id),
            })?;
        Ok(AddOutcome::Fetched(stored))
    }

    /// Re-fetch every stored player whose doubles rating is absent.
    pub async fn backfill_ratings(&mut self) -> Result<BackfillReport> {
        let candidates = self.store.select_players(PlayerFilter::MissingDoubles)?;
        let mut report = BackfillReport {
            selected: candidates.len(),
            ..BackfillReport::default()
        };
        info!(selected = report.selected, "backfilling doubles ratings");

        for candidate in candidates {
            let player_id = candidate.player_id;
            let Some(raw) = self.api.fetch_single(&Endpoint::Player(player_id)).await? else {
                warn!(%player_id, name = %candidate.full_name, "player not found upstream, skipping");
                report.not_found += 1;
                continue;
            };
            let single = self.reconciler().reconcile_players(std::slice::from_ref(&raw));
            report.refreshed.absorb(single);
        }

        info!(report = %report, "backfill finished");
        Ok(report)
    }
}

/// Fetch a player and their match history without touching the store.
pub async fn query_player<A: DuprApi>(api: &mut A, player_id: PlayerId) -> Result<RemotePlayer> {
    let raw = api
        .fetch_single(&Endpoint::Player(player_id))
        .await?
        .ok_or_else(|| DuprError::PlayerNotFound {
            id: player_id.to_string(),
        })?;
    let player = normalize_player(&raw)?;

    let history = fetch_all(EndpointPages::new(api, Endpoint::MatchHistory(player_id)))
        .await
        .into_result()?;

    let mut matches = Vec::with_capacity(history.len());
    let mut rejected = 0;
    for entry in &history {
        match normalize_match(entry) {
            Ok(m) => matches.push(m),
            Err(e) => {
                warn!(field = %e.field, reason = %e.reason, "skipping malformed history entry");
                rejected += 1;
            }
        }
    }

    Ok(RemotePlayer {
        player,
        matches,
        rejected,
    })
}
