//! Insert-or-merge of normalized records into the local store.
//!
//! Rules:
//! - players are keyed by external id; an existing row is updated in place
//! - matches are immutable: a match id already stored is skipped entirely
//! - team members resolve to the stored player row by external id; unseen
//!   players get a thin record that a later full fetch promotes
//!
//! Each top-level record is applied in its own transactional scope, so a
//! failure never undoes records committed before it.

use crate::dupr::normalize::{normalize_match, normalize_player, NormalizedMatch};
use crate::error::{DuprError, Result};
use crate::storage::{LocalStore, Player, Rating};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, warn};

#[cfg(test)]
mod tests;

/// What to do when an update carries no value for a rating the store knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullRatingPolicy {
    /// Incoming null replaces the stored value.
    #[default]
    Overwrite,
    /// Keep the stored value when the incoming one is null.
    KeepKnown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Inserted { new_thin_players: usize },
    /// Already stored; left untouched.
    Skipped,
}

/// Tally of one batch of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub thin_players: usize,
}

impl PageReport {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged + self.skipped + self.failed
    }

    pub fn absorb(&mut self, other: PageReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.thin_players += other.thin_players;
    }

    fn record_player(&mut self, outcome: PlayerOutcome) {
        match outcome {
            PlayerOutcome::Inserted => self.inserted += 1,
            PlayerOutcome::Updated => self.updated += 1,
            PlayerOutcome::Unchanged => self.unchanged += 1,
        }
    }

    fn record_match(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::Inserted { new_thin_players } => {
                self.inserted += 1;
                self.thin_players += new_thin_players;
            }
            MatchOutcome::Skipped => self.skipped += 1,
        }
    }
}

impl fmt::Display for PageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} unchanged, {} skipped, {} failed",
            self.inserted, self.updated, self.unchanged, self.skipped, self.failed
        )?;
        if self.thin_players > 0 {
            write!(f, " ({} new thin players)", self.thin_players)?;
        }
        Ok(())
    }
}

pub struct Reconciler<'a, S> {
    store: &'a mut S,
    policy: NullRatingPolicy,
}

impl<'a, S: LocalStore> Reconciler<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self::with_policy(store, NullRatingPolicy::default())
    }

    pub fn with_policy(store: &'a mut S, policy: NullRatingPolicy) -> Self {
        Self { store, policy }
    }

    /// Normalize and apply one raw player payload.
    pub fn reconcile_player(&mut self, raw: &Value) -> Result<PlayerOutcome> {
        let player = normalize_player(raw)?;
        self.apply_player(player)
    }

    /// Insert a full player record or merge it into the stored row.
    pub fn apply_player(&mut self, incoming: Player) -> Result<PlayerOutcome> {
        if incoming.is_thin {
            let inserted = self.store.in_scope(|store| store.insert_thin_player(&incoming))?;
            return Ok(if inserted {
                PlayerOutcome::Inserted
            } else {
                PlayerOutcome::Unchanged
            });
        }

        let policy = self.policy;
        let outcome = self.store.in_scope(|store| {
            let Some(existing) = store.find_player(incoming.player_id)? else {
                store.upsert_player(&incoming)?;
                return Ok(PlayerOutcome::Inserted);
            };

            let merged = merge_player(&existing, incoming, policy);
            if merged == existing {
                return Ok(PlayerOutcome::Unchanged);
            }
            store.upsert_player(&merged)?;
            Ok(PlayerOutcome::Updated)
        })?;
        Ok(outcome)
    }

    /// Normalize and apply one raw match-history entry.
    pub fn reconcile_match(&mut self, raw: &Value) -> Result<MatchOutcome> {
        let normalized = normalize_match(raw)?;
        self.apply_match(&normalized)
    }

    /// Store a match unless its id is already known.
    pub fn apply_match(&mut self, normalized: &NormalizedMatch) -> Result<MatchOutcome> {
        let match_id = normalized.record.match_id;
        self.store.in_scope(|store| {
            if store.find_match(match_id)?.is_some() {
                debug!(%match_id, "match already stored, skipping");
                return Ok(MatchOutcome::Skipped);
            }

            let mut new_thin_players = 0;
            for player in &normalized.players {
                if store.find_player(player.player_id)?.is_none()
                    && store.insert_thin_player(player)?
                {
                    debug!(player_id = %player.player_id, name = %player.full_name, "thin player created");
                    new_thin_players += 1;
                }
            }

            store.insert_match(&normalized.record)?;
            Ok(MatchOutcome::Inserted { new_thin_players })
        })
    }

    /// Apply a page of player payloads, isolating failures per record.
    pub fn reconcile_players(&mut self, items: &[Value]) -> PageReport {
        let mut report = PageReport::default();
        for raw in items {
            match self.reconcile_player(raw) {
                Ok(outcome) => report.record_player(outcome),
                Err(e) => {
                    log_record_failure("player", &e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Apply a page of match payloads, isolating failures per record.
    pub fn reconcile_matches(&mut self, items: &[Value]) -> PageReport {
        let mut report = PageReport::default();
        for raw in items {
            match self.reconcile_match(raw) {
                Ok(outcome) => report.record_match(outcome),
                Err(e) => {
                    log_record_failure("match", &e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

fn log_record_failure(kind: &str, err: &DuprError) {
    match err {
        DuprError::Normalization(e) => warn!(
            kind,
            field = %e.field,
            reason = %e.reason,
            payload = %e.payload,
            "skipping malformed record"
        ),
        other => error!(kind, error = %other, "failed to store record"),
    }
}

/// Fold an incoming full record into the stored one.
pub fn merge_player(existing: &Player, incoming: Player, policy: NullRatingPolicy) -> Player {
    let rating = match policy {
        NullRatingPolicy::Overwrite => incoming.rating,
        NullRatingPolicy::KeepKnown => keep_known(&existing.rating, incoming.rating),
    };

    Player {
        dupr_code: incoming.dupr_code.or_else(|| existing.dupr_code.clone()),
        rating,
        is_thin: false,
        ..incoming
    }
}

fn keep_known(existing: &Rating, incoming: Rating) -> Rating {
    Rating {
        singles: incoming.singles.or(existing.singles),
        singles_verified: incoming.singles_verified.or(existing.singles_verified),
        doubles: incoming.doubles.or(existing.doubles),
        doubles_verified: incoming.doubles_verified.or(existing.doubles_verified),
        ..incoming
    }
}
