//! Basic database query operations

use super::{models::*, schema::DuprDatabase};
use crate::cli::types::{MatchId, PlayerId};
use crate::error::{DuprError, Result};
use chrono::NaiveDate;
use rusqlite::{params, Row};

const PLAYER_COLUMNS: &str = "p.player_id, p.dupr_code, p.full_name, p.first_name, p.last_name,
     p.gender, p.age, p.email, p.phone, p.image_url, p.is_thin,
     r.singles, r.singles_verified, r.singles_provisional,
     r.doubles, r.doubles_verified, r.doubles_provisional";

fn player_query(tail: &str) -> String {
    format!(
        "SELECT {} FROM players p LEFT JOIN ratings r ON r.player_id = p.player_id {}",
        PLAYER_COLUMNS, tail
    )
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl DuprDatabase {
    /// Look up a player by external id
    pub fn find_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let mut stmt = self.conn.prepare(&player_query("WHERE p.player_id = ?"))?;
        let result = stmt.query_row(params![player_id.as_i64()], row_to_player);

        match result {
            Ok(player) => Ok(Some(player)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a player or update the existing row in place, returning the stored row.
    ///
    /// Every mutable column is overwritten with the incoming value, nulls included.
    /// The short code is only replaced when the incoming record carries one.
    pub fn upsert_player(&mut self, player: &Player) -> Result<Player> {
        let ts = now();
        self.conn.execute(
            "INSERT INTO players
             (player_id, dupr_code, full_name, first_name, last_name, gender, age,
              email, phone, image_url, is_thin, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id) DO UPDATE SET
                dupr_code = COALESCE(excluded.dupr_code, players.dupr_code),
                full_name = excluded.full_name,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                gender = excluded.gender,
                age = excluded.age,
                email = excluded.email,
                phone = excluded.phone,
                image_url = excluded.image_url,
                is_thin = excluded.is_thin,
                updated_at = excluded.updated_at",
            params![
                player.player_id.as_i64(),
                player.dupr_code,
                player.full_name,
                player.first_name,
                player.last_name,
                player.gender,
                player.age,
                player.email,
                player.phone,
                player.image_url,
                player.is_thin,
                ts,
                ts
            ],
        )?;

        let rating = &player.rating;
        self.conn.execute(
            "INSERT INTO ratings
             (player_id, singles, singles_verified, singles_provisional,
              doubles, doubles_verified, doubles_provisional)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id) DO UPDATE SET
                singles = excluded.singles,
                singles_verified = excluded.singles_verified,
                singles_provisional = excluded.singles_provisional,
                doubles = excluded.doubles,
                doubles_verified = excluded.doubles_verified,
                doubles_provisional = excluded.doubles_provisional",
            params![
                player.player_id.as_i64(),
                rating.singles,
                rating.singles_verified,
                rating.singles_provisional,
                rating.doubles,
                rating.doubles_verified,
                rating.doubles_provisional
            ],
        )?;

        self.find_player(player.player_id)?
            .ok_or_else(|| DuprError::PlayerNotFound {
                id: player.player_id.to_string(),
            })
    }

    /// Insert a thin player unless a row with the same id already exists.
    ///
    /// Returns true when a new row was created.
    pub fn insert_thin_player(&mut self, player: &Player) -> Result<bool> {
        let ts = now();
        let inserted = self.conn.execute(
            "INSERT INTO players
             (player_id, dupr_code, full_name, is_thin, created_at, updated_at)
             VALUES (?, ?, ?, 1, ?, ?)
             ON CONFLICT(player_id) DO NOTHING",
            params![
                player.player_id.as_i64(),
                player.dupr_code,
                player.full_name,
                ts,
                ts
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Select players matching a filter, ordered by name
    pub fn select_players(&self, filter: PlayerFilter) -> Result<Vec<Player>> {
        let where_clause = match filter {
            PlayerFilter::All => "",
            PlayerFilter::MissingDoubles => "WHERE r.doubles IS NULL",
            PlayerFilter::Thin => "WHERE p.is_thin = 1",
        };
        let mut stmt = self.conn.prepare(&player_query(&format!(
            "{} ORDER BY p.full_name, p.player_id",
            where_clause
        )))?;

        let rows = stmt.query_map([], row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// Remove a player and its rating from the cache.
    ///
    /// Match history keeps referring to the external id.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM players WHERE player_id = ?",
            params![player_id.as_i64()],
        )?;
        Ok(removed > 0)
    }

    /// Look up a match, its two teams and their players by external id
    pub fn find_match(&self, match_id: MatchId) -> Result<Option<Match>> {
        let mut stmt = self.conn.prepare(
            "SELECT match_id, name, event_date, format, source, match_type, confirmed
             FROM matches WHERE match_id = ?",
        )?;
        let result = stmt.query_row(params![match_id.as_i64()], row_to_match);

        let mut found = match result {
            Ok(m) => m,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        found.teams = self.load_teams(match_id)?;
        Ok(Some(found))
    }

    fn load_teams(&self, match_id: MatchId) -> Result<Vec<Team>> {
        let mut team_stmt = self.conn.prepare(
            "SELECT team_id, game1, game2, game3, is_winner
             FROM match_teams WHERE match_id = ? ORDER BY team_index",
        )?;
        let mut player_stmt = self.conn.prepare(
            "SELECT player_id FROM match_team_players WHERE team_id = ? ORDER BY slot",
        )?;

        let rows = team_stmt.query_map(params![match_id.as_i64()], |row| {
            let team_id: i64 = row.get(0)?;
            Ok((
                team_id,
                Team {
                    games: [row.get(1)?, row.get(2)?, row.get(3)?],
                    is_winner: row.get(4)?,
                    players: Vec::new(),
                },
            ))
        })?;

        let mut teams = Vec::new();
        for row in rows {
            let (team_id, mut team) = row?;
            let ids = player_stmt.query_map(params![team_id], |r| r.get::<_, i64>(0))?;
            for id in ids {
                team.players.push(PlayerId::new(id? as u64));
            }
            teams.push(team);
        }
        Ok(teams)
    }

    /// Insert a match with its teams and team memberships.
    ///
    /// Fails on a duplicate match id; callers check [`find_match`](Self::find_match) first.
    pub fn insert_match(&mut self, record: &Match) -> Result<()> {
        self.conn.execute(
            "INSERT INTO matches
             (match_id, name, event_date, format, source, match_type, confirmed, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.match_id.as_i64(),
                record.name,
                record.event_date.to_string(),
                record.format.as_str(),
                record.source,
                record.match_type,
                record.confirmed,
                now()
            ],
        )?;

        for (team_index, team) in record.teams.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO match_teams
                 (match_id, team_index, game1, game2, game3, is_winner)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    record.match_id.as_i64(),
                    team_index as i64,
                    team.games[0],
                    team.games[1],
                    team.games[2],
                    team.is_winner
                ],
            )?;
            let team_id = self.conn.last_insert_rowid();

            for (slot, player_id) in team.players.iter().enumerate() {
                self.conn.execute(
                    "INSERT INTO match_team_players (team_id, slot, player_id)
                     VALUES (?, ?, ?)",
                    params![team_id, slot as i64, player_id.as_i64()],
                )?;
            }
        }
        Ok(())
    }

    /// All stored matches, newest first
    pub fn all_matches(&self) -> Result<Vec<Match>> {
        let mut stmt = self
            .conn
            .prepare("SELECT match_id FROM matches ORDER BY event_date DESC, match_id")?;
        let ids = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut matches = Vec::new();
        for id in ids {
            if let Some(m) = self.find_match(MatchId::new(id? as u64))? {
                matches.push(m);
            }
        }
        Ok(matches)
    }

    /// Ids of every match the given player took part in
    pub fn match_ids_for_player(&self, player_id: PlayerId) -> Result<Vec<MatchId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.match_id FROM match_team_players tp
             JOIN match_teams t ON t.team_id = tp.team_id
             WHERE tp.player_id = ? ORDER BY t.match_id",
        )?;
        let rows = stmt.query_map(params![player_id.as_i64()], |row| row.get::<_, i64>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(MatchId::new(row? as u64));
        }
        Ok(ids)
    }

    /// Row counts for the `stats` command
    pub fn stats(&self) -> Result<CacheStats> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(CacheStats {
            players: count("SELECT COUNT(*) FROM players")?,
            thin_players: count("SELECT COUNT(*) FROM players WHERE is_thin = 1")?,
            matches: count("SELECT COUNT(*) FROM matches")?,
            teams: count("SELECT COUNT(*) FROM match_teams")?,
        })
    }
}

/// Helper to convert a joined players/ratings row to a Player
fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    let player_id: i64 = row.get(0)?;
    let singles_provisional: Option<bool> = row.get(13)?;
    let doubles_provisional: Option<bool> = row.get(16)?;

    Ok(Player {
        player_id: PlayerId::new(player_id as u64),
        dupr_code: row.get(1)?,
        full_name: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        gender: row.get(5)?,
        age: row.get(6)?,
        email: row.get(7)?,
        phone: row.get(8)?,
        image_url: row.get(9)?,
        is_thin: row.get(10)?,
        rating: Rating {
            singles: row.get(11)?,
            singles_verified: row.get(12)?,
            singles_provisional: singles_provisional.unwrap_or(false),
            doubles: row.get(14)?,
            doubles_verified: row.get(15)?,
            doubles_provisional: doubles_provisional.unwrap_or(false),
        },
    })
}

/// Helper to convert a matches row; teams are loaded separately
fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
    let match_id: i64 = row.get(0)?;
    let date_str: String = row.get(2)?;
    let format_str: String = row.get(3)?;

    let event_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let format = format_str.parse::<MatchFormat>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(Match {
        match_id: MatchId::new(match_id as u64),
        name: row.get(1)?,
        event_date,
        format,
        source: row.get(4)?,
        match_type: row.get(5)?,
        confirmed: row.get(6)?,
        teams: Vec::new(),
    })
}
