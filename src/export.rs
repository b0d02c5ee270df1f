//! `.xlsx` export of the cached players and matches.

use crate::cli::types::PlayerId;
use crate::storage::{DuprDatabase, Match, Player, PlayerFilter, Team};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const PLAYERS_SHEET: &str = "players";
pub const MATCHES_SHEET: &str = "matches";

/// Shown for a team member that is not in the players table.
const UNKNOWN: &str = "NA";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<Option<i32>> for Cell {
    fn from(v: Option<i32>) -> Self {
        v.map_or(Cell::Empty, |n| Cell::Number(f64::from(n)))
    }
}

impl From<PlayerId> for Cell {
    fn from(id: PlayerId) -> Self {
        Cell::Number(id.as_u64() as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Text(b.to_string())
    }
}

pub type Row = Vec<Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub players: usize,
    pub matches: usize,
}

/// Write both sheets from the store to `path`.
pub fn write_workbook(db: &DuprDatabase, path: &Path) -> Result<ExportSummary> {
    let players = db
        .select_players(PlayerFilter::All)
        .context("failed to load players")?;
    let matches = db.all_matches().context("failed to load matches")?;

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(PLAYERS_SHEET)?;
    write_rows(sheet, &player_rows(&players))?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(MATCHES_SHEET)?;
    write_rows(sheet, &match_rows(&matches, &players))?;

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    info!(path = %path.display(), players = players.len(), matches = matches.len(), "workbook written");
    Ok(ExportSummary {
        players: players.len(),
        matches: matches.len(),
    })
}

pub fn player_header() -> Row {
    [
        "id",
        "DUPR id",
        "full name",
        "gender",
        "age",
        "singles",
        "singles verified",
        "singles provisional",
        "doubles",
        "doubles verified",
        "doubles provisional",
    ]
    .into_iter()
    .map(Cell::from)
    .collect()
}

/// Header row followed by one row per player.
pub fn player_rows(players: &[Player]) -> Vec<Row> {
    let mut rows = vec![player_header()];
    rows.extend(players.iter().map(|p| -> Row {
        vec![
            p.player_id.into(),
            p.dupr_code.clone().unwrap_or_default().into(),
            p.full_name.clone().into(),
            p.gender.clone().unwrap_or_default().into(),
            p.age.map_or(Cell::Empty, |a| Cell::Number(f64::from(a))),
            p.rating.singles.into(),
            p.rating.singles_verified.into(),
            p.rating.singles_provisional.into(),
            p.rating.doubles.into(),
            p.rating.doubles_verified.into(),
            p.rating.doubles_provisional.into(),
        ]
    }));
    rows
}

fn team_header(n: usize) -> Vec<String> {
    vec![
        format!("team{n} player1 id"),
        format!("team{n} player1"),
        format!("team{n} player1 doubles"),
        format!("team{n} player2 id"),
        format!("team{n} player2"),
        format!("team{n} player2 doubles"),
        format!("team{n} game1"),
        format!("team{n} game2"),
        format!("team{n} game3"),
        format!("team{n} winner"),
    ]
}

pub fn match_header() -> Row {
    let mut header: Row = ["match id", "name", "event date", "confirmed", "format", "match type"]
        .into_iter()
        .map(Cell::from)
        .collect();
    for n in 1..=2 {
        header.extend(team_header(n).into_iter().map(Cell::from));
    }
    header
}

/// Header row followed by one row per match, newest first.
pub fn match_rows(matches: &[Match], players: &[Player]) -> Vec<Row> {
    let by_id: HashMap<PlayerId, &Player> = players.iter().map(|p| (p.player_id, p)).collect();

    let mut rows = vec![match_header()];
    for m in matches {
        let mut row: Row = vec![
            Cell::Number(m.match_id.as_u64() as f64),
            m.name.clone().into(),
            m.event_date.format("%Y-%m-%d").to_string().into(),
            m.confirmed.map_or(Cell::Empty, Cell::from),
            m.format.as_str().into(),
            m.match_type.clone().unwrap_or_default().into(),
        ];
        for team in &m.teams {
            row.extend(team_cells(team, &by_id));
        }
        rows.push(row);
    }
    rows
}

fn team_cells(team: &Team, by_id: &HashMap<PlayerId, &Player>) -> Row {
    let mut cells = Row::new();
    for slot in 0..2 {
        match team.players.get(slot) {
            Some(id) => {
                let (name, doubles) = match by_id.get(id) {
                    Some(p) => (p.full_name.clone(), p.rating.doubles_display()),
                    None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
                };
                cells.push((*id).into());
                cells.push(name.into());
                cells.push(doubles.into());
            }
            None => {
                cells.push(Cell::Empty);
                cells.push(Cell::Empty);
                cells.push(UNKNOWN.into());
            }
        }
    }
    cells.extend(team.games.iter().map(|g| Cell::from(*g)));
    cells.push(team.is_winner.into());
    cells
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Row]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(s) => worksheet.write_string(r, c, s).map(|_| ()),
                Cell::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
                Cell::Empty => Ok(()),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
