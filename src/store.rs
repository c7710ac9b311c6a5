// In-memory Standings Store
// Loaded once at startup, shared by reference for the lifetime of the process

use crate::db::{self, StandingRecord};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// All standings for one season, indexed for the two query shapes
/// the dashboard needs (snapshot by matchday, history by team).
#[derive(Debug)]
pub struct SeasonData {
    records: Vec<StandingRecord>,
    /// Record indices per matchday, sorted by rank ascending
    by_matchday: BTreeMap<u32, Vec<usize>>,
    /// Record indices per team, sorted by matchday ascending
    by_team: HashMap<String, Vec<usize>>,
    /// Highest matchday with data (= season length for a finished season)
    last_matchday: u32,
}

impl SeasonData {
    /// Number of teams competing this season.
    pub fn team_count(&self) -> usize {
        self.by_team.len()
    }

    /// Highest matchday present in the dataset for this season.
    pub fn last_matchday(&self) -> u32 {
        self.last_matchday
    }

    /// Team names in alphabetical order.
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = self.by_team.keys().map(|t| t.as_str()).collect();
        teams.sort_unstable();
        teams
    }

    pub(crate) fn standings_at(&self, matchday: u32) -> Option<Vec<&StandingRecord>> {
        self.by_matchday
            .get(&matchday)
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
    }

    pub(crate) fn history_of(&self, team: &str) -> Option<Vec<&StandingRecord>> {
        self.by_team
            .get(team)
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
    }
}

/// Read-only dataset of historical standings, keyed by season.
/// Built once from the SQLite file; never mutated while serving.
#[derive(Debug)]
pub struct StandingsStore {
    seasons: BTreeMap<String, SeasonData>,
}

impl StandingsStore {
    /// Open the database read-only and load everything into memory.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = db::open_read_only(db_path)?;
        Self::load(&conn)
    }

    /// Bulk-load all records from an open connection.
    /// Fails if any (season, matchday) slice violates the rank invariant,
    /// since every chart and table downstream assumes it.
    pub fn load(conn: &Connection) -> Result<Self> {
        let records = db::get_all_standings(conn).context("Failed to read standings table")?;

        let mut grouped: BTreeMap<String, Vec<StandingRecord>> = BTreeMap::new();
        for rec in records {
            grouped.entry(rec.season.clone()).or_default().push(rec);
        }

        let mut seasons = BTreeMap::new();
        for (season, records) in grouped {
            let data = build_season(records)
                .with_context(|| format!("Corrupt standings for season {}", season))?;
            seasons.insert(season, data);
        }

        Ok(StandingsStore { seasons })
    }

    /// Season labels in chronological order.
    pub fn seasons(&self) -> Vec<&str> {
        self.seasons.keys().map(|s| s.as_str()).collect()
    }

    pub fn season(&self, season: &str) -> Option<&SeasonData> {
        self.seasons.get(season)
    }

    /// Total number of records across all seasons.
    pub fn record_count(&self) -> usize {
        self.seasons.values().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}

fn build_season(records: Vec<StandingRecord>) -> Result<SeasonData> {
    let mut by_matchday: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut by_team: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, rec) in records.iter().enumerate() {
        by_matchday.entry(rec.matchday).or_default().push(i);
        by_team.entry(rec.team.clone()).or_default().push(i);
    }

    let team_count = by_team.len();
    let last_matchday = by_matchday.keys().next_back().copied().unwrap_or(0);

    // Sort matchday slices by rank and check the invariant: for a fixed
    // matchday, ranks are a contiguous permutation of 1..=N
    for (matchday, indices) in &mut by_matchday {
        indices.sort_by_key(|&i| records[i].rank);

        if indices.len() != team_count {
            anyhow::bail!(
                "matchday {} has {} teams, expected {}",
                matchday,
                indices.len(),
                team_count
            );
        }

        for (pos, &i) in indices.iter().enumerate() {
            let expected = (pos + 1) as u32;
            if records[i].rank != expected {
                anyhow::bail!(
                    "matchday {}: rank {} missing or duplicated (found {} for {})",
                    matchday,
                    expected,
                    records[i].rank,
                    records[i].team
                );
            }
        }
    }

    // Sort team histories by matchday and reject duplicate snapshots
    for (team, indices) in &mut by_team {
        indices.sort_by_key(|&i| records[i].matchday);

        for pair in indices.windows(2) {
            if records[pair[0]].matchday == records[pair[1]].matchday {
                anyhow::bail!(
                    "{} has two records for matchday {}",
                    team,
                    records[pair[0]].matchday
                );
            }
        }
    }

    Ok(SeasonData {
        records,
        by_matchday,
        by_team,
        last_matchday,
    })
}
