use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of a league table: where a team stood after a given matchday.
/// Immutable once loaded; uniquely identified by (season, matchday, team).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StandingRecord {
    pub season: String,
    pub matchday: u32,
    pub team: String,
    pub rank: u32,
    pub points: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl StandingRecord {
    /// Goal difference, the usual tie-break column of a league table.
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }
}

/// Per-season summary used by the `check` command.
#[derive(Debug, Clone)]
pub struct SeasonStat {
    pub season: String,
    pub team_count: i64,
    pub matchday_count: i64,
    pub record_count: i64,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode so a crashed import never corrupts the dataset
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Standings Table
    // (season, matchday, team) is the natural key; re-imports are no-ops
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS standings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            season TEXT NOT NULL,
            matchday INTEGER NOT NULL,
            team TEXT NOT NULL,
            rank INTEGER NOT NULL,
            points INTEGER NOT NULL,
            played INTEGER NOT NULL,
            won INTEGER NOT NULL,
            drawn INTEGER NOT NULL,
            lost INTEGER NOT NULL,
            goals_for INTEGER NOT NULL,
            goals_against INTEGER NOT NULL,
            loaded_at TEXT NOT NULL,
            UNIQUE(season, matchday, team)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_season_matchday ON standings(season, matchday)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_season_team ON standings(season, team)",
        [],
    )?;

    Ok(())
}

/// Open an existing standings database read-only.
/// The serving path never writes, so any stray write fails at the SQLite level.
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database read-only: {:?}", db_path))
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<StandingRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut records = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let record: StandingRecord =
            result.with_context(|| format!("Failed to deserialize standings row {}", i + 2))?;

        if record.matchday == 0 {
            anyhow::bail!(
                "Invalid row for {} ({}): matchday must be >= 1",
                record.team,
                record.season
            );
        }
        if record.rank == 0 {
            anyhow::bail!(
                "Invalid row for {} ({}): rank must be >= 1",
                record.team,
                record.season
            );
        }

        records.push(record);
    }

    Ok(records)
}

pub fn insert_standings(conn: &Connection, records: &[StandingRecord]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();

    let mut inserted = 0;
    let mut duplicates = 0;

    for rec in records {
        let result = conn.execute(
            "INSERT INTO standings (
                season, matchday, team, rank, points,
                played, won, drawn, lost, goals_for, goals_against,
                loaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                rec.season,
                rec.matchday,
                rec.team,
                rec.rank,
                rec.points,
                rec.played,
                rec.won,
                rec.drawn,
                rec.lost,
                rec.goals_for,
                rec.goals_against,
                loaded_at,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ Inserted: {} standings rows", inserted);
    println!("✓ Skipped duplicates: {}", duplicates);

    Ok(inserted)
}

pub fn get_all_standings(conn: &Connection) -> Result<Vec<StandingRecord>> {
    let mut stmt = conn.prepare(
        "SELECT season, matchday, team, rank, points,
                played, won, drawn, lost, goals_for, goals_against
         FROM standings
         ORDER BY season, matchday, rank",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(StandingRecord {
                season: row.get(0)?,
                matchday: row.get(1)?,
                team: row.get(2)?,
                rank: row.get(3)?,
                points: row.get(4)?,
                played: row.get(5)?,
                won: row.get(6)?,
                drawn: row.get(7)?,
                lost: row.get(8)?,
                goals_for: row.get(9)?,
                goals_against: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM standings", [], |row| row.get(0))?;

    Ok(count)
}

/// Get per-season statistics (teams, matchdays, total rows).
pub fn get_season_stats(conn: &Connection) -> Result<Vec<SeasonStat>> {
    let mut stmt = conn.prepare(
        "SELECT
            season,
            COUNT(DISTINCT team) as teams,
            COUNT(DISTINCT matchday) as matchdays,
            COUNT(*) as total
         FROM standings
         GROUP BY season
         ORDER BY season",
    )?;

    let stats = stmt
        .query_map([], |row| {
            Ok(SeasonStat {
                season: row.get(0)?,
                team_count: row.get(1)?,
                matchday_count: row.get(2)?,
                record_count: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(
        season: &str,
        matchday: u32,
        team: &str,
        rank: u32,
        points: u32,
    ) -> StandingRecord {
        StandingRecord {
            season: season.to_string(),
            matchday,
            team: team.to_string(),
            rank,
            points,
            played: matchday,
            won: points / 3,
            drawn: points % 3,
            lost: matchday.saturating_sub(points / 3 + points % 3),
            goals_for: points,
            goals_against: matchday,
        }
    }

    #[test]
    fn test_idempotency_import_twice() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let records = vec![
            create_test_record("2022-23", 1, "Napoli", 1, 3),
            create_test_record("2022-23", 1, "Milan", 2, 3),
            create_test_record("2022-23", 1, "Inter", 3, 1),
        ];

        // First import
        let inserted1 = insert_standings(&conn, &records).unwrap();
        let count1 = verify_count(&conn).unwrap();

        // Second import (same rows)
        let inserted2 = insert_standings(&conn, &records).unwrap();
        let count2 = verify_count(&conn).unwrap();

        assert_eq!(inserted1, 3, "First import should insert 3 rows");
        assert_eq!(count1, 3);
        assert_eq!(inserted2, 0, "Second import should insert 0 rows (all duplicates)");
        assert_eq!(count2, 3, "Database should still have 3 rows after second import");
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let rec = StandingRecord {
            season: "2022-23".to_string(),
            matchday: 38,
            team: "Napoli".to_string(),
            rank: 1,
            points: 90,
            played: 38,
            won: 28,
            drawn: 6,
            lost: 4,
            goals_for: 77,
            goals_against: 28,
        };

        insert_standings(&conn, std::slice::from_ref(&rec)).unwrap();
        let loaded = get_all_standings(&conn).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], rec);
        assert_eq!(loaded[0].goal_difference(), 49);
    }

    #[test]
    fn test_season_stats() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let records = vec![
            create_test_record("2021-22", 1, "Milan", 1, 3),
            create_test_record("2021-22", 2, "Milan", 1, 6),
            create_test_record("2022-23", 1, "Napoli", 1, 3),
        ];
        insert_standings(&conn, &records).unwrap();

        let stats = get_season_stats(&conn).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].season, "2021-22");
        assert_eq!(stats[0].matchday_count, 2);
        assert_eq!(stats[1].season, "2022-23");
        assert_eq!(stats[1].record_count, 1);
    }
}
