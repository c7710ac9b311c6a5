// Query Layer
// Pure reads against the in-memory store, with typed errors so the
// presentation shell can distinguish "bad input" from "nothing selected"

use crate::db::StandingRecord;
use crate::store::StandingsStore;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown season: {0}")]
    SeasonNotFound(String),

    #[error("Unknown team: {0}")]
    TeamNotFound(String),

    #[error("Matchday {matchday} out of range (valid: 1-{last})")]
    MatchdayOutOfRange { matchday: u32, last: u32 },

    /// No filters selected. Rendered as an empty view, never as a failure.
    #[error("Nothing selected")]
    EmptySelection,
}

impl StandingsStore {
    /// Full league table for one matchday, sorted by rank ascending.
    pub fn standings(
        &self,
        season: &str,
        matchday: u32,
    ) -> Result<Vec<&StandingRecord>, QueryError> {
        let data = self
            .season(season)
            .ok_or_else(|| QueryError::SeasonNotFound(season.to_string()))?;

        if matchday == 0 || matchday > data.last_matchday() {
            return Err(QueryError::MatchdayOutOfRange {
                matchday,
                last: data.last_matchday(),
            });
        }

        data.standings_at(matchday).ok_or(QueryError::MatchdayOutOfRange {
            matchday,
            last: data.last_matchday(),
        })
    }

    /// One team's season, sorted by matchday ascending.
    pub fn team_history(
        &self,
        season: &str,
        team: &str,
    ) -> Result<Vec<&StandingRecord>, QueryError> {
        let data = self
            .season(season)
            .ok_or_else(|| QueryError::SeasonNotFound(season.to_string()))?;

        data.history_of(team)
            .ok_or_else(|| QueryError::TeamNotFound(team.to_string()))
    }

    /// Histories for a set of teams, in the order given.
    /// An empty selection is a valid state of the UI, not an input error.
    pub fn team_histories<'a>(
        &'a self,
        season: &str,
        teams: &[String],
    ) -> Result<Vec<Vec<&'a StandingRecord>>, QueryError> {
        if teams.is_empty() {
            return Err(QueryError::EmptySelection);
        }

        teams
            .iter()
            .map(|team| self.team_history(season, team))
            .collect()
    }
}
