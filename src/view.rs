// View Builder
// Shapes query results into chart-ready series and table rows.
// Empty input always produces an empty view, never an error.

use crate::db::StandingRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Position-over-time chart: one line per team, x = matchday, y = rank.
/// Series are aligned on the union of matchdays; a team with no record
/// for some matchday gets a null there so chart lines show the gap.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PositionChart {
    pub matchdays: Vec<u32>,
    pub series: Vec<PositionSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PositionSeries {
    pub team: String,
    pub ranks: Vec<Option<u32>>,
}

/// Point distribution at a fixed matchday: one bar per team.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PointsSnapshot {
    pub matchday: Option<u32>,
    pub bars: Vec<PointsBar>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PointsBar {
    pub team: String,
    pub points: u32,
    pub rank: u32,
    pub goal_difference: i64,
}

/// One row of the standings table as shown in the UI.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableRow {
    pub rank: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

/// Build a position-over-time chart from per-team histories
/// (each history sorted by matchday, as the query layer returns them).
pub fn position_chart(histories: &[Vec<&StandingRecord>]) -> PositionChart {
    let matchdays: Vec<u32> = histories
        .iter()
        .flatten()
        .map(|r| r.matchday)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let series = histories
        .iter()
        .filter(|history| !history.is_empty())
        .map(|history| {
            let ranks = matchdays
                .iter()
                .map(|&md| {
                    history
                        .iter()
                        .find(|r| r.matchday == md)
                        .map(|r| r.rank)
                })
                .collect();

            PositionSeries {
                team: history[0].team.clone(),
                ranks,
            }
        })
        .collect();

    PositionChart { matchdays, series }
}

/// Build a points bar chart from one matchday's standings
/// (sorted by rank, as the query layer returns them).
pub fn points_snapshot(standings: &[&StandingRecord]) -> PointsSnapshot {
    let bars = standings
        .iter()
        .map(|rec| PointsBar {
            team: rec.team.clone(),
            points: rec.points,
            rank: rec.rank,
            goal_difference: rec.goal_difference(),
        })
        .collect();

    PointsSnapshot {
        matchday: standings.first().map(|r| r.matchday),
        bars,
    }
}

/// Build table rows from one matchday's standings.
pub fn standings_table(standings: &[&StandingRecord]) -> Vec<TableRow> {
    standings
        .iter()
        .map(|rec| TableRow {
            rank: rec.rank,
            team: rec.team.clone(),
            played: rec.played,
            won: rec.won,
            drawn: rec.drawn,
            lost: rec.lost,
            goals_for: rec.goals_for,
            goals_against: rec.goals_against,
            goal_difference: rec.goal_difference(),
            points: rec.points,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(season: &str, matchday: u32, team: &str, rank: u32, points: u32) -> StandingRecord {
        StandingRecord {
            season: season.to_string(),
            matchday,
            team: team.to_string(),
            rank,
            points,
            played: matchday,
            won: points / 3,
            drawn: points % 3,
            lost: 0,
            goals_for: points + 1,
            goals_against: rank,
        }
    }

    #[test]
    fn test_position_chart_one_line_per_team() {
        let napoli = vec![
            rec("2022-23", 1, "Napoli", 2, 3),
            rec("2022-23", 2, "Napoli", 1, 6),
        ];
        let inter = vec![
            rec("2022-23", 1, "Inter", 1, 3),
            rec("2022-23", 2, "Inter", 2, 4),
        ];

        let histories = vec![
            napoli.iter().collect::<Vec<_>>(),
            inter.iter().collect::<Vec<_>>(),
        ];
        let chart = position_chart(&histories);

        assert_eq!(chart.matchdays, vec![1, 2]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].team, "Napoli");
        assert_eq!(chart.series[0].ranks, vec![Some(2), Some(1)]);
        assert_eq!(chart.series[1].ranks, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_position_chart_gap_becomes_null() {
        // Inter is missing matchday 2; its line should carry a null there
        let napoli = vec![
            rec("2022-23", 1, "Napoli", 1, 3),
            rec("2022-23", 2, "Napoli", 1, 6),
            rec("2022-23", 3, "Napoli", 1, 9),
        ];
        let inter = vec![
            rec("2022-23", 1, "Inter", 2, 0),
            rec("2022-23", 3, "Inter", 2, 3),
        ];

        let histories = vec![
            napoli.iter().collect::<Vec<_>>(),
            inter.iter().collect::<Vec<_>>(),
        ];
        let chart = position_chart(&histories);

        assert_eq!(chart.matchdays, vec![1, 2, 3]);
        assert_eq!(chart.series[1].ranks, vec![Some(2), None, Some(2)]);
    }

    #[test]
    fn test_position_chart_json_shape() {
        // The wire format the page consumes: gaps must serialize as null
        // so Chart.js breaks the line instead of drawing through the gap
        let napoli = vec![
            rec("2022-23", 1, "Napoli", 1, 3),
            rec("2022-23", 2, "Napoli", 1, 6),
            rec("2022-23", 3, "Napoli", 1, 9),
        ];
        let inter = vec![
            rec("2022-23", 1, "Inter", 2, 0),
            rec("2022-23", 3, "Inter", 2, 3),
        ];

        let histories = vec![
            napoli.iter().collect::<Vec<_>>(),
            inter.iter().collect::<Vec<_>>(),
        ];
        let json = serde_json::to_value(position_chart(&histories)).unwrap();

        assert_eq!(json["matchdays"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["series"][0]["team"], "Napoli");
        assert_eq!(json["series"][0]["ranks"], serde_json::json!([1, 1, 1]));
        assert_eq!(json["series"][1]["ranks"], serde_json::json!([2, null, 2]));
    }

    #[test]
    fn test_empty_input_empty_chart() {
        let chart = position_chart(&[]);
        assert!(chart.matchdays.is_empty());
        assert!(chart.series.is_empty());

        let snapshot = points_snapshot(&[]);
        assert_eq!(snapshot.matchday, None);
        assert!(snapshot.bars.is_empty());

        assert!(standings_table(&[]).is_empty());
    }

    #[test]
    fn test_points_snapshot_keeps_rank_order() {
        let first = rec("2022-23", 38, "Napoli", 1, 90);
        let second = rec("2022-23", 38, "Lazio", 2, 74);
        let standings = vec![&first, &second];

        let snapshot = points_snapshot(&standings);

        assert_eq!(snapshot.matchday, Some(38));
        assert_eq!(snapshot.bars[0].team, "Napoli");
        assert_eq!(snapshot.bars[0].points, 90);
        assert_eq!(snapshot.bars[1].rank, 2);
    }

    #[test]
    fn test_table_row_goal_difference() {
        let first = rec("2022-23", 38, "Napoli", 1, 90);
        let rows = standings_table(&[&first]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].goal_difference, 91 - 1);
        assert_eq!(rows[0].points, 90);
    }
}
