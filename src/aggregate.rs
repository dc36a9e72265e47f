use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    AttributedLineupState, FULL_STRENGTH_SKATERS, PlayerId, SKATER_SLOTS, SideRoster, TeamId,
};

/// The 16-field identity of a lineup: both teams, both goalies and six
/// skater slots per side. Empty slots are part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineupKey {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_goalie: Option<PlayerId>,
    pub home_skaters: [Option<PlayerId>; SKATER_SLOTS],
    pub away_goalie: Option<PlayerId>,
    pub away_skaters: [Option<PlayerId>; SKATER_SLOTS],
}

impl LineupKey {
    pub fn of(row: &AttributedLineupState) -> Self {
        let state = &row.state;
        Self {
            home_team_id: state.home_team_id,
            away_team_id: state.away_team_id,
            home_goalie: state.home.goalie.clone(),
            home_skaters: state.home.slots(),
            away_goalie: state.away.goalie.clone(),
            away_skaters: state.away.slots(),
        }
    }

    /// Goalie plus exactly five skaters on both sides.
    pub fn is_full_strength(&self) -> bool {
        side_is_full(&self.home_goalie, &self.home_skaters)
            && side_is_full(&self.away_goalie, &self.away_skaters)
    }
}

fn side_is_full(goalie: &Option<PlayerId>, skaters: &[Option<PlayerId>; SKATER_SLOTS]) -> bool {
    goalie.is_some()
        && skaters[..FULL_STRENGTH_SKATERS].iter().all(Option::is_some)
        && skaters[FULL_STRENGTH_SKATERS..].iter().all(Option::is_none)
}

/// Summed ice time (seconds) and shot/goal counts for one lineup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupTotals {
    pub duration: u64,
    pub home_shots: u32,
    pub home_goals: u32,
    pub away_shots: u32,
    pub away_goals: u32,
}

impl LineupTotals {
    fn add(&mut self, row: &AttributedLineupState) {
        self.duration += u64::from(row.state.duration());
        self.home_shots += row.counts.home_shots;
        self.home_goals += row.counts.home_goals;
        self.away_shots += row.counts.away_shots;
        self.away_goals += row.counts.away_goals;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLineup {
    pub key: LineupKey,
    pub totals: LineupTotals,
}

/// Collapses rows sharing a lineup key into one row each, in order of first
/// appearance. Period and clock position are ignored.
pub fn aggregate_lineups<'a, I>(rows: I) -> Vec<AggregatedLineup>
where
    I: IntoIterator<Item = &'a AttributedLineupState>,
{
    let mut index: HashMap<LineupKey, usize> = HashMap::new();
    let mut out: Vec<AggregatedLineup> = Vec::new();
    for row in rows {
        let key = LineupKey::of(row);
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                index.insert(key.clone(), out.len());
                out.push(AggregatedLineup {
                    key,
                    totals: LineupTotals::default(),
                });
                out.len() - 1
            }
        };
        out[slot].totals.add(row);
    }
    out
}

/// Aggregates and keeps only 5-on-5 lineups with both goalies in net.
pub fn full_strength_lineups<'a, I>(rows: I) -> Vec<AggregatedLineup>
where
    I: IntoIterator<Item = &'a AttributedLineupState>,
{
    aggregate_lineups(rows)
        .into_iter()
        .filter(|row| row.key.is_full_strength())
        .collect()
}

pub fn roster_is_full_strength(home: &SideRoster, away: &SideRoster) -> bool {
    home.is_full_strength() && away.is_full_strength()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventCounts, LineupState};

    fn side(goalie: &str, skaters: &[&str]) -> SideRoster {
        SideRoster {
            goalie: (!goalie.is_empty()).then(|| goalie.to_string()),
            skaters: skaters.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn row(
        period: u32,
        start: u32,
        end: u32,
        home: SideRoster,
        away: SideRoster,
        counts: EventCounts,
    ) -> AttributedLineupState {
        AttributedLineupState {
            state: LineupState {
                period,
                start_time: start,
                end_time: end,
                home_team_id: 1,
                away_team_id: 2,
                home,
                away,
            },
            counts,
        }
    }

    fn five(prefix: &str) -> Vec<String> {
        (0..5).map(|i| format!("{prefix}{i}")).collect()
    }

    fn full_side(goalie: &str, prefix: &str) -> SideRoster {
        SideRoster {
            goalie: Some(goalie.to_string()),
            skaters: five(prefix),
        }
    }

    #[test]
    fn identical_lineups_are_summed() {
        let rows = vec![
            row(
                1,
                0,
                30,
                full_side("hg", "h"),
                full_side("ag", "a"),
                EventCounts {
                    home_shots: 1,
                    ..Default::default()
                },
            ),
            row(
                2,
                100,
                145,
                full_side("hg", "h"),
                full_side("ag", "a"),
                EventCounts {
                    home_shots: 2,
                    away_shots: 1,
                    away_goals: 1,
                    ..Default::default()
                },
            ),
        ];
        let out = aggregate_lineups(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].totals,
            LineupTotals {
                duration: 75,
                home_shots: 3,
                home_goals: 0,
                away_shots: 1,
                away_goals: 1,
            }
        );
    }

    #[test]
    fn empty_slots_group_together() {
        let rows = vec![
            row(1, 0, 10, side("hg", &["a", "b"]), side("", &["c"]), EventCounts::default()),
            row(1, 20, 50, side("hg", &["a", "b"]), side("", &["c"]), EventCounts::default()),
            row(1, 50, 60, side("hg", &["a"]), side("", &["c"]), EventCounts::default()),
        ];
        let out = aggregate_lineups(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].totals.duration, 40);
        assert_eq!(out[1].totals.duration, 10);
    }

    #[test]
    fn short_handed_rows_are_filtered() {
        let mut four = full_side("hg", "h");
        four.skaters.pop();
        let rows = vec![
            row(1, 0, 30, four, full_side("ag", "a"), EventCounts::default()),
            row(1, 30, 90, full_side("hg", "h"), full_side("ag", "a"), EventCounts::default()),
        ];
        let out = full_strength_lineups(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].totals.duration, 60);
    }

    #[test]
    fn extra_attacker_and_empty_net_are_filtered() {
        let mut six = full_side("hg", "h");
        six.skaters.push("h5".to_string());
        let empty_net = SideRoster {
            goalie: None,
            skaters: five("h"),
        };
        let rows = vec![
            row(3, 0, 30, six, full_side("ag", "a"), EventCounts::default()),
            row(3, 30, 40, empty_net, full_side("ag", "a"), EventCounts::default()),
        ];
        assert!(full_strength_lineups(&rows).is_empty());
    }

    #[test]
    fn filter_matches_roster_check() {
        let home = full_side("hg", "h");
        let away = full_side("ag", "a");
        assert!(roster_is_full_strength(&home, &away));
        let key = LineupKey::of(&row(1, 0, 1, home, away, EventCounts::default()));
        assert!(key.is_full_strength());
    }
}
