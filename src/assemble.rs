use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::IntegrityError;
use crate::model::{LineupState, SKATER_SLOTS, ShiftRecord, TeamPair};
use crate::sweep::{SweepOptions, sweep_period};

/// Whole-game lineup table: every period's intervals, in period order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLineups {
    pub teams: TeamPair,
    pub states: Vec<LineupState>,
    /// Widest skater table needed to show every state in the game; never
    /// narrower than [`SKATER_SLOTS`], so periods without a sixth skater
    /// still expose that slot as empty.
    pub skater_slots: usize,
}

impl GameLineups {
    pub fn periods(&self) -> impl Iterator<Item = u32> + '_ {
        let mut last = None;
        self.states.iter().filter_map(move |s| {
            if last == Some(s.period) {
                None
            } else {
                last = Some(s.period);
                Some(s.period)
            }
        })
    }

    pub fn period_end(&self, period: u32) -> Option<u32> {
        self.states
            .iter()
            .filter(|s| s.period == period)
            .map(|s| s.end_time)
            .max()
    }

    pub fn total_duration(&self) -> u64 {
        self.states.iter().map(|s| u64::from(s.duration())).sum()
    }
}

pub fn assemble_game(
    shifts: &[ShiftRecord],
    teams: TeamPair,
    options: SweepOptions,
) -> Result<GameLineups, IntegrityError> {
    let seen = shifts.iter().map(|s| s.team_id).collect::<BTreeSet<_>>();
    for team_id in [teams.home, teams.away] {
        if !seen.contains(&team_id) {
            return Err(IntegrityError::TeamWithoutShifts { team_id });
        }
    }
    if seen.len() != 2 {
        return Err(IntegrityError::TeamCount {
            period: None,
            found: seen.len(),
        });
    }

    let mut by_period: BTreeMap<u32, Vec<&ShiftRecord>> = BTreeMap::new();
    for shift in shifts {
        by_period.entry(shift.period).or_default().push(shift);
    }

    let mut states = Vec::new();
    for (period, period_shifts) in &by_period {
        let period_states = sweep_period(*period, period_shifts, teams, options)?;
        debug!(
            period,
            shifts = period_shifts.len(),
            states = period_states.len(),
            "period swept"
        );
        states.extend(period_states);
    }

    let widest = states
        .iter()
        .map(|s| s.home.skaters.len().max(s.away.skaters.len()))
        .max()
        .unwrap_or(0);

    Ok(GameLineups {
        teams,
        states,
        skater_slots: widest.max(SKATER_SLOTS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    const TEAMS: TeamPair = TeamPair { home: 1, away: 2 };

    fn shift(player: &str, team: u32, period: u32, start: u32, end: u32) -> ShiftRecord {
        ShiftRecord {
            player_id: player.to_string(),
            team_id: team,
            period,
            start_time: start,
            end_time: end,
            position: if player.ends_with('G') {
                Position::Goalie
            } else {
                Position::Center
            },
        }
    }

    #[test]
    fn periods_are_stitched_in_order() {
        let shifts = vec![
            shift("HG", 1, 2, 0, 1200),
            shift("AG", 2, 2, 0, 1200),
            shift("HG", 1, 1, 0, 1200),
            shift("AG", 2, 1, 0, 1200),
            shift("x", 1, 1, 0, 700),
            shift("y", 1, 1, 700, 1200),
        ];
        let game = assemble_game(&shifts, TEAMS, SweepOptions::default()).expect("assembles");
        let keys = game
            .states
            .iter()
            .map(|s| (s.period, s.start_time, s.end_time))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![(1, 0, 700), (1, 700, 1200), (2, 0, 1200)]);
        assert_eq!(game.periods().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(game.period_end(1), Some(1200));
        assert_eq!(game.total_duration(), 2400);
        assert!(game.states.iter().all(|s| s.home_team_id == 1 && s.away_team_id == 2));
        assert_eq!(game.skater_slots, SKATER_SLOTS);
    }

    #[test]
    fn skater_table_widens_past_six() {
        let mut shifts = vec![shift("HG", 1, 1, 0, 60), shift("AG", 2, 1, 0, 60)];
        for i in 0..7 {
            shifts.push(shift(&format!("s{i}"), 1, 1, 0, 60));
        }
        let game = assemble_game(&shifts, TEAMS, SweepOptions::default()).expect("assembles");
        assert_eq!(game.skater_slots, 7);
        assert_eq!(game.states[0].home.slots()[5].as_deref(), Some("s5"));
    }

    #[test]
    fn missing_away_team_is_rejected() {
        let shifts = vec![shift("HG", 1, 1, 0, 1200), shift("ZG", 3, 1, 0, 1200)];
        assert_eq!(
            assemble_game(&shifts, TEAMS, SweepOptions::default()).unwrap_err(),
            IntegrityError::TeamWithoutShifts { team_id: 2 }
        );
    }

    #[test]
    fn third_team_is_rejected() {
        let shifts = vec![
            shift("HG", 1, 1, 0, 1200),
            shift("AG", 2, 1, 0, 1200),
            shift("ZG", 3, 2, 0, 1200),
        ];
        assert_eq!(
            assemble_game(&shifts, TEAMS, SweepOptions::default()).unwrap_err(),
            IntegrityError::TeamCount {
                period: None,
                found: 3
            }
        );
    }
}
