use std::collections::BTreeSet;

use crate::error::IntegrityError;
use crate::model::{PlayerId, ShiftRecord, SideRoster, TeamId, TeamPair};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub home: SideRoster,
    pub away: SideRoster,
}

/// Rosters on ice at `t`, built from the shifts active at that instant.
///
/// Skaters come out sorted ascending by id so identical lineups compare
/// equal regardless of shift order. A duplicated shift row for the same
/// player collapses to a single entry.
pub fn snapshot_at<'a, I>(
    active: I,
    teams: TeamPair,
    period: u32,
    t: u32,
) -> Result<Snapshot, IntegrityError>
where
    I: IntoIterator<Item = &'a ShiftRecord>,
{
    let mut home = SideBuilder::default();
    let mut away = SideBuilder::default();
    for shift in active {
        let side = if shift.team_id == teams.home {
            &mut home
        } else if shift.team_id == teams.away {
            &mut away
        } else {
            continue;
        };
        side.push(shift);
    }
    Ok(Snapshot {
        home: home.finish(teams.home, period, t)?,
        away: away.finish(teams.away, period, t)?,
    })
}

#[derive(Default)]
struct SideBuilder<'a> {
    goalies: BTreeSet<&'a PlayerId>,
    skaters: BTreeSet<&'a PlayerId>,
}

impl<'a> SideBuilder<'a> {
    fn push(&mut self, shift: &'a ShiftRecord) {
        if shift.position.is_goalie() {
            self.goalies.insert(&shift.player_id);
        } else {
            self.skaters.insert(&shift.player_id);
        }
    }

    fn finish(self, team_id: TeamId, period: u32, time: u32) -> Result<SideRoster, IntegrityError> {
        if self.goalies.len() > 1 {
            return Err(IntegrityError::MultipleGoalies {
                period,
                time,
                team_id,
                count: self.goalies.len(),
            });
        }
        Ok(SideRoster {
            goalie: self.goalies.into_iter().next().cloned(),
            skaters: self.skaters.into_iter().cloned().collect(),
        })
    }
}
