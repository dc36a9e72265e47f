use std::collections::BTreeSet;

use tracing::warn;

use crate::error::IntegrityError;
use crate::model::{LineupState, ShiftRecord, TeamPair};
use crate::snapshot::snapshot_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Reject shifts that start strictly inside an interval without a
    /// coincident departure. When off, such starts are logged and the
    /// interval is emitted with the lineup seen at its start.
    pub strict_breakpoints: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            strict_breakpoints: true,
        }
    }
}

/// Splits one period into the ordered, gapless sequence of constant-lineup
/// intervals covering `[0, period_end)`, where `period_end` is the latest
/// shift end in the period.
///
/// The cursor only ever advances to the earliest end among the shifts active
/// at it, so every lineup change has to coincide with somebody leaving the
/// ice. Substitutions in the shift charts are simultaneous; a start that
/// breaks this is reported as [`IntegrityError::UnalignedShiftStart`].
pub fn sweep_period(
    period: u32,
    shifts: &[&ShiftRecord],
    teams: TeamPair,
    options: SweepOptions,
) -> Result<Vec<LineupState>, IntegrityError> {
    let Some(period_start) = shifts.iter().map(|s| s.start_time).min() else {
        return Ok(Vec::new());
    };
    check_teams(period, shifts, teams)?;
    if period_start != 0 {
        return Err(IntegrityError::PeriodStart {
            period,
            start: period_start,
        });
    }
    let period_end = shifts.iter().map(|s| s.end_time).max().unwrap_or(0);

    let mut states = Vec::new();
    let mut cursor = 0u32;
    while cursor < period_end {
        let active = shifts
            .iter()
            .copied()
            .filter(|s| s.is_active_at(cursor))
            .collect::<Vec<_>>();
        let Some(breakpoint) = active.iter().map(|s| s.end_time).min() else {
            return Err(IntegrityError::EmptyLineup {
                period,
                time: cursor,
            });
        };

        if let Some(late) = shifts.iter().find(|s| {
            s.start_time < s.end_time && cursor < s.start_time && s.start_time < breakpoint
        }) {
            if options.strict_breakpoints {
                return Err(IntegrityError::UnalignedShiftStart {
                    period,
                    player_id: late.player_id.clone(),
                    cursor,
                    start: late.start_time,
                    breakpoint,
                });
            }
            warn!(
                period,
                cursor,
                breakpoint,
                start = late.start_time,
                player_id = %late.player_id,
                "shift starts inside interval, lineup change ignored"
            );
        }

        let snapshot = snapshot_at(active, teams, period, cursor)?;
        states.push(LineupState {
            period,
            start_time: cursor,
            end_time: breakpoint,
            home_team_id: teams.home,
            away_team_id: teams.away,
            home: snapshot.home,
            away: snapshot.away,
        });
        cursor = breakpoint;
    }
    Ok(states)
}

fn check_teams(period: u32, shifts: &[&ShiftRecord], teams: TeamPair) -> Result<(), IntegrityError> {
    let seen = shifts.iter().map(|s| s.team_id).collect::<BTreeSet<_>>();
    if seen.len() != 2 {
        return Err(IntegrityError::TeamCount {
            period: Some(period),
            found: seen.len(),
        });
    }
    for team_id in [teams.home, teams.away] {
        if !seen.contains(&team_id) {
            return Err(IntegrityError::TeamWithoutShifts { team_id });
        }
    }
    Ok(())
}
