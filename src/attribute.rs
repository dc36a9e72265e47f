use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::model::{AttributedLineupState, EventCounts, LineupState, ShotEvent, TeamPair};

/// Tallies every shot and goal into the lineup interval it happened in.
///
/// An event belongs to the state of its period with
/// `start_time <= time < end_time`; the last state of each period also
/// takes events at exactly `end_time`, so a shot at the buzzer still counts.
/// A goal counts as both a shot and a goal. Events whose team is neither side
/// of the game, or that land outside every interval of their period, are
/// left out and logged.
pub fn attribute_events(states: &[LineupState], events: &[ShotEvent]) -> Vec<AttributedLineupState> {
    let mut by_period: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, state) in states.iter().enumerate() {
        by_period.entry(state.period).or_default().push(idx);
    }
    for indices in by_period.values_mut() {
        indices.sort_by_key(|&idx| states[idx].start_time);
    }

    let mut counts = vec![EventCounts::default(); states.len()];
    let mut unmatched = 0usize;
    for event in events {
        let Some(idx) = locate(states, &by_period, event) else {
            unmatched += 1;
            continue;
        };
        let state = &states[idx];
        let teams = TeamPair {
            home: state.home_team_id,
            away: state.away_team_id,
        };
        match teams.venue_of(event.team_id) {
            Some(venue) => counts[idx].record(venue, event.goal),
            None => debug!(
                event_id = event.event_id,
                team_id = event.team_id,
                "event team is not playing in this game"
            ),
        }
    }
    if unmatched > 0 {
        warn!(unmatched, "events outside every lineup interval");
    }

    states
        .iter()
        .cloned()
        .zip(counts)
        .map(|(state, counts)| AttributedLineupState { state, counts })
        .collect()
}

fn locate(
    states: &[LineupState],
    by_period: &BTreeMap<u32, Vec<usize>>,
    event: &ShotEvent,
) -> Option<usize> {
    let indices = by_period.get(&event.period)?;
    let pos = indices.partition_point(|&idx| states[idx].start_time <= event.time);
    let slot = pos.checked_sub(1)?;
    let idx = indices[slot];
    let state = &states[idx];
    let last_in_period = slot + 1 == indices.len();
    let inside = event.time < state.end_time || (last_in_period && event.time == state.end_time);
    inside.then_some(idx)
}
