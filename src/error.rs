use thiserror::Error;

/// Raw data that breaks one of the assumptions the lineup pipeline relies on.
///
/// These are never repaired: the game that produced them is rejected and the
/// batch aborts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("malformed clock string {raw:?} (expected MM:SS)")]
    MalformedClock { raw: String },

    #[error("missing or invalid feed field `{field}`")]
    MissingField { field: &'static str },

    #[error("shift chart is empty")]
    EmptyShiftChart,

    #[error("shift {shift_id}: unexpected detailCode={detail_code:?} typeCode={type_code:?}")]
    UnexpectedShiftCode {
        shift_id: u64,
        detail_code: Option<i64>,
        type_code: Option<i64>,
    },

    #[error("shift {shift_id}: carries an event description or details")]
    UnexpectedShiftEvent { shift_id: u64 },

    #[error("shift {shift_id}: end {end} - start {start} != duration {duration}")]
    DurationMismatch {
        shift_id: u64,
        start: u32,
        end: u32,
        duration: u32,
    },

    #[error("team {team_id} has no shifts in the shift chart")]
    TeamWithoutShifts { team_id: u32 },

    #[error("expected exactly 2 teams, found {found} (period {period:?})")]
    TeamCount { period: Option<u32>, found: usize },

    #[error("period {period} starts at {start}s instead of 0")]
    PeriodStart { period: u32, start: u32 },

    #[error("period {period} @ {time}s: team {team_id} has {count} goalies on ice")]
    MultipleGoalies {
        period: u32,
        time: u32,
        team_id: u32,
        count: usize,
    },

    #[error("period {period} @ {time}s: nobody on ice")]
    EmptyLineup { period: u32, time: u32 },

    #[error(
        "period {period}: shift of player {player_id} starts at {start}s inside interval [{cursor}, {breakpoint})"
    )]
    UnalignedShiftStart {
        period: u32,
        player_id: String,
        cursor: u32,
        start: u32,
        breakpoint: u32,
    },

    #[error("player {player_id} has no export index")]
    UnindexedPlayer { player_id: String },
}
