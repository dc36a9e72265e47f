use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::IntegrityError;
use crate::game_feed::{id_string, to_seconds};
use crate::model::{Player, Position, ShiftRecord};

/// Shift-chart rows describing an on-ice shift carry this type code.
pub const SHIFT_TYPE_CODE: i64 = 517;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShiftRow {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    detail_code: Option<i64>,
    #[serde(default)]
    type_code: Option<i64>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    event_description: Option<Value>,
    #[serde(default)]
    event_details: Option<Value>,
    #[serde(default)]
    period: Option<u32>,
    #[serde(default)]
    player_id: Option<Value>,
    #[serde(default)]
    team_id: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawShiftChart {
    #[serde(default)]
    data: Vec<RawShiftRow>,
    #[serde(default)]
    total: u64,
}

/// Normalizes a raw shift chart into typed shift records.
///
/// Rows without a duration (goal markers and the like) are skipped. Every
/// other row must be a plain shift: detail code 0, type code 517, no event
/// payload, and a duration that agrees with its clock times. Positions come
/// from `players`; a player missing from the game roster is treated as a
/// skater. Zero-length shifts are never on ice and are dropped.
pub fn parse_shift_chart(
    raw: &Value,
    players: &[Player],
) -> anyhow::Result<Vec<ShiftRecord>> {
    let chart = RawShiftChart::deserialize(raw).context("invalid shift chart json")?;
    Ok(normalize_rows(chart, players)?)
}

fn normalize_rows(
    chart: RawShiftChart,
    players: &[Player],
) -> Result<Vec<ShiftRecord>, IntegrityError> {
    if chart.total == 0 {
        return Err(IntegrityError::EmptyShiftChart);
    }
    let positions = players
        .iter()
        .map(|p| (p.player_id.as_str(), p.position))
        .collect::<HashMap<_, _>>();

    let mut out = Vec::with_capacity(chart.data.len());
    let mut zero_length = 0usize;
    for row in chart.data {
        let Some(duration) = row.duration.as_deref() else {
            trace!(shift_id = row.id, "row without duration skipped");
            continue;
        };
        if row.detail_code != Some(0) || row.type_code != Some(SHIFT_TYPE_CODE) {
            return Err(IntegrityError::UnexpectedShiftCode {
                shift_id: row.id,
                detail_code: row.detail_code,
                type_code: row.type_code,
            });
        }
        if !is_null(&row.event_description) || !is_null(&row.event_details) {
            return Err(IntegrityError::UnexpectedShiftEvent { shift_id: row.id });
        }

        let duration = to_seconds(duration)?;
        let start = to_seconds(required(&row.start_time, "shift.startTime")?)?;
        let end = to_seconds(required(&row.end_time, "shift.endTime")?)?;
        if end.checked_sub(start) != Some(duration) {
            return Err(IntegrityError::DurationMismatch {
                shift_id: row.id,
                start,
                end,
                duration,
            });
        }
        if duration == 0 {
            zero_length += 1;
            continue;
        }

        let player_id = row
            .player_id
            .as_ref()
            .and_then(id_string)
            .ok_or(IntegrityError::MissingField {
                field: "shift.playerId",
            })?;
        let position = positions
            .get(player_id.as_str())
            .copied()
            .unwrap_or(Position::Unknown);
        out.push(ShiftRecord {
            team_id: row.team_id.ok_or(IntegrityError::MissingField {
                field: "shift.teamId",
            })?,
            period: row.period.ok_or(IntegrityError::MissingField {
                field: "shift.period",
            })?,
            start_time: start,
            end_time: end,
            player_id,
            position,
        });
    }
    if zero_length > 0 {
        debug!(zero_length, "dropped zero-length shifts");
    }
    Ok(out)
}

fn required<'a>(v: &'a Option<String>, field: &'static str) -> Result<&'a str, IntegrityError> {
    v.as_deref().ok_or(IntegrityError::MissingField { field })
}

fn is_null(v: &Option<Value>) -> bool {
    v.as_ref().is_none_or(Value::is_null)
}
