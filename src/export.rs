use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedLineup;
use crate::error::IntegrityError;
use crate::http_cache::save_json;
use crate::model::{FULL_STRENGTH_SKATERS, Player, PlayerId};

pub const DATA_FILE: &str = "data.json";
pub const PLAYERS_FILE: &str = "players.json";

/// Player ids mapped to 1-based sequential indices in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    by_id: HashMap<PlayerId, u32>,
    names: BTreeMap<u32, String>,
}

impl PlayerIndex {
    pub fn build(players: &[Player]) -> Self {
        let mut index = Self::default();
        for player in players {
            if index.by_id.contains_key(&player.player_id) {
                continue;
            }
            let next = index.by_id.len() as u32 + 1;
            index.by_id.insert(player.player_id.clone(), next);
            index.names.insert(next, player.display_name());
        }
        index
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<u32> {
        self.by_id.get(player_id).copied()
    }

    pub fn names(&self) -> &BTreeMap<u32, String> {
        &self.names
    }

    fn require(&self, player_id: Option<&PlayerId>) -> Result<u32, IntegrityError> {
        let player_id = player_id.map(String::as_str).unwrap_or_default();
        self.get(player_id).ok_or_else(|| IntegrityError::UnindexedPlayer {
            player_id: player_id.to_string(),
        })
    }
}

/// Columnar model input: one equal-length array per field, players by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelData {
    pub n_obs: usize,
    pub n_players: usize,
    pub home_goalie: Vec<u32>,
    pub home_skater_0: Vec<u32>,
    pub home_skater_1: Vec<u32>,
    pub home_skater_2: Vec<u32>,
    pub home_skater_3: Vec<u32>,
    pub home_skater_4: Vec<u32>,
    pub away_goalie: Vec<u32>,
    pub away_skater_0: Vec<u32>,
    pub away_skater_1: Vec<u32>,
    pub away_skater_2: Vec<u32>,
    pub away_skater_3: Vec<u32>,
    pub away_skater_4: Vec<u32>,
    pub duration: Vec<u64>,
    pub home_shots: Vec<u32>,
    pub away_shots: Vec<u32>,
    pub home_goals: Vec<u32>,
    pub away_goals: Vec<u32>,
}

impl ModelData {
    /// Encodes full-strength rows. Every goalie and first-five skater slot
    /// has to be filled and known to `index`.
    pub fn from_lineups(rows: &[AggregatedLineup], index: &PlayerIndex) -> Result<Self, IntegrityError> {
        let mut data = ModelData {
            n_obs: rows.len(),
            n_players: index.len(),
            ..Default::default()
        };
        for row in rows {
            let key = &row.key;
            data.home_goalie.push(index.require(key.home_goalie.as_ref())?);
            data.away_goalie.push(index.require(key.away_goalie.as_ref())?);
            let home = key.home_skaters[..FULL_STRENGTH_SKATERS]
                .iter()
                .map(|id| index.require(id.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            let away = key.away_skaters[..FULL_STRENGTH_SKATERS]
                .iter()
                .map(|id| index.require(id.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            for (column, value) in data.home_skater_columns().into_iter().zip(home) {
                column.push(value);
            }
            for (column, value) in data.away_skater_columns().into_iter().zip(away) {
                column.push(value);
            }
            data.duration.push(row.totals.duration);
            data.home_shots.push(row.totals.home_shots);
            data.away_shots.push(row.totals.away_shots);
            data.home_goals.push(row.totals.home_goals);
            data.away_goals.push(row.totals.away_goals);
        }
        Ok(data)
    }

    fn home_skater_columns(&mut self) -> [&mut Vec<u32>; FULL_STRENGTH_SKATERS] {
        [
            &mut self.home_skater_0,
            &mut self.home_skater_1,
            &mut self.home_skater_2,
            &mut self.home_skater_3,
            &mut self.home_skater_4,
        ]
    }

    fn away_skater_columns(&mut self) -> [&mut Vec<u32>; FULL_STRENGTH_SKATERS] {
        [
            &mut self.away_skater_0,
            &mut self.away_skater_1,
            &mut self.away_skater_2,
            &mut self.away_skater_3,
            &mut self.away_skater_4,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub data: PathBuf,
    pub players: PathBuf,
}

/// Writes `data.json` and `players.json` into `dir`.
pub fn write_outputs(dir: &Path, data: &ModelData, index: &PlayerIndex) -> Result<ExportPaths> {
    let paths = ExportPaths {
        data: dir.join(DATA_FILE),
        players: dir.join(PLAYERS_FILE),
    };
    save_json(index.names(), &paths.players)?;
    save_json(data, &paths.data)?;
    Ok(paths)
}
