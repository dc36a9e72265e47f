use std::collections::HashSet;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

use crate::assemble::assemble_game;
use crate::attribute::attribute_events;
use crate::game_feed::parse_game;
use crate::http_cache::{GameSource, RawGame};
use crate::model::{AttributedLineupState, Player, TeamPair};
use crate::shift_chart::parse_shift_chart;
use crate::sweep::SweepOptions;

/// Everything the exporter needs from one game.
#[derive(Debug, Clone)]
pub struct GameDataset {
    pub game_id: String,
    pub teams: TeamPair,
    pub players: Vec<Player>,
    pub rows: Vec<AttributedLineupState>,
    pub skater_slots: usize,
    pub shot_events: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BatchDataset {
    pub game_ids: Vec<String>,
    /// Unique by player id, first appearance wins.
    pub players: Vec<Player>,
    pub rows: Vec<AttributedLineupState>,
}

/// Runs parse, sweep and attribution over one game's raw documents.
pub fn build_game(game_id: &str, raw: &RawGame, options: SweepOptions) -> Result<GameDataset> {
    let feed = parse_game(&raw.game).with_context(|| format!("game {game_id}: game feed"))?;
    let teams = feed.team_pair()?;
    let shifts = parse_shift_chart(&raw.shifts, &feed.players)
        .with_context(|| format!("game {game_id}: shift chart"))?;
    let lineups = assemble_game(&shifts, teams, options)
        .with_context(|| format!("game {game_id}: lineup sweep"))?;
    let rows = attribute_events(&lineups.states, &feed.shots);

    info!(
        game_id,
        shifts = shifts.len(),
        states = rows.len(),
        shots = feed.shots.len(),
        "game processed"
    );
    Ok(GameDataset {
        game_id: game_id.to_string(),
        teams,
        players: feed.players,
        rows,
        skater_slots: lineups.skater_slots,
        shot_events: feed.shots.len(),
    })
}

pub fn process_game<S: GameSource + ?Sized>(
    source: &S,
    game_id: &str,
    options: SweepOptions,
) -> Result<GameDataset> {
    let raw = source.fetch(game_id)?;
    build_game(game_id, &raw, options)
}

/// Processes every game and concatenates the results in input order. The
/// first failing game aborts the batch.
pub fn process_games<S: GameSource + ?Sized>(
    source: &S,
    game_ids: &[String],
    options: SweepOptions,
    threads: usize,
) -> Result<BatchDataset> {
    let games = if threads <= 1 {
        game_ids
            .iter()
            .map(|id| process_game(source, id, options))
            .collect::<Result<Vec<_>>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("build game worker pool")?;
        pool.install(|| {
            game_ids
                .par_iter()
                .map(|id| process_game(source, id, options))
                .collect::<Result<Vec<_>>>()
        })?
    };
    Ok(merge_games(games))
}

pub fn merge_games(games: Vec<GameDataset>) -> BatchDataset {
    let mut seen = HashSet::new();
    let mut out = BatchDataset::default();
    for game in games {
        out.game_ids.push(game.game_id);
        for player in game.players {
            if seen.insert(player.player_id.clone()) {
                out.players.push(player);
            }
        }
        out.rows.extend(game.rows);
    }
    out
}
