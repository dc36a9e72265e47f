use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde_json::Value;

use nhl_lineups::aggregate::{LineupTotals, aggregate_lineups, full_strength_lineups};
use nhl_lineups::error::IntegrityError;
use nhl_lineups::export::{ModelData, PlayerIndex, write_outputs};
use nhl_lineups::http_cache::{CachedGameSource, GameSource, RawGame, save_json};
use nhl_lineups::pipeline::{process_game, process_games};
use nhl_lineups::sweep::SweepOptions;

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be json")
}

struct FixtureSource {
    games: HashMap<String, RawGame>,
}

impl FixtureSource {
    fn with_games(ids: &[&str]) -> Self {
        let raw = RawGame {
            game: read_fixture("game_final.json"),
            shifts: read_fixture("shifts_final.json"),
        };
        Self {
            games: ids.iter().map(|id| (id.to_string(), raw.clone())).collect(),
        }
    }
}

impl GameSource for FixtureSource {
    fn fetch(&self, game_id: &str) -> Result<RawGame> {
        self.games
            .get(game_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown game {game_id}"))
    }
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn fixture_game_produces_expected_intervals() {
    let source = FixtureSource::with_games(&["g1"]);
    let game = process_game(&source, "g1", SweepOptions::default()).expect("game processes");
    let bounds = game
        .rows
        .iter()
        .map(|r| (r.state.period, r.state.start_time, r.state.end_time))
        .collect::<Vec<_>>();
    assert_eq!(
        bounds,
        vec![
            (1, 0, 600),
            (1, 600, 1200),
            (2, 0, 300),
            (2, 300, 420),
            (2, 420, 1200),
            (3, 0, 1140),
            (3, 1140, 1200),
        ]
    );

    let penalty_kill = &game.rows[3].state;
    assert_eq!(
        penalty_kill.away.skaters,
        vec!["8470201", "8470202", "8470203", "8470204"]
    );

    let pulled = &game.rows[6].state;
    assert_eq!(pulled.home.goalie, None);
    assert_eq!(pulled.home.skaters.len(), 6);
    assert_eq!(game.skater_slots, 6);
}

#[test]
fn shots_in_played_periods_are_all_attributed() {
    let source = FixtureSource::with_games(&["g1"]);
    let game = process_game(&source, "g1", SweepOptions::default()).expect("game processes");
    let attributed: u32 = game
        .rows
        .iter()
        .map(|r| r.counts.home_shots + r.counts.away_shots)
        .sum();
    // eight shot events, one of them in a period without shifts
    assert_eq!(game.shot_events, 8);
    assert_eq!(attributed, 7);

    // goals at the final buzzer stay in the period's last interval
    assert_eq!(game.rows[4].counts.away_goals, 1);
    assert_eq!(game.rows[6].counts.away_goals, 1);
    assert_eq!(game.rows[6].counts.away_shots, 2);
    // goal at 10:00 opens the second interval of period 1
    assert_eq!(game.rows[0].counts.home_goals, 0);
    assert_eq!(game.rows[1].counts.home_goals, 1);
}

#[test]
fn aggregation_collapses_repeated_lineups() {
    let source = FixtureSource::with_games(&["g1"]);
    let game = process_game(&source, "g1", SweepOptions::default()).expect("game processes");

    let cohorts = aggregate_lineups(&game.rows);
    assert_eq!(cohorts.len(), 4);
    assert_eq!(cohorts.iter().map(|c| c.totals.duration).sum::<u64>(), 3600);

    let full = full_strength_lineups(&game.rows);
    assert_eq!(full.len(), 2);
    assert_eq!(
        full[0].totals,
        LineupTotals {
            duration: 2820,
            home_shots: 1,
            home_goals: 0,
            away_shots: 1,
            away_goals: 1,
        }
    );
    assert_eq!(
        full[1].totals,
        LineupTotals {
            duration: 600,
            home_shots: 1,
            home_goals: 1,
            away_shots: 1,
            away_goals: 0,
        }
    );
}

#[test]
fn batch_merges_players_and_rows() {
    let source = FixtureSource::with_games(&["g1", "g2"]);
    let batch = process_games(&source, &ids(&["g1", "g2"]), SweepOptions::default(), 2)
        .expect("batch processes");
    assert_eq!(batch.game_ids, vec!["g1", "g2"]);
    assert_eq!(batch.players.len(), 13);
    assert_eq!(batch.rows.len(), 14);

    let full = full_strength_lineups(&batch.rows);
    assert_eq!(full.len(), 2);
    assert_eq!(full[0].totals.duration, 5640);
}

#[test]
fn one_bad_game_aborts_the_batch() {
    let mut source = FixtureSource::with_games(&["g1", "bad"]);
    let bad = source.games.get_mut("bad").expect("present");
    // second goalie for the home side in period 1
    bad.shifts["data"][2]["playerId"] = 8470200u64.into();
    bad.shifts["data"][2]["teamId"] = 10.into();

    let err = process_games(&source, &ids(&["g1", "bad"]), SweepOptions::default(), 1)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IntegrityError>(),
        Some(IntegrityError::MultipleGoalies { team_id: 10, .. })
    ));
}

#[test]
fn unknown_game_id_fails() {
    let source = FixtureSource::with_games(&["g1"]);
    assert!(process_games(&source, &ids(&["nope"]), SweepOptions::default(), 1).is_err());
}

#[test]
fn exports_columnar_model_data_from_cache_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = CachedGameSource::new(
        dir.path(),
        "http://127.0.0.1:9/{game_id}",
        "http://127.0.0.1:9/{game_id}",
    );
    for id in ["2099030001"] {
        let paths = source.paths(id);
        save_json(&read_fixture("game_final.json"), &paths.game).expect("seed game");
        save_json(&read_fixture("shifts_final.json"), &paths.shifts).expect("seed shifts");
    }

    let batch = process_games(&source, &ids(&["2099030001"]), SweepOptions::default(), 1)
        .expect("served from cache");
    let index = PlayerIndex::build(&batch.players);
    let data = ModelData::from_lineups(&full_strength_lineups(&batch.rows), &index)
        .expect("players indexed");
    assert_eq!(data.n_obs, 2);
    assert_eq!(data.n_players, 13);
    assert_eq!(data.home_goalie, vec![1, 1]);
    assert_eq!(data.away_goalie, vec![8, 8]);
    assert_eq!(data.home_skater_0, vec![2, 3]);
    assert_eq!(data.home_skater_4, vec![6, 7]);
    assert_eq!(data.away_skater_0, vec![9, 9]);
    assert_eq!(data.duration, vec![2820, 600]);
    assert_eq!(data.home_goals, vec![0, 1]);
    assert_eq!(data.away_goals, vec![1, 0]);

    let paths = write_outputs(dir.path(), &data, &index).expect("written");
    let written: Value =
        serde_json::from_str(&fs::read_to_string(&paths.data).expect("read")).expect("json");
    assert_eq!(written["n_obs"], 2);
    assert_eq!(written["duration"], serde_json::json!([2820, 600]));
    let names: Value =
        serde_json::from_str(&fs::read_to_string(&paths.players).expect("read")).expect("json");
    assert_eq!(names["8"], "Abe Stopper");
}

#[test]
fn lineup_states_keep_their_invariants() {
    let source = FixtureSource::with_games(&["g1"]);
    let game = process_game(&source, "g1", SweepOptions::default()).expect("game processes");

    for period in 1..=3 {
        let states = game
            .rows
            .iter()
            .map(|r| &r.state)
            .filter(|s| s.period == period)
            .collect::<Vec<_>>();
        assert_eq!(states.first().map(|s| s.start_time), Some(0));
        assert_eq!(states.last().map(|s| s.end_time), Some(1200));
        for pair in states.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert!(pair[0].start_time < pair[0].end_time);
        }
    }

    for row in &game.rows {
        for side in [&row.state.home, &row.state.away] {
            assert!(side.skaters.windows(2).all(|w| w[0] < w[1]));
            if let Some(goalie) = &side.goalie {
                assert!(!side.skaters.contains(goalie));
            }
        }
    }
}
