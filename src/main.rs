use anyhow::{Context, Result, anyhow};
use tracing::info;

use nhl_lineups::aggregate::full_strength_lineups;
use nhl_lineups::config::Config;
use nhl_lineups::export::{ModelData, PlayerIndex, write_outputs};
use nhl_lineups::http_cache::CachedGameSource;
use nhl_lineups::pipeline::process_games;
use nhl_lineups::telemetry::{init_tracing, load_dotenv};

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = Config::from_env_and_args(&args);
    if cfg.game_ids.is_empty() {
        return Err(anyhow!("no game ids resolved for export"));
    }
    info!(
        games = cfg.game_ids.len(),
        out = %cfg.out_dir.display(),
        threads = cfg.threads,
        strict = cfg.sweep.strict_breakpoints,
        "building lineup dataset"
    );

    let source = CachedGameSource::from_config(&cfg);
    let batch = process_games(&source, &cfg.game_ids, cfg.sweep, cfg.threads)?;

    let index = PlayerIndex::build(&batch.players);
    let lineups = full_strength_lineups(&batch.rows);
    let data = ModelData::from_lineups(&lineups, &index).context("encode model data")?;
    let paths = write_outputs(&cfg.out_dir, &data, &index)?;

    let seconds = data.duration.iter().sum::<u64>();
    println!("Lineup export complete");
    println!("Games: {}", batch.game_ids.len());
    println!("Lineup states: {}", batch.rows.len());
    println!("Full-strength lineups: {}", data.n_obs);
    println!("Players: {}", data.n_players);
    println!("5v5 ice time: {}:{:02}", seconds / 60, seconds % 60);
    println!("Data: {}", paths.data.display());
    println!("Players: {}", paths.players.display());
    Ok(())
}
