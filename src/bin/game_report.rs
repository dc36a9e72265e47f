use anyhow::{Result, anyhow};

use nhl_lineups::aggregate::{aggregate_lineups, roster_is_full_strength};
use nhl_lineups::config::{Config, arg_value};
use nhl_lineups::http_cache::CachedGameSource;
use nhl_lineups::model::{PlayerId, SideRoster};
use nhl_lineups::pipeline::process_game;
use nhl_lineups::telemetry::{init_tracing, load_dotenv};

const DEFAULT_GAME_ID: &str = "2020030314";

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = Config::from_env_and_args(&args);
    let game_id = arg_value(&args, "--game")
        .or_else(|| positional(&args))
        .unwrap_or_else(|| DEFAULT_GAME_ID.to_string());

    let source = CachedGameSource::from_config(&cfg);
    let game = process_game(&source, &game_id, cfg.sweep)?;
    if game.rows.is_empty() {
        return Err(anyhow!("game {game_id} produced no lineup states"));
    }

    println!(
        "game {} home={} away={} shots={} states={}",
        game.game_id,
        game.teams.home,
        game.teams.away,
        game.shot_events,
        game.rows.len()
    );
    println!();
    println!(
        "{:>3} {:>5} {:>5} {:>4}  {:<w$} | {:<w$} | {:>3} {:>3} {:>3} {:>3}",
        "per",
        "start",
        "end",
        "dur",
        "home",
        "away",
        "hs",
        "hg",
        "as",
        "ag",
        w = roster_width(game.skater_slots)
    );
    for row in &game.rows {
        let s = &row.state;
        let marker = if roster_is_full_strength(&s.home, &s.away) {
            ' '
        } else {
            '*'
        };
        println!(
            "{:>3} {:>5} {:>5} {:>4}{} {:<w$} | {:<w$} | {:>3} {:>3} {:>3} {:>3}",
            s.period,
            s.start_time,
            s.end_time,
            s.duration(),
            marker,
            roster_text(&s.home, game.skater_slots),
            roster_text(&s.away, game.skater_slots),
            row.counts.home_shots,
            row.counts.home_goals,
            row.counts.away_shots,
            row.counts.away_goals,
            w = roster_width(game.skater_slots)
        );
    }

    let cohorts = aggregate_lineups(&game.rows);
    println!();
    println!("cohorts: {}", cohorts.len());
    for cohort in &cohorts {
        let k = &cohort.key;
        let t = &cohort.totals;
        println!(
            "{:>5}s  G {} [{}] vs G {} [{}]  shots {}-{} goals {}-{}",
            t.duration,
            slot_text(k.home_goalie.as_ref()),
            join_slots(&k.home_skaters),
            slot_text(k.away_goalie.as_ref()),
            join_slots(&k.away_skaters),
            t.home_shots,
            t.away_shots,
            t.home_goals,
            t.away_goals
        );
    }
    Ok(())
}

fn positional(args: &[String]) -> Option<String> {
    args.first()
        .filter(|a| !a.starts_with("--") && a.chars().all(|c| c.is_ascii_digit()))
        .cloned()
}

fn roster_width(slots: usize) -> usize {
    // goalie + skaters, 7-digit ids
    (slots + 1) * 8 + 2
}

fn roster_text(side: &SideRoster, slots: usize) -> String {
    let skaters = (0..slots)
        .map(|i| slot_text(side.skater(i)))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} / {}", slot_text(side.goalie.as_ref()), skaters)
}

fn join_slots(slots: &[Option<PlayerId>]) -> String {
    slots
        .iter()
        .map(|s| slot_text(s.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn slot_text(id: Option<&PlayerId>) -> String {
    id.cloned().unwrap_or_else(|| "-".to_string())
}
