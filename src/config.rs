use std::collections::HashSet;
use std::path::PathBuf;

use crate::sweep::SweepOptions;

pub const DEFAULT_GAME_FEED_URL: &str =
    "https://statsapi.web.nhl.com/api/v1/game/{game_id}/feed/live?site=en_nhl";
pub const DEFAULT_SHIFT_CHART_URL: &str =
    "https://api.nhle.com/stats/rest/en/shiftcharts?cayenneExp=gameId={game_id}";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// 2020 playoffs, first round through the semifinals.
pub const DEFAULT_GAME_IDS: &[&str] = &[
    "2020030171",
    "2020030172",
    "2020030173",
    "2020030174",
    "2020030175",
    "2020030176",
    "2020030177",
    "2020030241",
    "2020030242",
    "2020030243",
    "2020030244",
    "2020030311",
    "2020030312",
    "2020030313",
    "2020030314",
    "2020030315",
    "2020030316",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub out_dir: PathBuf,
    pub game_ids: Vec<String>,
    pub game_feed_url: String,
    pub shift_chart_url: String,
    pub http_timeout_secs: u64,
    pub threads: usize,
    pub offline: bool,
    pub sweep: SweepOptions,
}

impl Config {
    /// Resolves settings from the environment, then applies CLI overrides
    /// (`--out`, `--game-ids`, `--threads`, `--offline`, `--lenient`).
    pub fn from_env_and_args(args: &[String]) -> Self {
        let work_dir = env_nonempty("WD")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let out_dir = arg_value(args, "--out")
            .or_else(|| env_nonempty("NHL_OUT_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| work_dir.join("out"));

        let game_ids = arg_value(args, "--game-ids")
            .or_else(|| env_nonempty("NHL_GAME_IDS"))
            .map(|raw| parse_game_ids(&raw))
            .filter(|ids| !ids.is_empty())
            .unwrap_or_else(default_game_ids);

        let threads = arg_value(args, "--threads")
            .or_else(|| env_nonempty("NHL_EXPORT_THREADS"))
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        let lenient = args.iter().any(|a| a == "--lenient") || env_flag("NHL_SWEEP_LENIENT");
        let offline = args.iter().any(|a| a == "--offline") || env_flag("NHL_OFFLINE");

        Self {
            work_dir,
            out_dir,
            game_ids,
            game_feed_url: env_nonempty("NHL_GAME_FEED_URL")
                .unwrap_or_else(|| DEFAULT_GAME_FEED_URL.to_string()),
            shift_chart_url: env_nonempty("NHL_SHIFT_CHART_URL")
                .unwrap_or_else(|| DEFAULT_SHIFT_CHART_URL.to_string()),
            http_timeout_secs: env_nonempty("NHL_HTTP_TIMEOUT_SECS")
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
                .max(1),
            threads,
            offline,
            sweep: SweepOptions {
                strict_breakpoints: !lenient,
            },
        }
    }
}

pub fn default_game_ids() -> Vec<String> {
    DEFAULT_GAME_IDS.iter().map(|s| s.to_string()).collect()
}

/// Splits on commas, semicolons and whitespace; keeps first occurrences only.
pub fn parse_game_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', ';', ' ', '\n', '\t'])
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Supports both `--name=value` and `--name value`.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn url_for(template: &str, game_id: &str) -> String {
    template.replace("{game_id}", game_id)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str) -> bool {
    env_nonempty(key).is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
}
