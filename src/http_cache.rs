use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Config, url_for};
use crate::game_feed::{FINAL_STATE, game_status};
use crate::http_client::{download_json, http_client};

/// The two raw documents the pipeline needs for one game.
#[derive(Debug, Clone)]
pub struct RawGame {
    pub game: Value,
    pub shifts: Value,
}

/// Where raw game documents come from. Caching and retention are entirely
/// the implementor's business.
pub trait GameSource: Sync {
    fn fetch(&self, game_id: &str) -> Result<RawGame>;
}

#[derive(Debug, Clone)]
pub struct CachePaths {
    pub game: PathBuf,
    pub shifts: PathBuf,
}

/// Fetch-or-download cache keeping `game_{id}.json` and `shifts_{id}.json`
/// side by side. A cached pair is only trusted once the game is final;
/// anything else is downloaded again and overwritten.
#[derive(Debug, Clone)]
pub struct CachedGameSource {
    dir: PathBuf,
    game_feed_url: String,
    shift_chart_url: String,
    timeout_secs: u64,
    offline: bool,
}

impl CachedGameSource {
    pub fn new(dir: impl Into<PathBuf>, game_feed_url: &str, shift_chart_url: &str) -> Self {
        Self {
            dir: dir.into(),
            game_feed_url: game_feed_url.to_string(),
            shift_chart_url: shift_chart_url.to_string(),
            timeout_secs: crate::config::DEFAULT_HTTP_TIMEOUT_SECS,
            offline: false,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            timeout_secs: cfg.http_timeout_secs,
            offline: cfg.offline,
            ..Self::new(&cfg.out_dir, &cfg.game_feed_url, &cfg.shift_chart_url)
        }
    }

    /// Serve from disk only; a missing pair is an error and no status check
    /// is applied.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn paths(&self, game_id: &str) -> CachePaths {
        CachePaths {
            game: self.dir.join(format!("game_{game_id}.json")),
            shifts: self.dir.join(format!("shifts_{game_id}.json")),
        }
    }

    fn load_cached(&self, game_id: &str) -> Result<Option<RawGame>> {
        let paths = self.paths(game_id);
        if !paths.game.exists() || !paths.shifts.exists() {
            return Ok(None);
        }
        let game = load_json(&paths.game)?;
        let shifts = load_json(&paths.shifts)?;
        let status = game_status(&game);
        if self.offline || status == Some(FINAL_STATE) {
            if status != Some(FINAL_STATE) {
                warn!(game_id, status = ?status, "using cached game that is not final");
            }
            return Ok(Some(RawGame { game, shifts }));
        }
        info!(game_id, status = ?status, "cached game not final, refreshing");
        Ok(None)
    }
}

impl GameSource for CachedGameSource {
    fn fetch(&self, game_id: &str) -> Result<RawGame> {
        if let Some(raw) = self.load_cached(game_id)? {
            return Ok(raw);
        }
        if self.offline {
            return Err(anyhow!("game {game_id} is not cached in {}", self.dir.display()));
        }

        let client = http_client(self.timeout_secs)?;
        let game = download_json(client, &url_for(&self.game_feed_url, game_id))
            .with_context(|| format!("fetch game feed {game_id}"))?;
        let shifts = download_json(client, &url_for(&self.shift_chart_url, game_id))
            .with_context(|| format!("fetch shift chart {game_id}"))?;

        let paths = self.paths(game_id);
        save_json(&game, &paths.game)?;
        save_json(&shifts, &paths.shifts)?;
        Ok(RawGame { game, shifts })
    }
}

pub fn load_json(path: &Path) -> Result<Value> {
    info!(path = %path.display(), "loading");
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str::<Value>(&raw).with_context(|| format!("parse {}", path.display()))
}

/// Writes through a temp file and renames it into place.
pub fn save_json<T: serde::Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    info!(path = %path.display(), "saving");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).context("serialize json")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
