//! Command-line settings and the remembered paths that fill in whatever the
//! command line leaves out.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReportError, Result};

/// Playlist catalog used when neither the command line nor a previous run
/// names one.
pub const DEFAULT_PLAYLISTS: &str = "resources/playlists.json";

/// Output root used when neither the command line nor a previous run names
/// one.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

// ── Settings (CLI) ────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kovaaks-report",
    about = "Per-scenario trend reports from KovaaK's session stats",
    version
)]
pub struct Settings {
    /// KovaaK's stats folder (remembered; auto-detected if never given)
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,

    /// Playlist catalog mapping rank tiers to scenarios [default: resources/playlists.json]
    #[arg(long)]
    pub playlists: Option<PathBuf>,

    /// Folder the report_files tree is written into [default: .]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Only build these tiers (repeatable)
    #[arg(long, value_parser = ["iron", "bronze", "silver", "gold", "platinum", "diamond", "jade", "master", "grandmaster"])]
    pub rank: Vec<String>,

    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Shorthand for --log-level DEBUG
    #[arg(long)]
    pub debug: bool,

    /// Forget remembered paths before running
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// Effective log level; `--debug` wins over `--log-level`.
    pub fn log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    pub fn playlists_path(&self) -> PathBuf {
        self.playlists
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYLISTS))
    }

    pub fn output_root(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Fill paths missing from the command line with the ones `store`
    /// remembers, then remember the result for the next run.
    ///
    /// With `--clear` the store is emptied first and nothing is filled in.
    pub fn apply_remembered(&mut self, store: &PrefsStore) -> Result<()> {
        if self.clear {
            store.clear()?;
            debug!("Cleared remembered paths at {}", store.path().display());
        } else {
            store.load().fill_gaps(self);
        }
        store.save(&RememberedPaths::from(&*self))
    }

    /// Adopt a stats folder found by auto-detection and remember it along
    /// with the other paths.
    pub fn remember_stats_dir(&mut self, dir: PathBuf, store: &PrefsStore) -> Result<()> {
        self.stats_dir = Some(dir);
        store.save(&RememberedPaths::from(&*self))
    }
}

// ── RememberedPaths ───────────────────────────────────────────────────────────

/// Paths carried over between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlists: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl RememberedPaths {
    fn fill_gaps(self, settings: &mut Settings) {
        settings.stats_dir = settings.stats_dir.take().or(self.stats_dir);
        settings.playlists = settings.playlists.take().or(self.playlists);
        settings.output_dir = settings.output_dir.take().or(self.output_dir);
    }
}

impl From<&Settings> for RememberedPaths {
    fn from(settings: &Settings) -> Self {
        Self {
            stats_dir: settings.stats_dir.clone(),
            playlists: settings.playlists.clone(),
            output_dir: settings.output_dir.clone(),
        }
    }
}

// ── PrefsStore ────────────────────────────────────────────────────────────────

/// JSON file holding [`RememberedPaths`], by default
/// `~/.kovaaks-report/last_used.json`.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn default_location() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::in_dir(&home)
    }

    /// Store under `<base>/.kovaaks-report/`.
    pub fn in_dir(base: &Path) -> Self {
        Self {
            path: base.join(".kovaaks-report").join("last_used.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remembered paths; empty when the file is missing or unreadable.
    pub fn load(&self) -> RememberedPaths {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return RememberedPaths::default();
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring corrupt {}: {}", self.path.display(), e);
            RememberedPaths::default()
        })
    }

    /// Replace the stored paths. The file is written beside its target and
    /// renamed over it.
    pub fn save(&self, paths: &RememberedPaths) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            ReportError::Config(format!("{} has no parent folder", self.path.display()))
        })?;
        std::fs::create_dir_all(dir)?;

        let staged = self.path.with_extension("json.tmp");
        std::fs::write(&staged, serde_json::to_vec_pretty(paths)?)?;
        std::fs::rename(&staged, &self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
