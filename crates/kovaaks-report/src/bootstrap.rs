use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use report_data::analysis::OutputLayout;

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the `report_files/` hierarchy of `layout` exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `report_files/`
/// - `report_files/imgs/`
/// - `report_files/pages/`
pub fn ensure_directories(layout: &OutputLayout) -> anyhow::Result<()> {
    std::fs::create_dir_all(&layout.report_files)?;
    std::fs::create_dir_all(&layout.imgs)?;
    std::fs::create_dir_all(&layout.pages)?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

/// Map a CLI level name onto a tracing filter directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

// ── Stats-folder discovery ─────────────────────────────────────────────────────

const STATS_SUBPATH: [&str; 5] = [
    "steamapps",
    "common",
    "FPSAimTrainer",
    "FPSAimTrainer",
    "stats",
];

/// Default Steam library on Windows.
const WINDOWS_STEAM_ROOT: &str = r"C:\Program Files (x86)\Steam";

fn stats_dir_under(steam_root: &Path) -> PathBuf {
    STATS_SUBPATH
        .iter()
        .fold(steam_root.to_path_buf(), |path, part| path.join(part))
}

/// Attempt to locate KovaaK's stats folder on the local system.
///
/// Checks the Steam libraries under the home directory first, then the
/// default Windows install. Returns `None` when none of them exists.
pub fn discover_stats_dir() -> Option<PathBuf> {
    if let Some(found) = dirs::home_dir().and_then(|home| discover_stats_dir_in(&home)) {
        return Some(found);
    }
    let windows = stats_dir_under(Path::new(WINDOWS_STEAM_ROOT));
    windows.is_dir().then_some(windows)
}

/// Probe the Steam libraries rooted at `home`:
/// 1. `~/.steam/steam/`
/// 2. `~/.local/share/Steam/`
/// 3. `~/Library/Application Support/Steam/`
pub fn discover_stats_dir_in(home: &Path) -> Option<PathBuf> {
    let candidates = [
        stats_dir_under(&home.join(".steam").join("steam")),
        stats_dir_under(&home.join(".local").join("share").join("Steam")),
        stats_dir_under(
            &home
                .join("Library")
                .join("Application Support")
                .join("Steam"),
        ),
    ];
    candidates.into_iter().find(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
