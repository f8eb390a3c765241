mod bootstrap;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use report_core::playlists::{PlaylistCatalog, Rank};
use report_core::settings::{PrefsStore, Settings};
use report_data::aggregator::AggregatorConfig;
use report_data::analysis::{build_rank_report, OutputLayout, ReportIndex};
use report_data::reader::StatsIndex;
use serde::Serialize;

fn main() -> Result<()> {
    let mut settings = Settings::parse();

    bootstrap::setup_logging(settings.log_level())?;

    tracing::info!("KovaaK's Report v{} starting", env!("CARGO_PKG_VERSION"));

    let store = PrefsStore::default_location();
    if let Err(e) = settings.apply_remembered(&store) {
        tracing::warn!("Could not update remembered paths: {}", e);
    }

    let layout = OutputLayout::new(&settings.output_root());
    bootstrap::ensure_directories(&layout)?;

    let stats_dir = match settings.stats_dir.clone() {
        Some(dir) => dir,
        None => {
            let dir = bootstrap::discover_stats_dir()
                .context("no stats folder found; pass --stats-dir")?;
            if let Err(e) = settings.remember_stats_dir(dir.clone(), &store) {
                tracing::warn!("Could not remember stats folder: {}", e);
            }
            dir
        }
    };
    tracing::info!("Stats folder: {}", stats_dir.display());

    let index = StatsIndex::scan(&stats_dir)?;
    tracing::info!(
        "Indexed {} session logs across {} scenarios",
        index.len(),
        index.scenario_names().len()
    );

    let playlists = settings.playlists_path();
    let catalog = PlaylistCatalog::load(&playlists)
        .with_context(|| format!("loading playlists from {}", playlists.display()))?;

    let selected = settings
        .rank
        .iter()
        .map(|name| name.parse::<Rank>())
        .collect::<Result<Vec<_>, _>>()?;
    for rank in &selected {
        if catalog.rank(*rank).is_none() {
            tracing::warn!("Rank {} is not defined in the playlist catalog", rank);
        }
    }

    let now = chrono::Local::now().naive_local();
    let config = AggregatorConfig::default();
    let mut nav = ReportIndex::new(now);

    for (rank, playlist) in catalog.ranks() {
        if !selected.is_empty() && !selected.contains(&rank) {
            continue;
        }

        let report = build_rank_report(rank, playlist, &index, &config, &layout, now)?;
        let page = layout.page_path(rank);
        write_json(&page, &report)?;
        tracing::debug!("Wrote {}", page.display());
        nav.add(&report);
    }

    write_json(&layout.index_path(), &nav)?;
    tracing::info!(
        "Wrote {} rank pages to {}",
        nav.pages.len(),
        layout.report_files.display()
    );

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
