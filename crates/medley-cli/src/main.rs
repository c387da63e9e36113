mod audio;
mod cache;
mod catalog;
mod cli;
mod output;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Parser;
use medley_core::convert::{ChartDocument, convert_chart};
use medley_core::merge::{MergeOutcome, SongSource, merge_charts};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::audio::{CutJob, MediaTool, cut_segments};
use crate::cache::DownloadCache;
use crate::catalog::{Catalog, SongFilter, SongPick, chart_url, music_url};
use crate::cli::{Args, OutputKind, SortDir};

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("medley_cli=info,medley_core=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    let catalog = Catalog::load(&args.catalog)?;
    let picks = select_songs(&args, &catalog)?;
    info!(songs = picks.len(), "Selected songs");

    let mut cache = DownloadCache::open(&args.downloads);

    if args.delete {
        let entries: Vec<(u32, String)> = picks
            .iter()
            .map(|pick| (pick.id, pick.vocal_type.clone()))
            .collect();
        let removed = cache.remove(&entries, args.difficulty)?;
        cache.save()?;
        info!(removed, "Deleted cached downloads");
        return Ok(());
    }

    // Save the bookkeeping even when a fetch fails partway, so the songs
    // that did arrive are not downloaded again next run.
    let fetched = fetch_missing(&args, &mut cache, &picks);
    cache.save()?;
    fetched?;

    let tool = MediaTool::default();
    let songs = load_songs(&args, &catalog, &cache, &tool, &picks)?;

    info!("Merging charts");
    let outcome = merge_charts(songs)?;

    let stem = args.output_stem();
    match args.out {
        OutputKind::Level => write_level(&stem, &outcome)?,
        OutputKind::Editor => write_editor(&stem, &outcome)?,
        OutputKind::Music => write_music(&cache, &tool, &picks, &outcome, &stem)?,
        OutputKind::Package => {
            write_music(&cache, &tool, &picks, &outcome, &stem)?;
            write_level(&stem, &outcome)?;
        }
    }

    Ok(())
}

fn select_songs(args: &Args, catalog: &Catalog) -> Result<Vec<SongPick>> {
    let mut ids = args.ids.clone();
    if let Some((min, max)) = args.range {
        ids.extend(min..=max);
    }
    if ids.is_empty() {
        ids = catalog.all_ids();
    }

    let filter = SongFilter {
        vocal: args.vocal.clone(),
        only_vocal: args.only_vocal,
        artist: args.artist.clone(),
        unit: args.unit.clone(),
    };
    let picks = catalog.select(&ids, args.difficulty, &filter);
    let picks = catalog.sort_picks(
        picks,
        args.difficulty,
        &args.sort,
        args.sort_dir == SortDir::Ascending,
    );

    if picks.is_empty() {
        bail!("No songs match the requested difficulty and filters");
    }
    Ok(picks)
}

fn fetch_missing(args: &Args, cache: &mut DownloadCache, picks: &[SongPick]) -> Result<()> {
    for pick in picks {
        cache.ensure_chart(
            &chart_url(&args.asset_base, pick.id, args.difficulty),
            args.difficulty,
            pick.id,
        )?;
        cache.ensure_music(
            &music_url(&args.asset_base, &pick.asset_name),
            &pick.vocal_type,
            pick.id,
        )?;
    }
    Ok(())
}

fn load_songs(
    args: &Args,
    catalog: &Catalog,
    cache: &DownloadCache,
    tool: &MediaTool,
    picks: &[SongPick],
) -> Result<Vec<SongSource>> {
    picks
        .iter()
        .map(|pick| {
            let chart = output::read_chart(&cache.chart_path(args.difficulty, pick.id))?;
            let duration = tool.probe_duration(&cache.music_path(&pick.vocal_type, pick.id))?;
            let filler = catalog.song(pick.id).map_or(0.0, |song| song.filler_sec);
            Ok(SongSource {
                chart,
                duration,
                filler,
            })
        })
        .collect()
}

fn write_level(stem: &str, outcome: &MergeOutcome) -> Result<()> {
    let path = format!("{stem}.gz");
    output::write_level_data(Path::new(&path), &outcome.chart)?;
    info!("Wrote level data to {path}");
    Ok(())
}

fn write_editor(stem: &str, outcome: &MergeOutcome) -> Result<()> {
    let editor = convert_chart(&outcome.chart)?;
    let path = format!("{stem}.usc");
    output::write_editor_chart(Path::new(&path), &ChartDocument::new(editor))?;
    info!("Wrote editor chart to {path}");
    Ok(())
}

fn write_music(
    cache: &DownloadCache,
    tool: &MediaTool,
    picks: &[SongPick],
    outcome: &MergeOutcome,
    stem: &str,
) -> Result<()> {
    let temp_dir = PathBuf::from("temp");
    fs::create_dir_all(&temp_dir)?;

    let jobs: Vec<CutJob> = picks
        .iter()
        .enumerate()
        .map(|(index, pick)| CutJob {
            id: pick.id,
            input: cache.music_path(&pick.vocal_type, pick.id),
            seek: outcome.fillers[index],
            duration: outcome.durations[index],
        })
        .collect();

    info!("Cutting audio segments");
    let segments = cut_segments(tool, &jobs, &temp_dir)?;

    info!("Concatenating audio (this may take a while)");
    let path = format!("{stem}.mp3");
    tool.concat(&segments, Path::new(&path))?;
    let _ = fs::remove_dir_all(&temp_dir);

    info!("Wrote merged audio to {path}");
    Ok(())
}
