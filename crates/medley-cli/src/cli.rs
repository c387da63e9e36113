//! CLI argument definitions for medley.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::catalog::{Difficulty, SortKey};

#[derive(Parser)]
#[command(name = "medley")]
#[command(about = "Merge a set of charts and their audio into one long medley", version)]
pub struct Args {
    /// Difficulty to merge
    #[arg(value_enum)]
    pub difficulty: Difficulty,

    /// Song ids to include; every catalog song when omitted
    pub ids: Vec<u32>,

    /// Inclusive id range to add, e.g. 8:20
    #[arg(long, value_parser = parse_range, value_name = "MIN:MAX")]
    pub range: Option<(u32, u32)>,

    /// Preferred vocal version; songs lacking it fall back to their first one
    #[arg(long)]
    pub vocal: Option<String>,

    /// Skip songs that do not have the requested vocal version
    #[arg(long, requires = "vocal")]
    pub only_vocal: bool,

    /// Keep only songs whose artist field contains this text
    #[arg(long)]
    pub artist: Option<String>,

    /// Keep only songs belonging to this unit
    #[arg(long)]
    pub unit: Option<String>,

    /// Sort keys, applied right to left, e.g. level,id
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<SortKey>,

    /// Sort direction
    #[arg(long, value_enum, default_value = "ascending")]
    pub sort_dir: SortDir,

    /// What to produce
    #[arg(long, value_enum, default_value = "package")]
    pub out: OutputKind,

    /// Prefix for output file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Delete cached downloads for the selected songs instead of producing output
    #[arg(long)]
    pub delete: bool,

    /// Directory holding the catalog master data
    #[arg(long, default_value = "catalog")]
    pub catalog: PathBuf,

    /// Directory for cached downloads
    #[arg(long, default_value = "downloads")]
    pub downloads: PathBuf,

    /// Base URL chart and music assets are fetched from
    #[arg(
        long,
        env = "MEDLEY_ASSET_BASE",
        default_value = "https://storage.sekai.best/sekai-jp-assets"
    )]
    pub asset_base: String,
}

impl Args {
    /// Output file stem: `[prefix-]<difficulty>-medley`.
    pub fn output_stem(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}-{}-medley", prefix, self.difficulty),
            None => format!("{}-medley", self.difficulty),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDir {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// Merged audio plus gzipped level data
    Package,
    /// Gzipped level data only
    Level,
    /// Merged audio only
    Music,
    /// Editor-schema chart document
    Editor,
}

fn parse_range(value: &str) -> Result<(u32, u32), String> {
    let Some((min, max)) = value.split_once(':') else {
        return Err("expected MIN:MAX".to_string());
    };
    let min: u32 = min.parse().map_err(|_| format!("bad range start {min}"))?;
    let max: u32 = max.parse().map_err(|_| format!("bad range end {max}"))?;
    if min > max {
        return Err(format!("range start {min} is above its end {max}"));
    }
    Ok((min, max))
}
