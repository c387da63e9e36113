//! Song catalog: master data, asset locations, selection and ordering.
//!
//! The catalog directory holds three JSON files exported from the game's
//! master data: `songs.json`, `vocals.json` and `difficulties.json`. A
//! song is eligible for a merge when it has a chart at the requested
//! difficulty and at least one vocal version to take audio from.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// Chart difficulty tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    Master,
    Append,
}

impl Difficulty {
    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Sort key for the selected song list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Id,
    /// Play level of the chart at the requested difficulty
    Level,
    /// Release date
    Release,
}

/// Song metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntry {
    pub id: u32,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub unit: Option<String>,
    /// Lead-in silence before the first musically relevant beat.
    pub filler_sec: f64,
    pub published_at: DateTime<Utc>,
}

/// One vocal version of a song and the asset bundle carrying its audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocalEntry {
    pub song_id: u32,
    pub vocal_type: String,
    pub asset_name: String,
}

/// One playable chart of a song.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyEntry {
    pub song_id: u32,
    pub difficulty: Difficulty,
    pub play_level: u8,
}

/// A selected song: the id plus the vocal version its audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPick {
    pub id: u32,
    pub vocal_type: String,
    pub asset_name: String,
}

/// Selection filters applied while picking songs.
#[derive(Debug, Default)]
pub struct SongFilter {
    pub vocal: Option<String>,
    /// Skip songs missing the requested vocal version entirely.
    pub only_vocal: bool,
    pub artist: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    songs: Vec<SongEntry>,
    vocals: Vec<VocalEntry>,
    difficulties: Vec<DifficultyEntry>,
}

impl Catalog {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            songs: read_json(&dir.join("songs.json"))?,
            vocals: read_json(&dir.join("vocals.json"))?,
            difficulties: read_json(&dir.join("difficulties.json"))?,
        })
    }

    pub fn from_parts(
        songs: Vec<SongEntry>,
        vocals: Vec<VocalEntry>,
        difficulties: Vec<DifficultyEntry>,
    ) -> Self {
        Self {
            songs,
            vocals,
            difficulties,
        }
    }

    pub fn song(&self, id: u32) -> Option<&SongEntry> {
        self.songs.iter().find(|song| song.id == id)
    }

    pub fn all_ids(&self) -> Vec<u32> {
        self.songs.iter().map(|song| song.id).collect()
    }

    pub fn play_level(&self, id: u32, difficulty: Difficulty) -> Option<u8> {
        self.difficulties
            .iter()
            .find(|entry| entry.song_id == id && entry.difficulty == difficulty)
            .map(|entry| entry.play_level)
    }

    /// Pick the songs that can join the merge, in the order of `ids`.
    ///
    /// A song qualifies when it has a chart at `difficulty`, passes the
    /// artist/unit filters, and a vocal version can be chosen: the
    /// requested one when present, otherwise the first available one
    /// (unless `only_vocal` skips the song instead).
    pub fn select(&self, ids: &[u32], difficulty: Difficulty, filter: &SongFilter) -> Vec<SongPick> {
        ids.iter()
            .filter_map(|&id| {
                self.play_level(id, difficulty)?;
                let song = self.song(id)?;
                if let Some(artist) = &filter.artist
                    && !song
                        .artist
                        .to_lowercase()
                        .contains(&artist.to_lowercase())
                {
                    return None;
                }
                if let Some(unit) = &filter.unit
                    && song.unit.as_deref() != Some(unit.as_str())
                {
                    return None;
                }

                let options: Vec<&VocalEntry> = self
                    .vocals
                    .iter()
                    .filter(|vocal| vocal.song_id == id)
                    .collect();
                let preferred = filter
                    .vocal
                    .as_ref()
                    .and_then(|want| options.iter().find(|vocal| vocal.vocal_type == *want));
                let chosen = match preferred {
                    Some(vocal) => vocal,
                    None if filter.vocal.is_some() && filter.only_vocal => return None,
                    None => options.first()?,
                };

                Some(SongPick {
                    id,
                    vocal_type: chosen.vocal_type.clone(),
                    asset_name: chosen.asset_name.clone(),
                })
            })
            .collect()
    }

    /// Order picks by the given keys, applied right to left so the first
    /// key dominates. Sorting is stable for equal keys.
    pub fn sort_picks(
        &self,
        mut picks: Vec<SongPick>,
        difficulty: Difficulty,
        keys: &[SortKey],
        ascending: bool,
    ) -> Vec<SongPick> {
        for key in keys.iter().rev() {
            match key {
                SortKey::Id => sort_by(&mut picks, ascending, |pick| pick.id),
                SortKey::Level => sort_by(&mut picks, ascending, |pick| {
                    self.play_level(pick.id, difficulty).unwrap_or(0)
                }),
                SortKey::Release => sort_by(&mut picks, ascending, |pick| {
                    self.song(pick.id)
                        .map_or(DateTime::<Utc>::MIN_UTC, |song| song.published_at)
                }),
            }
        }
        picks
    }
}

fn sort_by<K: Ord>(picks: &mut [SongPick], ascending: bool, key: impl Fn(&SongPick) -> K) {
    picks.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse catalog file {}", path.display()))
}

/// URL of a song's chart at the given difficulty.
pub fn chart_url(base: &str, id: u32, difficulty: Difficulty) -> String {
    format!("{base}/music/music_score/{id:04}_01/{difficulty}.json")
}

/// URL of a vocal version's full-length audio.
pub fn music_url(base: &str, asset_name: &str) -> String {
    format!("{base}/music/long/{asset_name}_rip/{asset_name}.mp3")
}
