//! On-disk download cache.
//!
//! Fetched charts and audio live under the cache root, one directory per
//! difficulty or vocal type, with a `downloads.json` bookkeeping file
//! recording what is already present so reruns skip the network entirely.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Difficulty;

const BOOKKEEPING_FILE: &str = "downloads.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Serialize, Deserialize)]
struct DownloadInfo {
    /// Downloaded audio ids per vocal type.
    #[serde(default)]
    songs: HashMap<String, Vec<u32>>,
    /// Downloaded chart ids per difficulty.
    #[serde(default)]
    charts: HashMap<String, Vec<u32>>,
}

pub struct DownloadCache {
    root: PathBuf,
    info: DownloadInfo,
    agent: ureq::Agent,
}

impl DownloadCache {
    pub fn open(root: &Path) -> Self {
        let info = match fs::read_to_string(root.join(BOOKKEEPING_FILE)) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|error| {
                warn!(%error, "Download bookkeeping is unreadable; starting fresh");
                DownloadInfo::default()
            }),
            Err(_) => DownloadInfo::default(),
        };

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build();

        Self {
            root: root.to_path_buf(),
            info,
            agent: config.into(),
        }
    }

    /// Persist the bookkeeping file. Call after a batch of fetches so a
    /// partially failed batch still records its successes.
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let text = serde_json::to_string(&self.info)?;
        fs::write(self.root.join(BOOKKEEPING_FILE), text)
            .context("Failed to write download bookkeeping")?;
        Ok(())
    }

    pub fn music_path(&self, vocal_type: &str, id: u32) -> PathBuf {
        self.root.join(vocal_type).join(format!("{id}.mp3"))
    }

    pub fn chart_path(&self, difficulty: Difficulty, id: u32) -> PathBuf {
        self.root
            .join(difficulty.short_name())
            .join(format!("{id}.json"))
    }

    /// Fetch a song's audio unless it is already cached.
    pub fn ensure_music(&mut self, url: &str, vocal_type: &str, id: u32) -> Result<PathBuf> {
        let path = self.music_path(vocal_type, id);
        let recorded = self.info.songs.entry(vocal_type.to_string()).or_default();
        if recorded.contains(&id) && path.exists() {
            return Ok(path);
        }

        fetch_to_file(&self.agent, url, &path)
            .with_context(|| format!("Failed to fetch music for song {id} ({vocal_type})"))?;
        if !recorded.contains(&id) {
            recorded.push(id);
        }
        info!(id, vocal_type, "Saved song audio");
        Ok(path)
    }

    /// Fetch a song's chart unless it is already cached.
    pub fn ensure_chart(&mut self, url: &str, difficulty: Difficulty, id: u32) -> Result<PathBuf> {
        let path = self.chart_path(difficulty, id);
        let recorded = self
            .info
            .charts
            .entry(difficulty.short_name().to_string())
            .or_default();
        if recorded.contains(&id) && path.exists() {
            return Ok(path);
        }

        fetch_to_file(&self.agent, url, &path)
            .with_context(|| format!("Failed to fetch {difficulty} chart for song {id}"))?;
        if !recorded.contains(&id) {
            recorded.push(id);
        }
        info!(id, %difficulty, "Saved chart");
        Ok(path)
    }

    /// Drop the given songs' cached audio and charts. Returns how many
    /// files were actually deleted.
    pub fn remove(
        &mut self,
        picks: &[(u32, String)],
        difficulty: Difficulty,
    ) -> Result<usize> {
        let mut removed = 0;

        for (id, vocal_type) in picks {
            if let Some(recorded) = self.info.songs.get_mut(vocal_type) {
                recorded.retain(|entry| entry != id);
            }
            let path = self.music_path(vocal_type, *id);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
                removed += 1;
            }

            if let Some(recorded) = self.info.charts.get_mut(difficulty.short_name()) {
                recorded.retain(|entry| entry != id);
            }
            let path = self.chart_path(difficulty, *id);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

fn fetch_to_file(agent: &ureq::Agent, url: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut response = agent
        .get(url)
        .call()
        .with_context(|| format!("Request failed for {url}"))?;

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut reader = response.body_mut().as_reader();
    io::copy(&mut reader, &mut file)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
