//! External media tool interface.
//!
//! Audio is never decoded in-process: durations come from `ffprobe` and
//! cutting/concatenation is delegated to `ffmpeg`. The cut loop runs
//! strictly in song order because each desync correction depends on the
//! measured output of every earlier song.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use medley_core::merge::DesyncTracker;
use tracing::{debug, info};

/// Locations of the external binaries.
#[derive(Debug, Clone)]
pub struct MediaTool {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for MediaTool {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl MediaTool {
    /// Total duration of a media file in seconds.
    pub fn probe_duration(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(path)
            .output()
            .with_context(|| format!("Failed to run {}", self.ffprobe))?;

        if !output.status.success() {
            bail!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse()
            .with_context(|| format!("No duration reported for {}", path.display()))
    }

    /// Cut `duration` seconds starting at `seek` into `output`.
    pub fn cut(&self, input: &Path, output: &Path, seek: f64, duration: f64) -> Result<()> {
        let status = Command::new(&self.ffmpeg)
            .args(["-y", "-v", "error"])
            .arg("-i")
            .arg(input)
            .args(["-ss", &seek.to_string(), "-t", &duration.to_string()])
            .arg(output)
            .status()
            .with_context(|| format!("Failed to run {}", self.ffmpeg))?;

        if !status.success() {
            bail!("ffmpeg failed cutting {}", input.display());
        }
        Ok(())
    }

    /// Concatenate the segments into one audio file.
    pub fn concat(&self, segments: &[PathBuf], output: &Path) -> Result<()> {
        let mut command = Command::new(&self.ffmpeg);
        command.args(["-y", "-v", "error"]);
        for segment in segments {
            command.arg("-i").arg(segment);
        }
        let filter = format!("concat=n={}:v=0:a=1", segments.len());
        let status = command
            .args(["-filter_complex", &filter])
            .arg(output)
            .status()
            .with_context(|| format!("Failed to run {}", self.ffmpeg))?;

        if !status.success() {
            bail!("ffmpeg failed concatenating {} segments", segments.len());
        }
        Ok(())
    }
}

/// One song's cut parameters.
#[derive(Debug, Clone)]
pub struct CutJob {
    pub id: u32,
    pub input: PathBuf,
    /// Seconds skipped from the head (the corrected filler).
    pub seek: f64,
    /// Seconds of audio wanted (the corrected duration).
    pub duration: f64,
}

/// Cut every song's segment into `temp_dir`, reconciling requested and
/// measured durations song by song.
pub fn cut_segments(tool: &MediaTool, jobs: &[CutJob], temp_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut tracker = DesyncTracker::new();
    let mut pending_correction = 0.0;
    let mut segments = Vec::with_capacity(jobs.len());

    for (index, job) in jobs.iter().enumerate() {
        let requested = job.duration - pending_correction;
        pending_correction = 0.0;

        // A negative filler was already warned about by the merger; the
        // cutter can only start at the top of the file.
        let seek = job.seek.max(0.0);

        let segment = temp_dir.join(format!("{}.mp3", job.id));
        info!(id = job.id, seek, requested, "Cutting segment");
        tool.cut(&job.input, &segment, seek, requested)?;

        let actual = tool.probe_duration(&segment)?;
        tracker.record(requested, actual);
        debug!(
            id = job.id,
            actual,
            desync = tracker.accumulated(),
            "Measured segment"
        );

        if index + 1 < jobs.len()
            && let Some(correction) = tracker.take_correction()
        {
            debug!(correction, "Folding accumulated desync into the next segment");
            pending_correction = correction;
        }

        segments.push(segment);
    }

    Ok(segments)
}
