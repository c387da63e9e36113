//! Timeline merger.
//!
//! Splices several independently timed charts into one continuous beat
//! timeline: each song contributes a whole-bar beat span derived from its
//! tempo map and usable audio, and every object is shifted by the running
//! beat offset of the songs before it. The seconds-side corrections
//! (trimmed tails, filler debits) are returned so the caller can cut audio
//! that stays aligned with the merged chart.

mod desync;

pub use desync::*;

use tracing::warn;

use crate::chart::{Chart, ChartObject};
use crate::error::{Error, Result};
use crate::math::round_to;

/// Tick resolution used for merge-time beat accounting.
pub const TICKS_PER_BEAT: i64 = 480;

/// Playable beat counts snap down to this boundary (1/8 beat).
const SNAP_TICKS: i64 = TICKS_PER_BEAT / 8;

/// Whole-bar span in ticks, assuming 4/4.
const BAR_TICKS: i64 = TICKS_PER_BEAT * 4;

/// One source song: a parsed chart plus its audio accounting.
#[derive(Debug, Clone)]
pub struct SongSource {
    pub chart: Chart,
    /// Total audio duration in seconds.
    pub duration: f64,
    /// Lead-in filler in seconds before the first musically relevant beat.
    pub filler: f64,
}

/// Result of a merge: one chart plus corrected per-song audio accounting.
///
/// `durations` and `fillers` are index-aligned with the input songs and are
/// what the audio cutter should be handed (seek = filler, length =
/// duration).
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub chart: Chart,
    pub durations: Vec<f64>,
    pub fillers: Vec<f64>,
}

/// Beat span one song contributes to the merged timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SongSpan {
    /// Playable beats within the audio, snapped down to the 1/8-beat grid,
    /// in ticks.
    pub beat_count: i64,
    /// Padding up to the next whole bar, in ticks.
    pub beat_pad: i64,
    /// Seconds of tail audio discarded by the snap.
    pub trimmed: f64,
    /// Tempo in effect at the end of the song.
    pub last_bpm: f64,
}

impl SongSpan {
    /// Whole-bar beat total, in ticks.
    pub fn beat_total(&self) -> i64 {
        self.beat_count + self.beat_pad
    }

    /// The padding expressed in seconds at the song's final tempo.
    pub fn pad_secs(&self) -> f64 {
        beats_to_secs(self.last_bpm, ticks_to_beats(self.beat_pad))
    }
}

/// Plan the beat span a chart can fill within `audio_span` seconds.
///
/// Walks the tempo markers in ascending beat order, spending the span
/// between consecutive markers at the earlier marker's tempo; whatever
/// remains converts to beats at the last marker's tempo. The fractional
/// remainder above the 1/8-beat snap is converted back to seconds (rounded
/// to millisecond precision) and reported as `trimmed`.
pub fn plan_song(chart: &Chart, audio_span: f64) -> Result<SongSpan> {
    let (max_beat, last_bpm) = max_beat_within(chart, audio_span)?;

    let snapped_ticks = floor_ticks(max_beat, SNAP_TICKS);
    let remainder_beats = max_beat - ticks_to_beats(snapped_ticks);
    let trimmed = round_to(beats_to_secs(last_bpm, remainder_beats), 1000.0);

    let beat_pad = (BAR_TICKS - snapped_ticks.rem_euclid(BAR_TICKS)) % BAR_TICKS;

    Ok(SongSpan {
        beat_count: snapped_ticks,
        beat_pad,
        trimmed,
        last_bpm,
    })
}

fn max_beat_within(chart: &Chart, audio_span: f64) -> Result<(f64, f64)> {
    let markers = chart.sorted_tempo_markers();
    let Some(last) = markers.last() else {
        return Err(Error::MissingTempo);
    };

    let mut remaining = audio_span;
    for pair in markers.windows(2) {
        let beats_passed = pair[1].beat - pair[0].beat;
        remaining -= beats_to_secs(pair[0].bpm, beats_passed);
    }

    let extra_beats = secs_to_beats(last.bpm, remaining);
    if extra_beats <= 0.0 {
        warn!(
            remaining_secs = remaining,
            "Audio span ends before the last tempo marker"
        );
    }
    Ok((last.beat + extra_beats, last.bpm))
}

/// Running state of a merge, folded over the song sequence.
///
/// Keeping the offset and the correction lists in one record (instead of
/// ambient mutable state) lets any prefix of songs be merged and inspected
/// in isolation.
#[derive(Debug, Default)]
pub struct MergeAccumulator {
    tick_offset: i64,
    pending_filler_debit: f64,
    objects: Vec<ChartObject>,
    durations: Vec<f64>,
    fillers: Vec<f64>,
}

impl MergeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Beat offset the next song's objects would be shifted by.
    pub fn beat_offset(&self) -> f64 {
        ticks_to_beats(self.tick_offset)
    }

    /// Fold one song into the merged timeline.
    ///
    /// `has_next` decides where padding seconds go: with a following song
    /// they are debited from its filler (the pad beats play during that
    /// song's lead-in); for the terminal song the pad only lengthens the
    /// merged beat total.
    pub fn fold(mut self, song: SongSource, has_next: bool) -> Result<Self> {
        let SongSource {
            mut chart,
            duration,
            filler,
        } = song;

        let span = plan_song(&chart, duration - filler)?;

        self.durations.push(duration - span.trimmed);

        let corrected_filler = filler - self.pending_filler_debit;
        if corrected_filler < 0.0 {
            warn!(
                filler = corrected_filler,
                "Filler went negative; audio is shorter than its required lead-in"
            );
        }
        self.fillers.push(corrected_filler);

        self.pending_filler_debit = if span.beat_pad > 0 && has_next {
            span.pad_secs()
        } else {
            0.0
        };

        if chart.offset != 0.0 {
            warn!(
                offset = chart.offset,
                "Chart declares a nonzero offset; only the first song's offset is kept"
            );
        }

        let delta = self.beat_offset();
        for obj in &mut chart.objects {
            obj.shift_beat(delta);
        }
        self.objects.append(&mut chart.objects);
        self.tick_offset += span.beat_total();

        Ok(self)
    }

    /// Finish the fold: order objects by type precedence and wrap up the
    /// corrected audio accounting.
    pub fn finish(mut self, offset: f64) -> MergeOutcome {
        // Stable, so objects of one kind keep their insertion order.
        self.objects.sort_by_key(type_precedence);
        MergeOutcome {
            chart: Chart {
                offset,
                objects: self.objects,
            },
            durations: self.durations,
            fillers: self.fillers,
        }
    }
}

/// Merge charts in order into one continuous timeline.
///
/// The merged chart keeps the first song's global offset. Encoders reading
/// the result see all tempo information before any positional objects at
/// equal beats, since the object list is sorted by type precedence.
pub fn merge_charts(songs: Vec<SongSource>) -> Result<MergeOutcome> {
    let offset = songs.first().map_or(0.0, |song| song.chart.offset);
    let count = songs.len();

    let mut acc = MergeAccumulator::new();
    for (index, song) in songs.into_iter().enumerate() {
        acc = acc.fold(song, index + 1 < count)?;
    }
    Ok(acc.finish(offset))
}

fn type_precedence(obj: &ChartObject) -> u8 {
    match obj {
        ChartObject::Bpm(_) => 0,
        ChartObject::TimeScale(_) => 1,
        ChartObject::Single(_) => 2,
        ChartObject::Slide(_) => 3,
    }
}

fn beats_to_secs(bpm: f64, beats: f64) -> f64 {
    beats * 60.0 / bpm
}

fn secs_to_beats(bpm: f64, secs: f64) -> f64 {
    bpm * secs / 60.0
}

fn ticks_to_beats(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_BEAT as f64
}

fn floor_ticks(beats: f64, boundary: i64) -> i64 {
    let steps = (beats * TICKS_PER_BEAT as f64 / boundary as f64).floor() as i64;
    steps * boundary
}
