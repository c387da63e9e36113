use serde::{Deserialize, Serialize};

use super::Connection;

/// One parsed chart: a named sequence of timed objects sharing a global
/// audio offset (seconds) and a tempo map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chart {
    /// Seconds between audio start and beat zero.
    #[serde(default)]
    pub offset: f64,
    pub objects: Vec<ChartObject>,
}

impl Chart {
    /// Tempo markers in ascending beat order.
    ///
    /// Insertion order of markers is not guaranteed by parsers, so callers
    /// that convert between beats and seconds must go through this.
    pub fn sorted_tempo_markers(&self) -> Vec<&BpmChange> {
        let mut markers: Vec<&BpmChange> = self
            .objects
            .iter()
            .filter_map(|obj| match obj {
                ChartObject::Bpm(bpm) => Some(bpm),
                _ => None,
            })
            .collect();
        markers.sort_by(|a, b| a.beat.total_cmp(&b.beat));
        markers
    }
}

/// Any playable object of a chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChartObject {
    Bpm(BpmChange),
    TimeScale(TimeScaleChange),
    Single(SingleNote),
    Slide(Slide),
}

impl ChartObject {
    /// Shift every beat of this object forward by `delta` beats.
    pub fn shift_beat(&mut self, delta: f64) {
        match self {
            ChartObject::Bpm(bpm) => bpm.beat += delta,
            ChartObject::TimeScale(scale) => scale.beat += delta,
            ChartObject::Single(single) => single.beat += delta,
            ChartObject::Slide(slide) => {
                for conn in &mut slide.connections {
                    conn.shift_beat(delta);
                }
            }
        }
    }
}

/// Declares `bpm` effective from `beat` until the next marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmChange {
    pub beat: f64,
    pub bpm: f64,
}

/// Scroll-speed change, grouped globally by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeScaleChange {
    pub beat: f64,
    pub time_scale: f64,
}

/// A single hit note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleNote {
    pub beat: f64,
    pub lane: f64,
    pub size: f64,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub trace: bool,
}

/// An ordered chain of connection notes describing one continuous gesture.
///
/// `active` slides are judged; inactive chains are guides whose midpoints
/// are never judged. The chain exclusively owns its connections and their
/// order is the path the player's finger travels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub active: bool,
    #[serde(default)]
    pub critical: bool,
    pub connections: Vec<Connection>,
}
