//! Editor-facing chart schema.
//!
//! Structurally different from the generic model: judgment is named per
//! note instead of flagged, every object references one shared time-scale
//! group by index, and unjudged chains are a separate `guide` object with
//! placed midpoints only.

use serde::{Deserialize, Serialize};

use crate::math::Ease;

/// Schema version stamped on serialized documents.
pub const DOCUMENT_VERSION: u32 = 2;

/// On-disk wrapper around an editor chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDocument {
    pub usc: EditorChart,
    pub version: u32,
}

impl ChartDocument {
    pub fn new(usc: EditorChart) -> Self {
        Self {
            usc,
            version: DOCUMENT_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorChart {
    pub offset: f64,
    pub objects: Vec<EditorObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorObject {
    Bpm(EditorBpm),
    TimeScaleGroup(EditorTimeScaleGroup),
    Single(EditorSingle),
    Slide(EditorSlide),
    Guide(EditorGuide),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorBpm {
    pub beat: f64,
    pub bpm: f64,
}

/// The single global scroll-speed group; notes reference it by index 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorTimeScaleGroup {
    pub changes: Vec<EditorTimeScalePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorTimeScalePoint {
    pub beat: f64,
    pub time_scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSingle {
    pub beat: f64,
    pub lane: f64,
    pub size: f64,
    pub critical: bool,
    pub trace: bool,
    pub time_scale_group: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSlide {
    pub critical: bool,
    pub connections: Vec<EditorConnection>,
}

/// One note of a judged chain in the editor schema.
///
/// `Tick` carries `critical: None` when the note is eased but unjudged.
/// `Attach` notes are judged without easing of their own, but the editor
/// still expects lane/size/ease to be populated; the converter synthesizes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorConnection {
    #[serde(rename_all = "camelCase")]
    Start {
        beat: f64,
        critical: bool,
        ease: Ease,
        judge_type: JudgeType,
        lane: f64,
        size: f64,
        time_scale_group: u32,
    },
    #[serde(rename_all = "camelCase")]
    End {
        beat: f64,
        critical: bool,
        judge_type: JudgeType,
        lane: f64,
        size: f64,
        time_scale_group: u32,
    },
    #[serde(rename_all = "camelCase")]
    Tick {
        beat: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        critical: Option<bool>,
        ease: Ease,
        lane: f64,
        size: f64,
        time_scale_group: u32,
    },
    #[serde(rename_all = "camelCase")]
    Attach {
        beat: f64,
        critical: bool,
        ease: Ease,
        lane: f64,
        size: f64,
        time_scale_group: u32,
    },
}

impl EditorConnection {
    pub fn beat(&self) -> f64 {
        match self {
            EditorConnection::Start { beat, .. }
            | EditorConnection::End { beat, .. }
            | EditorConnection::Tick { beat, .. }
            | EditorConnection::Attach { beat, .. } => *beat,
        }
    }
}

/// How a note scores when hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeType {
    Normal,
    Trace,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorGuide {
    pub color: GuideColor,
    pub fade: GuideFade,
    pub midpoints: Vec<GuideMidpoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideColor {
    Green,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideFade {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideMidpoint {
    pub beat: f64,
    pub lane: f64,
    pub size: f64,
    pub ease: Ease,
    pub time_scale_group: u32,
}
