//! Note-graph converter.
//!
//! Re-targets a merged generic chart into the editor schema: judgment
//! types become named, every time-scale change joins one shared group,
//! unplaced attach notes get estimated positions, and chains missing an
//! endpoint either synthesize one from an `ignore` note or fail.

mod schema;

pub use schema::*;

use tracing::warn;

use crate::chart::{Chart, ChartObject, Connection, SingleNote, Slide};
use crate::error::{Error, Result};
use crate::math::{Ease, distance, midpoint, round_to};

/// Index of the shared time-scale group every converted note references.
const SHARED_GROUP: u32 = 0;

/// Estimated attach positions snap to this fraction of a lane unit.
const PLACEMENT_SNAP: f64 = 16.0;

/// Convert a generic chart into the editor schema.
///
/// Fails on structurally broken slides (no start/end could be established,
/// or an attach note lacks a placed anchor on either side); everything
/// recoverable is warned and skipped instead.
pub fn convert_chart(chart: &Chart) -> Result<EditorChart> {
    let changes: Vec<EditorTimeScalePoint> = chart
        .objects
        .iter()
        .filter_map(|obj| match obj {
            ChartObject::TimeScale(scale) => Some(EditorTimeScalePoint {
                beat: scale.beat,
                time_scale: scale.time_scale,
            }),
            _ => None,
        })
        .collect();

    let mut objects = Vec::with_capacity(chart.objects.len() + 1);
    objects.push(EditorObject::TimeScaleGroup(EditorTimeScaleGroup {
        changes,
    }));

    for obj in &chart.objects {
        match obj {
            ChartObject::Bpm(bpm) => objects.push(EditorObject::Bpm(EditorBpm {
                beat: bpm.beat,
                bpm: bpm.bpm,
            })),
            // Already collected into the shared group.
            ChartObject::TimeScale(_) => {}
            ChartObject::Single(single) => {
                objects.push(EditorObject::Single(convert_single(single)));
            }
            ChartObject::Slide(slide) if slide.active => {
                objects.push(EditorObject::Slide(convert_slide(slide)?));
            }
            ChartObject::Slide(guide) => {
                objects.push(EditorObject::Guide(convert_guide(guide)));
            }
        }
    }

    Ok(EditorChart {
        offset: chart.offset,
        objects,
    })
}

fn convert_single(single: &SingleNote) -> EditorSingle {
    EditorSingle {
        beat: single.beat,
        lane: single.lane,
        size: single.size,
        critical: single.critical,
        trace: single.trace,
        time_scale_group: SHARED_GROUP,
    }
}

/// Progress of a judged chain toward owning both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    NoStart,
    HaveStart,
    Complete,
}

fn convert_slide(slide: &Slide) -> Result<EditorSlide> {
    let conns = &slide.connections;
    let mut out = Vec::with_capacity(conns.len());
    let mut state = ChainState::NoStart;

    for (index, conn) in conns.iter().enumerate() {
        let is_last = index + 1 == conns.len();
        match *conn {
            Connection::Start {
                beat,
                lane,
                size,
                ease,
                critical,
                trace,
            } => {
                out.push(EditorConnection::Start {
                    beat,
                    critical,
                    ease,
                    judge_type: judge_for(trace),
                    lane,
                    size,
                    time_scale_group: SHARED_GROUP,
                });
                if state == ChainState::NoStart {
                    state = ChainState::HaveStart;
                }
            }
            Connection::End {
                beat,
                lane,
                size,
                critical,
                trace,
            } => {
                out.push(EditorConnection::End {
                    beat,
                    critical,
                    judge_type: judge_for(trace),
                    lane,
                    size,
                    time_scale_group: SHARED_GROUP,
                });
                if state == ChainState::HaveStart {
                    state = ChainState::Complete;
                }
            }
            Connection::Ignore {
                beat,
                lane,
                size,
                ease,
            } => match state {
                // A chain always needs a start; this note takes the role.
                ChainState::NoStart => {
                    out.push(EditorConnection::Start {
                        beat,
                        critical: false,
                        ease,
                        judge_type: JudgeType::None,
                        lane,
                        size,
                        time_scale_group: SHARED_GROUP,
                    });
                    state = ChainState::HaveStart;
                }
                // Terminal note with no end assigned; there is nothing
                // left to ease into, so the ease is dropped with the role.
                ChainState::HaveStart if is_last => {
                    out.push(EditorConnection::End {
                        beat,
                        critical: false,
                        judge_type: JudgeType::None,
                        lane,
                        size,
                        time_scale_group: SHARED_GROUP,
                    });
                    state = ChainState::Complete;
                }
                _ => out.push(EditorConnection::Tick {
                    beat,
                    critical: None,
                    ease,
                    lane,
                    size,
                    time_scale_group: SHARED_GROUP,
                }),
            },
            Connection::Tick {
                beat,
                lane,
                size,
                ease,
                critical,
            } => {
                out.push(EditorConnection::Tick {
                    beat,
                    critical: Some(critical),
                    ease,
                    lane,
                    size,
                    time_scale_group: SHARED_GROUP,
                });
            }
            Connection::Attach { beat, critical } => {
                let (lane, size, ease) = estimate_attach(conns, index, beat)?;
                out.push(EditorConnection::Attach {
                    beat,
                    critical,
                    ease,
                    lane,
                    size,
                    time_scale_group: SHARED_GROUP,
                });
            }
            Connection::Hidden { beat } => {
                warn!(beat, "Dropping hidden connection from judged slide");
            }
        }
    }

    if state != ChainState::Complete {
        return Err(Error::SlideWithoutEndpoints);
    }

    Ok(EditorSlide {
        critical: slide.critical,
        connections: out,
    })
}

fn judge_for(trace: bool) -> JudgeType {
    if trace { JudgeType::Trace } else { JudgeType::Normal }
}

/// A placed chain note an attach can interpolate against.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    beat: f64,
    lane: f64,
    size: f64,
    ease: Ease,
}

fn anchor_from(conn: &Connection) -> Option<Anchor> {
    match *conn {
        Connection::Start {
            beat,
            lane,
            size,
            ease,
            ..
        }
        | Connection::Tick {
            beat,
            lane,
            size,
            ease,
            ..
        }
        | Connection::Ignore {
            beat,
            lane,
            size,
            ease,
        } => Some(Anchor {
            beat,
            lane,
            size,
            ease,
        }),
        _ => None,
    }
}

fn anchor_to(conn: &Connection) -> Option<Anchor> {
    match *conn {
        Connection::End {
            beat, lane, size, ..
        } => Some(Anchor {
            beat,
            lane,
            size,
            ease: Ease::Linear,
        }),
        _ => anchor_from(conn),
    }
}

/// Estimate an attach note's lane and size from its neighbors.
///
/// The two edge extents (`lane ± size/2`) of the nearest placed anchors
/// are interpolated with the earlier anchor's easing curve at this note's
/// beat fraction, then the resulting lane and half-width snap to 1/16.
/// The estimate is display-quality only, but deterministic.
fn estimate_attach(conns: &[Connection], index: usize, beat: f64) -> Result<(f64, f64, Ease)> {
    let from = conns[..index].iter().rev().find_map(anchor_from);
    let to = conns[index + 1..].iter().find_map(anchor_to);
    let (Some(from), Some(to)) = (from, to) else {
        return Err(Error::AttachWithoutAnchor { beat });
    };

    let span = to.beat - from.beat;
    // Coincident anchor beats would divide by zero; pin to the earlier
    // anchor instead.
    let progress = if span == 0.0 {
        0.0
    } else {
        (beat - from.beat) / span
    };

    let left = from.ease.interpolate(
        from.lane - from.size / 2.0,
        to.lane - to.size / 2.0,
        progress,
    );
    let right = from.ease.interpolate(
        from.lane + from.size / 2.0,
        to.lane + to.size / 2.0,
        progress,
    );

    let lane = round_to(midpoint(left, right), PLACEMENT_SNAP);
    let half_width = round_to(distance(left, right) / 2.0, PLACEMENT_SNAP);
    Ok((lane, half_width * 2.0, from.ease))
}

fn convert_guide(guide: &Slide) -> EditorGuide {
    let mut midpoints = Vec::with_capacity(guide.connections.len());
    for conn in &guide.connections {
        match *conn {
            Connection::Ignore {
                beat,
                lane,
                size,
                ease,
            } => midpoints.push(GuideMidpoint {
                beat,
                lane,
                size,
                ease,
                time_scale_group: SHARED_GROUP,
            }),
            ref other => warn!(
                role = other.role_name(),
                beat = other.beat(),
                "Dropping non-midpoint connection from guide"
            ),
        }
    }

    EditorGuide {
        color: if guide.critical {
            GuideColor::Yellow
        } else {
            GuideColor::Green
        },
        fade: GuideFade::Out,
        midpoints,
    }
}
