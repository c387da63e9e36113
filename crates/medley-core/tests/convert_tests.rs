//! Integration tests for the note-graph converter.

use medley_core::chart::{
    BpmChange, Chart, ChartObject, Connection, SingleNote, Slide, TimeScaleChange,
};
use medley_core::convert::{
    EditorConnection, EditorObject, GuideColor, GuideFade, JudgeType, convert_chart,
};
use medley_core::math::Ease;

fn start(beat: f64, lane: f64, size: f64, ease: Ease) -> Connection {
    Connection::Start {
        beat,
        lane,
        size,
        ease,
        critical: false,
        trace: false,
    }
}

fn end(beat: f64, lane: f64, size: f64) -> Connection {
    Connection::End {
        beat,
        lane,
        size,
        critical: false,
        trace: false,
    }
}

fn ignore(beat: f64, lane: f64, size: f64, ease: Ease) -> Connection {
    Connection::Ignore {
        beat,
        lane,
        size,
        ease,
    }
}

fn chart_with(objects: Vec<ChartObject>) -> Chart {
    Chart {
        offset: 0.0,
        objects,
    }
}

fn judged(connections: Vec<Connection>) -> ChartObject {
    ChartObject::Slide(Slide {
        active: true,
        critical: false,
        connections,
    })
}

fn guide(critical: bool, connections: Vec<Connection>) -> ChartObject {
    ChartObject::Slide(Slide {
        active: false,
        critical,
        connections,
    })
}

fn slides_of(chart: &medley_core::convert::EditorChart) -> Vec<&[EditorConnection]> {
    chart
        .objects
        .iter()
        .filter_map(|obj| match obj {
            EditorObject::Slide(slide) => Some(slide.connections.as_slice()),
            _ => None,
        })
        .collect()
}

mod time_scale_grouping {
    use super::*;

    #[test]
    fn test_all_changes_collect_into_one_leading_group() {
        let chart = chart_with(vec![
            ChartObject::TimeScale(TimeScaleChange {
                beat: 0.0,
                time_scale: 1.0,
            }),
            ChartObject::Bpm(BpmChange {
                beat: 0.0,
                bpm: 120.0,
            }),
            ChartObject::TimeScale(TimeScaleChange {
                beat: 8.0,
                time_scale: 0.5,
            }),
        ]);
        let converted = convert_chart(&chart).unwrap();

        let EditorObject::TimeScaleGroup(group) = &converted.objects[0] else {
            panic!("expected the shared group first");
        };
        assert_eq!(group.changes.len(), 2);
        assert_eq!(group.changes[1].time_scale, 0.5);

        // No stray time-scale objects remain.
        let groups = converted
            .objects
            .iter()
            .filter(|obj| matches!(obj, EditorObject::TimeScaleGroup(_)))
            .count();
        assert_eq!(groups, 1);
    }

    #[test]
    fn test_singles_reference_the_shared_group() {
        let chart = chart_with(vec![ChartObject::Single(SingleNote {
            beat: 1.0,
            lane: 2.0,
            size: 1.5,
            critical: true,
            trace: false,
        })]);
        let converted = convert_chart(&chart).unwrap();
        let EditorObject::Single(single) = &converted.objects[1] else {
            panic!("expected a single note");
        };
        assert_eq!(single.time_scale_group, 0);
        assert_eq!(single.beat, 1.0);
        assert_eq!(single.lane, 2.0);
        assert!(single.critical);
    }
}

mod pass_through {
    use super::*;

    #[test]
    fn test_chain_without_attach_keeps_placement() {
        let chart = chart_with(vec![judged(vec![
            start(0.0, -1.5, 3.0, Ease::Out),
            Connection::Tick {
                beat: 1.0,
                lane: 0.5,
                size: 2.5,
                ease: Ease::In,
                critical: true,
            },
            end(2.0, 2.0, 2.0),
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let slides = slides_of(&converted);
        let conns = slides[0];

        let EditorConnection::Start {
            beat,
            lane,
            size,
            ease,
            judge_type,
            ..
        } = conns[0]
        else {
            panic!("expected start");
        };
        assert_eq!((beat, lane, size), (0.0, -1.5, 3.0));
        assert_eq!(ease, Ease::Out);
        assert_eq!(judge_type, JudgeType::Normal);

        let EditorConnection::Tick {
            critical, lane, ..
        } = conns[1]
        else {
            panic!("expected tick");
        };
        assert_eq!(critical, Some(true));
        assert_eq!(lane, 0.5);

        let EditorConnection::End { judge_type, .. } = conns[2] else {
            panic!("expected end");
        };
        assert_eq!(judge_type, JudgeType::Normal);
    }

    #[test]
    fn test_trace_flag_names_the_judge_type() {
        let chart = chart_with(vec![judged(vec![
            Connection::Start {
                beat: 0.0,
                lane: 0.0,
                size: 2.0,
                ease: Ease::Linear,
                critical: true,
                trace: true,
            },
            Connection::End {
                beat: 2.0,
                lane: 0.0,
                size: 2.0,
                critical: false,
                trace: true,
            },
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let conns = slides_of(&converted)[0];

        let EditorConnection::Start {
            judge_type,
            critical,
            ..
        } = conns[0]
        else {
            panic!("expected start");
        };
        assert_eq!(judge_type, JudgeType::Trace);
        assert!(critical);

        let EditorConnection::End { judge_type, .. } = conns[1] else {
            panic!("expected end");
        };
        assert_eq!(judge_type, JudgeType::Trace);
    }
}

mod ignore_fallbacks {
    use super::*;

    #[test]
    fn test_leading_ignore_becomes_the_start() {
        let chart = chart_with(vec![judged(vec![
            ignore(0.0, 1.0, 2.0, Ease::In),
            end(2.0, 1.0, 2.0),
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let conns = slides_of(&converted)[0];

        let EditorConnection::Start {
            judge_type,
            critical,
            ease,
            ..
        } = conns[0]
        else {
            panic!("expected synthesized start");
        };
        assert_eq!(judge_type, JudgeType::None);
        assert!(!critical);
        assert_eq!(ease, Ease::In);
    }

    #[test]
    fn test_trailing_ignore_becomes_the_end_without_ease() {
        let chart = chart_with(vec![judged(vec![
            start(0.0, 1.0, 2.0, Ease::Linear),
            ignore(4.0, 2.0, 2.0, Ease::Out),
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let conns = slides_of(&converted)[0];

        // The end role has no easing field to carry the Out curve.
        let EditorConnection::End {
            judge_type,
            critical,
            lane,
            ..
        } = conns[1]
        else {
            panic!("expected synthesized end");
        };
        assert_eq!(judge_type, JudgeType::None);
        assert!(!critical);
        assert_eq!(lane, 2.0);
    }

    #[test]
    fn test_interior_ignore_stays_an_unjudged_tick() {
        let chart = chart_with(vec![judged(vec![
            start(0.0, 1.0, 2.0, Ease::Linear),
            ignore(1.0, 1.5, 2.0, Ease::Linear),
            end(2.0, 2.0, 2.0),
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let conns = slides_of(&converted)[0];

        let EditorConnection::Tick { critical, .. } = conns[1] else {
            panic!("expected unjudged tick");
        };
        assert_eq!(critical, None);
    }

    #[test]
    fn test_ignore_only_chain_still_needs_an_end() {
        let chart = chart_with(vec![judged(vec![ignore(0.0, 1.0, 2.0, Ease::Linear)])]);
        assert!(convert_chart(&chart).is_err());
    }
}

mod attach_estimation {
    use super::*;

    fn eased_chain(ease: Ease) -> Chart {
        chart_with(vec![judged(vec![
            start(0.0, 0.0, 2.0, ease),
            Connection::Attach {
                beat: 1.0,
                critical: true,
            },
            Connection::Attach {
                beat: 3.0,
                critical: false,
            },
            end(4.0, 4.0, 2.0),
        ])])
    }

    fn attach_placements(chart: &Chart) -> Vec<(f64, f64)> {
        let converted = convert_chart(chart).unwrap();
        slides_of(&converted)[0]
            .iter()
            .filter_map(|conn| match conn {
                EditorConnection::Attach { lane, size, .. } => Some((*lane, *size)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_estimates_are_deterministic_and_snapped() {
        let chart = eased_chain(Ease::Out);
        let first = attach_placements(&chart);
        let second = attach_placements(&chart);
        assert_eq!(first, second);
        for (lane, size) in first {
            assert_eq!(lane, (lane * 16.0).round() / 16.0);
            assert_eq!(size, (size * 16.0).round() / 16.0);
        }
    }

    #[test]
    fn test_linear_quarter_points() {
        let placements = attach_placements(&eased_chain(Ease::Linear));
        assert_eq!(placements, vec![(1.0, 2.0), (3.0, 2.0)]);
    }

    #[test]
    fn test_attach_keeps_judged_critical_flag() {
        let converted = convert_chart(&eased_chain(Ease::Linear)).unwrap();
        let criticals: Vec<bool> = slides_of(&converted)[0]
            .iter()
            .filter_map(|conn| match conn {
                EditorConnection::Attach { critical, .. } => Some(*critical),
                _ => None,
            })
            .collect();
        assert_eq!(criticals, vec![true, false]);
    }
}

mod guides {
    use super::*;

    #[test]
    fn test_guide_keeps_only_placed_midpoints() {
        let chart = chart_with(vec![guide(
            false,
            vec![
                ignore(0.0, 0.0, 2.0, Ease::Linear),
                Connection::Tick {
                    beat: 1.0,
                    lane: 1.0,
                    size: 2.0,
                    ease: Ease::Linear,
                    critical: false,
                },
                ignore(2.0, 2.0, 2.0, Ease::Linear),
            ],
        )]);
        let converted = convert_chart(&chart).unwrap();
        let EditorObject::Guide(out) = &converted.objects[1] else {
            panic!("expected a guide");
        };
        assert_eq!(out.midpoints.len(), 2);
        assert_eq!(out.midpoints[1].beat, 2.0);
        assert_eq!(out.fade, GuideFade::Out);
    }

    #[test]
    fn test_guide_color_follows_critical_flag() {
        let chart = chart_with(vec![
            guide(false, vec![ignore(0.0, 0.0, 2.0, Ease::Linear)]),
            guide(true, vec![ignore(0.0, 0.0, 2.0, Ease::Linear)]),
        ]);
        let converted = convert_chart(&chart).unwrap();
        let colors: Vec<GuideColor> = converted
            .objects
            .iter()
            .filter_map(|obj| match obj {
                EditorObject::Guide(g) => Some(g.color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![GuideColor::Green, GuideColor::Yellow]);
    }
}

mod role_completeness {
    use super::*;

    #[test]
    fn test_every_surviving_connection_gets_a_role() {
        let chart = chart_with(vec![judged(vec![
            start(0.0, 0.0, 2.0, Ease::Linear),
            Connection::Tick {
                beat: 0.5,
                lane: 0.5,
                size: 2.0,
                ease: Ease::Linear,
                critical: false,
            },
            Connection::Attach {
                beat: 1.0,
                critical: false,
            },
            ignore(1.5, 1.5, 2.0, Ease::Linear),
            Connection::Hidden { beat: 1.75 },
            end(2.0, 2.0, 2.0),
        ])]);
        let converted = convert_chart(&chart).unwrap();
        let conns = slides_of(&converted)[0];

        // Six inputs, one hidden drop.
        assert_eq!(conns.len(), 5);
        let starts = conns
            .iter()
            .filter(|c| matches!(c, EditorConnection::Start { .. }))
            .count();
        let ends = conns
            .iter()
            .filter(|c| matches!(c, EditorConnection::End { .. }))
            .count();
        assert_eq!((starts, ends), (1, 1));
    }
}
