use serde::{Deserialize, Serialize};

use crate::math::Ease;

/// One note of a slide/guide chain, tagged by its role.
///
/// Each role carries only the fields that are meaningful for it: `Attach`
/// notes are unplaced (the converter estimates lane and size from the
/// surrounding chain) and `Hidden` notes exist only as timing artifacts of
/// the source format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Connection {
    Start {
        beat: f64,
        lane: f64,
        size: f64,
        #[serde(default)]
        ease: Ease,
        #[serde(default)]
        critical: bool,
        #[serde(default)]
        trace: bool,
    },
    End {
        beat: f64,
        lane: f64,
        size: f64,
        #[serde(default)]
        critical: bool,
        #[serde(default)]
        trace: bool,
    },
    Tick {
        beat: f64,
        lane: f64,
        size: f64,
        #[serde(default)]
        ease: Ease,
        #[serde(default)]
        critical: bool,
    },
    Ignore {
        beat: f64,
        lane: f64,
        size: f64,
        #[serde(default)]
        ease: Ease,
    },
    Attach {
        beat: f64,
        #[serde(default)]
        critical: bool,
    },
    Hidden {
        beat: f64,
    },
}

impl Connection {
    pub fn beat(&self) -> f64 {
        match self {
            Connection::Start { beat, .. }
            | Connection::End { beat, .. }
            | Connection::Tick { beat, .. }
            | Connection::Ignore { beat, .. }
            | Connection::Attach { beat, .. }
            | Connection::Hidden { beat } => *beat,
        }
    }

    pub fn shift_beat(&mut self, delta: f64) {
        match self {
            Connection::Start { beat, .. }
            | Connection::End { beat, .. }
            | Connection::Tick { beat, .. }
            | Connection::Ignore { beat, .. }
            | Connection::Attach { beat, .. }
            | Connection::Hidden { beat } => *beat += delta,
        }
    }

    /// Role name as it appears in the serialized form.
    pub fn role_name(&self) -> &'static str {
        match self {
            Connection::Start { .. } => "start",
            Connection::End { .. } => "end",
            Connection::Tick { .. } => "tick",
            Connection::Ignore { .. } => "ignore",
            Connection::Attach { .. } => "attach",
            Connection::Hidden { .. } => "hidden",
        }
    }

    /// Whether an easing curve can originate here (anchors an attach note
    /// from the earlier side).
    pub fn eases_from(&self) -> bool {
        matches!(
            self,
            Connection::Start { .. } | Connection::Ignore { .. } | Connection::Tick { .. }
        )
    }

    /// Whether an easing curve can land here (anchors an attach note from
    /// the later side).
    pub fn eases_to(&self) -> bool {
        matches!(
            self,
            Connection::Start { .. }
                | Connection::Ignore { .. }
                | Connection::Tick { .. }
                | Connection::End { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tags_round_trip() {
        let conn = Connection::Attach {
            beat: 1.5,
            critical: true,
        };
        let json = serde_json::to_string(&conn).unwrap();
        assert!(json.contains("\"type\":\"attach\""));
        let back: Connection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conn);
    }

    #[test]
    fn test_ease_defaults_to_linear() {
        let conn: Connection =
            serde_json::from_str(r#"{"type":"ignore","beat":2.0,"lane":1.0,"size":1.0}"#).unwrap();
        let Connection::Ignore { ease, .. } = conn else {
            panic!("expected ignore role");
        };
        assert_eq!(ease, Ease::Linear);
    }

    #[test]
    fn test_anchor_eligibility() {
        let start = Connection::Start {
            beat: 0.0,
            lane: 0.0,
            size: 2.0,
            ease: Ease::Linear,
            critical: false,
            trace: false,
        };
        let end = Connection::End {
            beat: 4.0,
            lane: 0.0,
            size: 2.0,
            critical: false,
            trace: false,
        };
        let attach = Connection::Attach {
            beat: 2.0,
            critical: false,
        };
        assert!(start.eases_from() && start.eases_to());
        assert!(!end.eases_from() && end.eases_to());
        assert!(!attach.eases_from() && !attach.eases_to());
    }
}
