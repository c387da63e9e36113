pub mod chart;
pub mod convert;
pub mod error;
pub mod math;
pub mod merge;

pub use chart::{BpmChange, Chart, ChartObject, Connection, SingleNote, Slide, TimeScaleChange};
pub use convert::{ChartDocument, EditorChart, EditorObject, convert_chart};
pub use error::{Error, Result};
pub use math::Ease;
pub use merge::{DesyncTracker, MergeAccumulator, MergeOutcome, SongSource, merge_charts};
