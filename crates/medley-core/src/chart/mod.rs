//! Generic note-graph model.
//!
//! This module contains the chart representation shared by the merger and
//! the converter:
//! - `Chart` - one song's objects plus its global audio offset
//! - `ChartObject` - tempo marker, time-scale change, single note, or slide
//! - `Connection` - one role-tagged note of a slide/guide chain

mod connection;
mod object;

pub use connection::*;
pub use object::*;
