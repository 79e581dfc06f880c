//! Platform abstraction layer
//!
//! The simulation never reads devices. A frontend fills a `Keys` snapshot of
//! what is held each frame and `InputTracker` derives the newly-pressed edges.

pub mod input;

pub use input::{InputTracker, Keys};
