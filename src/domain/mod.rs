//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - season/era identifiers and era labeling (`Season`, `EraSpec`)
//! - raw and cleaned table rows (`RawTable`, `PlayerSeason`, `ModelRow`)
//! - fitted curve outputs (`EraCurve`, `CurveFile`, etc.)

pub mod types;

pub use types::*;
