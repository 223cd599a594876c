//! Terminal summaries for each stage.

pub mod format;

pub use format::*;
