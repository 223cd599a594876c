//! `bpm-aging` library crate.
//!
//! The binary (`bpm`) is a thin wrapper around this library so that:
//!
//! - every stage is testable without spawning processes
//! - stages can be driven with an in-memory `SeasonSource` (offline runs, tests)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
