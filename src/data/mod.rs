//! Raw season data acquisition.
//!
//! - `source`: the `SeasonSource` trait
//! - `bbr`: Basketball-Reference advanced-stats pages
//! - `html`: minimal table extraction used by `bbr`
//! - `synthetic`: seeded offline league with a known aging curve
//! - `fetch`: per-season orchestration writing `data/raw/`

pub mod bbr;
pub mod fetch;
pub mod html;
pub mod source;
pub mod synthetic;

pub use bbr::BbrSource;
pub use fetch::{FetchOutcome, FetchReport, SeasonFetch, fetch_all};
pub use source::{SeasonSource, source_from_config};
pub use synthetic::SyntheticSource;
