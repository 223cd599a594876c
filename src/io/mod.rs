//! Input/output helpers.
//!
//! - on-disk directory layout (`layout`)
//! - raw per-season CSV tables (`raw`)
//! - cleaned and modeling tables (`table`)
//! - curve JSON read/write (`curve`)
//! - peak-age and per-era curve CSV exports (`export`)

pub mod curve;
pub mod export;
pub mod layout;
pub mod raw;
pub mod table;

pub use curve::*;
pub use export::*;
pub use layout::*;
pub use raw::*;
pub use table::*;
