//! Core data models for the comp finder.

mod bucket;
mod comp;
mod density;
mod record;
mod stats;

pub use bucket::*;
pub use comp::*;
pub use density::*;
pub use record::*;
pub use stats::*;
