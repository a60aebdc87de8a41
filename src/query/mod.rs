//! Query evaluation building blocks
//!
//! - [`TermPattern`] / [`JokerPattern`]: term syntax (`*`, `!`)
//! - [`HitAccumulator`]: turns posting scans into ranked document hits
//! - [`merge`]: sorted-merge AND/OR over hit lists, at document and item level

pub mod accumulate;
pub mod merge;
pub mod pattern;

pub use accumulate::HitAccumulator;
pub use merge::{intersect, intersect_items, unite, unite_items};
pub use pattern::{JokerPattern, MatchMode, TermPattern};
