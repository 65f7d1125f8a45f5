//! Segment Planner: splits an object size into a byte-range plan (spec.md §4.2).

mod range;

pub use range::{plan, Segment};
