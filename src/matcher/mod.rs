//! Matchers deciding which entries are rename candidates.

pub mod filter;

pub use filter::PathFilter;
