//! Name transformations applied to matched entries.

pub mod name;

pub use name::{NameTransformer, SequenceCounter, Transformed, split_extension};
