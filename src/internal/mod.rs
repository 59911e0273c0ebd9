//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{ResolvingSet, MAX_DEPTH};
