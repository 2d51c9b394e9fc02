//! Graph-level algorithms that produce new networks.

pub mod prune;

pub use prune::{PruneConfig, prune};
