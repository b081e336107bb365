//! Analysis modules.
//!
//! Filtering, per-chart classification and aggregation over the loaded
//! records. Nothing in here performs I/O.

pub mod aggregator;
pub mod classify;
pub mod features;
pub mod hierarchy;

pub use aggregator::*;
pub use classify::{Accessibility, InstallType, ServiceHours};
pub use features::to_feature_collection;
pub use hierarchy::location_hierarchy;
