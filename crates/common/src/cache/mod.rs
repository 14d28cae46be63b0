//! Cache instrumentation shared by the resolution caches.

pub mod stats;

pub use stats::{CacheStats, MetricsCollector};
