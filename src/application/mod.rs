pub mod aggregator;
pub mod watcher;

pub use aggregator::MetadataAggregator;
pub use watcher::{Watcher, WatcherError};
