//! Core types, configuration and abstractions

pub mod cache;
pub mod config;
pub mod feed;
pub mod generations;
pub mod log;
pub mod metadata;
pub mod nav;

// Re-export main types for cleaner imports
pub use feed::NavFeedProvider;
pub use generations::CacheManager;
pub use metadata::{MetadataProvider, SchemeDetails};
pub use nav::{EnrichedNavRecord, NavRecord};
