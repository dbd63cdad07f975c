//! Pagestrip Cache Library
//!
//! Reference in-memory cache for rendered page parts and thumbnails, with the
//! active/passive pass bookkeeping the tile scheduler relies on.

pub mod config;
pub mod parts;

pub use config::{CacheConfig, ConfigError};
pub use parts::{CacheStats, PagePart, PartCache};
