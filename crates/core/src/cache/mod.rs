//! JSON-file-backed cache for product nutrition data.
//!
//! This module provides a persistent key-value store mapping product
//! identity (derived from the detail URL) to nutrition facts. It supports:
//!
//! - Deterministic key derivation from product URLs
//! - Write-through persistence with in-memory fallback on storage failure
//! - Hit-count analytics and aggregate statistics
//! - CSV export for offline analysis

pub mod export;
pub mod key;
pub mod store;

pub use crate::Error;

pub use key::product_key;
pub use store::{CACHE_VERSION, CacheEntry, CacheStats, NutritionCache, TopProduct};
