//! Core types and shared functionality for trolley.
//!
//! This crate provides:
//! - Product and nutrition data model
//! - Nutrition cache with JSON file backend
//! - Unified error types
//! - Configuration structures
//! - Progress event interface for presentation layers

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;

pub use cache::{CacheStats, NutritionCache, product_key};
pub use config::{AppConfig, ConfigError, DelayRange};
pub use error::Error;
pub use model::{NutritionFacts, PRICE_UNAVAILABLE, Product, SearchItem};
pub use progress::{NullObserver, PauseReason, ScrapeEvent, ScrapeObserver};
