//! Scraping pipeline for trolley.
//!
//! This crate provides the HTTP session with identity rotation and pacing,
//! the product extraction cascade, nutrition parsing and enrichment, and the
//! top-level search orchestrator used by the CLI.

pub mod extract;
pub mod fetch;
pub mod nutrition;
pub mod search;

pub use extract::{
    DomTiles, EmbeddedJson, ExtractStrategy, ProductExtractor, ScriptPatterns, TextHeuristics,
    brand_from_title,
};
pub use fetch::{BrowserIdentity, PageFetcher, Pacing, SessionClient};
pub use nutrition::{NutritionFetcher, parse_nutrition};
pub use search::Scraper;
