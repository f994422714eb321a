//! Product extraction from search-page content.
//!
//! Extraction runs an ordered cascade of strategies, from the most
//! structured source (embedded JSON state) down to raw text salvage. The
//! first strategy that yields at least one plausibly-named product wins, and
//! its output then goes through shared enrichment passes:
//!
//! 1. brand derivation for products without an explicit brand,
//! 2. positional price enrichment from the raw content,
//! 3. a final validity filter on name, id and url.
//!
//! Strategy order is deliberate configuration, not a hard invariant; see
//! [`ProductExtractor::with_strategies`] for swapping the cascade out.

pub mod brand;
pub mod dom;
pub mod embedded;
pub mod patterns;
mod price;
pub mod text;

pub use brand::brand_from_title;
pub use dom::DomTiles;
pub use embedded::EmbeddedJson;
pub use patterns::ScriptPatterns;
pub use text::TextHeuristics;

use std::sync::LazyLock;

use regex::Regex;
use trolley_core::{Product, ScrapeEvent, ScrapeObserver};
use url::Url;

use price::PriceEnricher;

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/products/(\d+)").unwrap());

/// Pulls the numeric product id out of a canonical product url.
pub(crate) fn product_id_from_url(url: &str) -> Option<String> {
    PRODUCT_ID_RE.captures(url).map(|caps| caps[1].to_string())
}

/// One self-contained algorithm for recovering products from page content.
pub trait ExtractStrategy: Send + Sync {
    /// Short name used in logs and progress events.
    fn name(&self) -> &'static str;

    /// Extracts candidate products. Implementations are pure with respect to
    /// the content and never perform I/O.
    fn extract(&self, content: &str, query: &str) -> Vec<Product>;
}

/// Ordered strategy cascade plus the shared enrichment passes.
pub struct ProductExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
    prices: PriceEnricher,
}

impl ProductExtractor {
    /// Builds the default cascade: embedded JSON, script regex patterns,
    /// DOM tiles, then text salvage.
    pub fn new(base: Url) -> Self {
        Self::with_strategies(vec![
            Box::new(EmbeddedJson::new(base.clone())),
            Box::new(ScriptPatterns::new(base.clone())),
            Box::new(DomTiles::new(base.clone())),
            Box::new(TextHeuristics::new(base)),
        ])
    }

    /// Builds an extractor with a custom cascade.
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies, prices: PriceEnricher::new() }
    }

    /// Runs the cascade against raw page content and returns enriched,
    /// validated products.
    pub fn extract_products(
        &self,
        content: &str,
        query: &str,
        observer: &dyn ScrapeObserver,
    ) -> Vec<Product> {
        let mut products = Vec::new();

        for strategy in &self.strategies {
            let mut candidates = strategy.extract(content, query);
            candidates.retain(|product| product.name.trim().chars().count() > 5);
            if candidates.is_empty() {
                continue;
            }
            tracing::debug!(
                "strategy {} produced {} products",
                strategy.name(),
                candidates.len()
            );
            observer.on_event(ScrapeEvent::StrategyProduced {
                strategy: strategy.name(),
                count: candidates.len(),
            });
            products = candidates;
            break;
        }

        for product in &mut products {
            if product.brand.is_empty() {
                product.brand = brand_from_title(&product.name);
            }
        }

        let prices = self.prices.collect(content);
        self.prices.apply(&mut products, &prices);

        products.retain(Product::is_valid);
        products
    }
}
