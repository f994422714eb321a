//! Progress rendering for terminal use.

use trolley_core::{PauseReason, ScrapeEvent, ScrapeObserver};

/// Writes progress to stderr as single lines, keeping stdout for results.
pub struct ConsoleObserver;

impl ScrapeObserver for ConsoleObserver {
    fn on_event(&self, event: ScrapeEvent) {
        match event {
            ScrapeEvent::SearchStarted { query } => eprintln!("searching for {query:?}..."),
            ScrapeEvent::Pausing { seconds, reason } => {
                eprintln!("waiting {seconds:.1}s {}", pause_label(reason));
            }
            ScrapeEvent::PageFetched { url, bytes } => eprintln!("fetched {url} ({bytes} bytes)"),
            ScrapeEvent::StrategyProduced { strategy, count } => {
                eprintln!("{strategy} extraction found {count} products");
            }
            ScrapeEvent::CacheHit { product } => eprintln!("nutrition cache hit: {product}"),
            ScrapeEvent::CacheMiss { product } => eprintln!("nutrition not cached: {product}"),
            ScrapeEvent::NutritionExtracted { product, fields } => {
                eprintln!("nutrition extracted for {product} ({fields} fields)");
            }
            ScrapeEvent::NutritionBlocked { product, reason } => {
                eprintln!("nutrition fetch blocked for {product}: {reason}");
            }
            ScrapeEvent::NutritionSkipped { product } => {
                eprintln!("skipping remaining nutrition fetches after {product}");
            }
            ScrapeEvent::SearchFinished { products } => eprintln!("done: {products} products"),
        }
    }
}

fn pause_label(reason: PauseReason) -> &'static str {
    match reason {
        PauseReason::Search => "before search",
        PauseReason::Detail => "before product page",
        PauseReason::Cooldown => "to cool down",
    }
}
