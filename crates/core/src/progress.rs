//! Typed progress events for long-running scrape operations.
//!
//! The pipeline emits events; a presentation layer (CLI, tests) decides how
//! to render them. Core and client code never print directly.

/// Why the pipeline is sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Short pre-search pause.
    Search,
    /// Long pause before a detail-page fetch.
    Detail,
    /// Cooldown after a successful detail-page fetch.
    Cooldown,
}

/// A progress signal emitted while a search runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeEvent {
    /// Search accepted; pipeline is starting.
    SearchStarted { query: String },
    /// Sleeping to mimic human cadence before the next request.
    Pausing { seconds: f64, reason: PauseReason },
    /// A page came back with this many bytes of body.
    PageFetched { url: String, bytes: usize },
    /// An extraction strategy produced candidates.
    StrategyProduced { strategy: &'static str, count: usize },
    /// Nutrition for a product was found in the cache.
    CacheHit { product: String },
    /// Nutrition not cached; a detail fetch may follow.
    CacheMiss { product: String },
    /// Nutrition parsed from a detail page.
    NutritionExtracted { product: String, fields: usize },
    /// Detail fetch failed or was vetted as blocked.
    NutritionBlocked { product: String, reason: String },
    /// Detail fetch came back empty; the rest of the batch is abandoned.
    NutritionSkipped { product: String },
    /// Search finished with this many result entries.
    SearchFinished { products: usize },
}

/// Receives [`ScrapeEvent`]s from the pipeline.
///
/// Implementations must be cheap: events fire inline on the fetch path.
pub trait ScrapeObserver: Send + Sync {
    fn on_event(&self, event: ScrapeEvent);
}

/// Observer that discards every event.
pub struct NullObserver;

impl ScrapeObserver for NullObserver {
    fn on_event(&self, _event: ScrapeEvent) {}
}
