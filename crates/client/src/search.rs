//! Search orchestration: fetch, extract, enrich, report.

use trolley_core::{
    AppConfig, Error, NutritionCache, PauseReason, Product, ScrapeEvent, ScrapeObserver,
    SearchItem,
};
use url::Url;

use crate::extract::ProductExtractor;
use crate::fetch::{PageFetcher, Pacing, SessionClient};
use crate::nutrition::NutritionFetcher;

/// A grocery search session with one browser identity and one cache.
///
/// Construct once and reuse: the underlying HTTP session keeps its
/// connection pool and identity headers for its whole lifetime, which is
/// part of looking like one browsing human rather than many.
pub struct Scraper {
    fetcher: Box<dyn PageFetcher>,
    extractor: ProductExtractor,
    pacing: Pacing,
    cache: NutritionCache,
    config: AppConfig,
    observer: Box<dyn ScrapeObserver>,
}

impl Scraper {
    /// Builds a scraper with a real HTTP session.
    pub fn new(
        config: AppConfig,
        cache: NutritionCache,
        observer: Box<dyn ScrapeObserver>,
    ) -> Result<Self, Error> {
        let client = SessionClient::new(&config)?;
        Self::with_fetcher(Box::new(client), config, cache, observer)
    }

    /// Builds a scraper around any page fetcher. Tests use this to swap in
    /// scripted responses.
    pub fn with_fetcher(
        fetcher: Box<dyn PageFetcher>,
        config: AppConfig,
        cache: NutritionCache,
        observer: Box<dyn ScrapeObserver>,
    ) -> Result<Self, Error> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            fetcher,
            extractor: ProductExtractor::new(base),
            pacing: Pacing::from_config(&config),
            cache,
            config,
            observer,
        })
    }

    /// Searches the storefront and returns up to `limit` products.
    ///
    /// Never returns an error: total failure and empty result sets both come
    /// back as a single [`SearchItem::Error`] entry with a readable message.
    pub async fn search(
        &mut self,
        query: &str,
        limit: usize,
        extract_nutrition: bool,
    ) -> Vec<SearchItem> {
        self.observer.on_event(ScrapeEvent::SearchStarted { query: query.to_string() });
        tracing::info!("searching for {:?} (limit {})", query, limit);

        match self.search_inner(query, extract_nutrition).await {
            Ok(mut products) => {
                products.truncate(limit);
                self.observer.on_event(ScrapeEvent::SearchFinished { products: products.len() });
                if products.is_empty() {
                    tracing::info!("no products found for {:?}", query);
                    return vec![SearchItem::error(format!("No products found for '{query}'"))];
                }
                products.into_iter().map(SearchItem::from).collect()
            }
            Err(e) => {
                tracing::warn!("search for {:?} failed: {}", query, e);
                self.observer.on_event(ScrapeEvent::SearchFinished { products: 0 });
                vec![SearchItem::error(format!("Search failed: {e}"))]
            }
        }
    }

    async fn search_inner(
        &mut self,
        query: &str,
        extract_nutrition: bool,
    ) -> Result<Vec<Product>, Error> {
        let url = self.search_url(query)?;

        self.pacing.pause(PauseReason::Search, self.observer.as_ref()).await;
        let body = self.fetcher.fetch_page(url.as_str()).await?;
        self.observer
            .on_event(ScrapeEvent::PageFetched { url: url.to_string(), bytes: body.len() });

        let mut products = self.extractor.extract_products(&body, query, self.observer.as_ref());
        tracing::info!("extracted {} products for {:?}", products.len(), query);

        if extract_nutrition && !products.is_empty() {
            let nutrition = NutritionFetcher::new(
                self.fetcher.as_ref(),
                &self.pacing,
                self.observer.as_ref(),
                self.config.max_nutrition_fetches,
            );
            nutrition.enrich_batch(&mut self.cache, &mut products).await;
        }

        Ok(products)
    }

    fn search_url(&self, query: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.config.base_url)
            .and_then(|base| base.join("/groceries/en-GB/search"))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    /// Read access to the nutrition cache, e.g. for stats after a run.
    pub fn cache(&self) -> &NutritionCache {
        &self.cache
    }
}
