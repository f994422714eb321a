//! Cautious nutrition enrichment for product batches.
//!
//! Detail-page fetches are the riskiest calls the scraper makes, so this
//! module is deliberately slow and pessimistic: every uncached product costs
//! a long pre-fetch pause, at most a couple of fetches happen per batch, and
//! the first empty result abandons the rest of the batch. The cache is
//! consulted first and is authoritative, including for entries that were
//! cached empty.

pub mod parse;

pub use parse::parse_nutrition;

use trolley_core::{
    NutritionCache, NutritionFacts, PauseReason, Product, ScrapeEvent, ScrapeObserver,
};

use crate::fetch::{PageFetcher, Pacing};

/// Fetches and caches nutrition facts for products.
pub struct NutritionFetcher<'a> {
    fetcher: &'a dyn PageFetcher,
    pacing: &'a Pacing,
    observer: &'a dyn ScrapeObserver,
    max_fetches: usize,
}

impl<'a> NutritionFetcher<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        pacing: &'a Pacing,
        observer: &'a dyn ScrapeObserver,
        max_fetches: usize,
    ) -> Self {
        Self { fetcher, pacing, observer, max_fetches }
    }

    /// Returns nutrition for one product, consulting the cache first.
    ///
    /// Failures of any kind come back as empty facts; the caller decides
    /// whether that ends a batch.
    pub async fn fetch_one(
        &self,
        cache: &mut NutritionCache,
        product_url: &str,
        product_name: &str,
    ) -> NutritionFacts {
        if let Some(cached) = cache.get(product_url) {
            cache.increment_hit(product_url);
            tracing::debug!("nutrition cache hit for {}", product_name);
            self.observer.on_event(ScrapeEvent::CacheHit { product: product_name.to_string() });
            return cached;
        }
        self.observer.on_event(ScrapeEvent::CacheMiss { product: product_name.to_string() });
        self.fetch_uncached(cache, product_url, product_name).await
    }

    /// Enriches products in place, spending at most `max_fetches` detail
    /// fetches. Cache hits are free and do not count against the budget.
    pub async fn enrich_batch(&self, cache: &mut NutritionCache, products: &mut [Product]) {
        let mut fetched = 0usize;

        for product in products.iter_mut() {
            if fetched >= self.max_fetches {
                tracing::info!(
                    "nutrition fetch cap ({}) reached, leaving the rest uncached",
                    self.max_fetches
                );
                break;
            }
            if product.url.is_empty() || product.name.is_empty() {
                continue;
            }
            if let Some(cached) = cache.get(&product.url) {
                cache.increment_hit(&product.url);
                tracing::debug!("nutrition cache hit for {}", product.name);
                self.observer.on_event(ScrapeEvent::CacheHit { product: product.name.clone() });
                product.nutrition = cached;
                continue;
            }
            self.observer.on_event(ScrapeEvent::CacheMiss { product: product.name.clone() });

            let facts = self.fetch_uncached(cache, &product.url, &product.name).await;
            if facts.is_empty() {
                tracing::warn!(
                    "no nutrition for {}, abandoning the rest of the batch",
                    product.name
                );
                self.observer
                    .on_event(ScrapeEvent::NutritionSkipped { product: product.name.clone() });
                break;
            }
            product.nutrition = facts;
            fetched += 1;
            if fetched < self.max_fetches {
                self.pacing.pause(PauseReason::Cooldown, self.observer).await;
            }
        }
    }

    async fn fetch_uncached(
        &self,
        cache: &mut NutritionCache,
        product_url: &str,
        product_name: &str,
    ) -> NutritionFacts {
        self.pacing.pause(PauseReason::Detail, self.observer).await;

        let body = match self.fetcher.fetch_page(product_url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("nutrition fetch failed for {}: {}", product_name, e);
                self.observer.on_event(ScrapeEvent::NutritionBlocked {
                    product: product_name.to_string(),
                    reason: e.to_string(),
                });
                return NutritionFacts::default();
            }
        };

        let facts = parse_nutrition(&body);
        if !facts.is_empty() {
            self.observer.on_event(ScrapeEvent::NutritionExtracted {
                product: product_name.to_string(),
                fields: field_count(&facts),
            });
            cache.set(product_url, product_name, facts.clone());
        }
        facts
    }
}

fn field_count(facts: &NutritionFacts) -> usize {
    [
        &facts.serving_size,
        &facts.energy,
        &facts.protein,
        &facts.carbs,
        &facts.fat,
        &facts.salt,
    ]
    .iter()
    .filter(|field| field.is_some())
    .count()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use trolley_core::{AppConfig, DelayRange, Error, NullObserver};

    use super::*;

    const NUTRITION_PAGE: &str = r#"<html><body>
        <dl class="nutritional-info-list">
            <dt>Energy</dt><dd>262kcal</dd>
            <dt>Fat</dt><dd>13g</dd>
        </dl>
    </body></html>"#;

    enum Outcome {
        Page(String),
        Blocked,
    }

    struct ScriptedFetcher {
        outcomes: HashMap<String, Outcome>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(outcomes: Vec<(&str, Outcome)>) -> Self {
            Self {
                outcomes: outcomes.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String, Error> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.outcomes.get(url) {
                Some(Outcome::Page(body)) => Ok(body.clone()),
                Some(Outcome::Blocked) => {
                    Err(Error::Blocked(format!("block marker in body for {url}")))
                }
                None => Err(Error::Status { status: 404, url: url.to_string() }),
            }
        }
    }

    fn instant_pacing() -> Pacing {
        Pacing::from_config(&AppConfig {
            search_delay: DelayRange::new(0.0, 0.0),
            detail_delay: DelayRange::new(0.0, 0.0),
            cooldown_delay: DelayRange::new(0.0, 0.0),
            ..AppConfig::default()
        })
    }

    fn temp_cache() -> (tempfile::TempDir, NutritionCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = NutritionCache::open(dir.path().join("cache.json"));
        (dir, cache)
    }

    fn product(url: &str, name: &str) -> Product {
        Product { name: name.to_string(), url: url.to_string(), ..Product::default() }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_fetch() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        cache.set(
            "https://example.com/p/1",
            "Cached Chicken",
            NutritionFacts { energy: Some("262kcal".to_string()), ..NutritionFacts::default() },
        );

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        let facts =
            nutrition.fetch_one(&mut cache, "https://example.com/p/1", "Cached Chicken").await;

        assert_eq!(facts.energy.as_deref(), Some("262kcal"));
        assert!(fetcher.calls().is_empty());
        assert_eq!(cache.stats().total_hits, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_returns_empty_and_writes_nothing() {
        let fetcher = ScriptedFetcher::new(vec![("https://example.com/p/1", Outcome::Blocked)]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        let facts =
            nutrition.fetch_one(&mut cache, "https://example.com/p/1", "Blocked Chicken").await;

        assert!(facts.is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_parsed_nutrition_is_written_through() {
        let fetcher = ScriptedFetcher::new(vec![(
            "https://example.com/p/1",
            Outcome::Page(NUTRITION_PAGE.to_string()),
        )]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        let facts =
            nutrition.fetch_one(&mut cache, "https://example.com/p/1", "Fresh Chicken").await;

        assert_eq!(facts.fat.as_deref(), Some("13g"));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("https://example.com/p/1").unwrap().energy.as_deref(),
            Some("262kcal")
        );
    }

    #[tokio::test]
    async fn test_batch_respects_fetch_cap() {
        let fetcher = ScriptedFetcher::new(vec![
            ("https://example.com/p/0", Outcome::Page(NUTRITION_PAGE.to_string())),
            ("https://example.com/p/1", Outcome::Page(NUTRITION_PAGE.to_string())),
            ("https://example.com/p/2", Outcome::Page(NUTRITION_PAGE.to_string())),
        ]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        let mut products: Vec<Product> = (0..3)
            .map(|i| product(&format!("https://example.com/p/{i}"), &format!("Chicken Cut {i}")))
            .collect();

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        nutrition.enrich_batch(&mut cache, &mut products).await;

        assert_eq!(fetcher.calls().len(), 2);
        assert!(!products[0].nutrition.is_empty());
        assert!(!products[1].nutrition.is_empty());
        assert!(products[2].nutrition.is_empty());
    }

    #[tokio::test]
    async fn test_batch_aborts_after_first_failure() {
        let fetcher = ScriptedFetcher::new(vec![
            ("https://example.com/p/1", Outcome::Page(NUTRITION_PAGE.to_string())),
        ]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        let mut products = vec![
            product("https://example.com/p/0", "Missing Chicken"),
            product("https://example.com/p/1", "Fetchable Chicken"),
        ];

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        nutrition.enrich_batch(&mut cache, &mut products).await;

        // p/0 404s, so p/1 is never attempted.
        assert_eq!(fetcher.calls(), vec!["https://example.com/p/0".to_string()]);
        assert!(products[1].nutrition.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hits_do_not_consume_the_budget() {
        let fetcher = ScriptedFetcher::new(vec![
            ("https://example.com/p/2", Outcome::Page(NUTRITION_PAGE.to_string())),
            ("https://example.com/p/3", Outcome::Page(NUTRITION_PAGE.to_string())),
        ]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        cache.set(
            "https://example.com/p/0",
            "Chicken Cut 0",
            NutritionFacts { protein: Some("31g".to_string()), ..NutritionFacts::default() },
        );
        cache.set(
            "https://example.com/p/1",
            "Chicken Cut 1",
            NutritionFacts { protein: Some("28g".to_string()), ..NutritionFacts::default() },
        );
        let mut products: Vec<Product> = (0..4)
            .map(|i| product(&format!("https://example.com/p/{i}"), &format!("Chicken Cut {i}")))
            .collect();

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        nutrition.enrich_batch(&mut cache, &mut products).await;

        assert_eq!(fetcher.calls().len(), 2);
        assert!(products.iter().all(|p| !p.nutrition.is_empty()));
        assert_eq!(products[0].nutrition.protein.as_deref(), Some("31g"));
    }

    #[tokio::test]
    async fn test_products_without_urls_are_passed_over() {
        let fetcher = ScriptedFetcher::new(vec![(
            "https://example.com/p/1",
            Outcome::Page(NUTRITION_PAGE.to_string()),
        )]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        let mut products = vec![
            product("", "Unlinked Chicken"),
            product("https://example.com/p/1", "Linked Chicken"),
        ];

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        nutrition.enrich_batch(&mut cache, &mut products).await;

        assert_eq!(fetcher.calls(), vec!["https://example.com/p/1".to_string()]);
        assert!(products[0].nutrition.is_empty());
        assert!(!products[1].nutrition.is_empty());
    }

    #[tokio::test]
    async fn test_explicitly_cached_empty_counts_as_hit() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let pacing = instant_pacing();
        let (_dir, mut cache) = temp_cache();
        cache.set("https://example.com/p/1", "Known Bad Page", NutritionFacts::default());

        let nutrition = NutritionFetcher::new(&fetcher, &pacing, &NullObserver, 2);
        let facts =
            nutrition.fetch_one(&mut cache, "https://example.com/p/1", "Known Bad Page").await;

        assert!(facts.is_empty());
        assert!(fetcher.calls().is_empty());
    }
}
