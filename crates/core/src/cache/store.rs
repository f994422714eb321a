//! Persistent nutrition store with hit analytics.
//!
//! One JSON document on disk holds every cached product. Reads are served
//! from memory; `set` and `clear` write the whole document back
//! synchronously. Storage failures are logged and the store keeps working
//! in memory for the rest of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::key::product_key;
use crate::Error;
use crate::model::NutritionFacts;

/// Format version written into new cache files.
pub const CACHE_VERSION: &str = "1.0";

/// One persisted cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub product_name: String,
    pub product_url: String,
    #[serde(default)]
    pub nutrition: NutritionFacts,
    pub cached_at: String,
    #[serde(default)]
    pub cache_hits: u64,
}

/// On-disk document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheFile {
    pub(crate) cache_version: String,
    pub(crate) last_updated: String,
    pub(crate) products: BTreeMap<String, CacheEntry>,
}

impl CacheFile {
    fn fresh() -> Self {
        Self {
            cache_version: CACHE_VERSION.to_string(),
            last_updated: now_iso(),
            products: BTreeMap::new(),
        }
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Aggregate read-only view of the cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_products: usize,
    pub total_hits: u64,
    pub file_size_bytes: u64,
    pub last_updated: String,
    pub top_products: Vec<TopProduct>,
}

/// Name and hit count for one of the most-read entries.
#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    pub name: String,
    pub hits: u64,
}

/// Process-local nutrition cache.
///
/// Single writer by design: every read and write happens on the execution
/// path that drives the fetch pipeline, so no locking discipline is needed.
#[derive(Debug)]
pub struct NutritionCache {
    path: PathBuf,
    pub(crate) data: CacheFile,
    persistent: bool,
}

impl NutritionCache {
    /// Open the cache at `path`, loading any existing file.
    ///
    /// A missing file starts an empty store; an unreadable or malformed
    /// file logs a warning and also starts empty. Never fails.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match Self::read_file(&path) {
            Ok(Some(data)) => {
                tracing::debug!(products = data.products.len(), "loaded nutrition cache");
                data
            }
            Ok(None) => CacheFile::fresh(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "cache unreadable, starting fresh: {e}");
                CacheFile::fresh()
            }
        };
        Self { path, data, persistent: true }
    }

    fn read_file(path: &Path) -> Result<Option<CacheFile>, Error> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Cached nutrition for a product URL, or `None` on a miss.
    ///
    /// Does not touch the hit counter; callers that count a hit invoke
    /// [`increment_hit`](Self::increment_hit) separately.
    pub fn get(&self, product_url: &str) -> Option<NutritionFacts> {
        self.data.products.get(product_key(product_url)).map(|entry| entry.nutrition.clone())
    }

    /// Upsert nutrition for a product and persist the store.
    ///
    /// An existing entry keeps its hit count; the name and timestamp are
    /// overwritten with the latest-seen values.
    pub fn set(&mut self, product_url: &str, product_name: &str, nutrition: NutritionFacts) {
        let key = product_key(product_url).to_string();
        let cache_hits = self.data.products.get(&key).map_or(0, |e| e.cache_hits);
        self.data.products.insert(
            key,
            CacheEntry {
                product_name: product_name.to_string(),
                product_url: product_url.to_string(),
                nutrition,
                cached_at: now_iso(),
                cache_hits,
            },
        );
        tracing::debug!(product = product_name, "cached nutrition");
        self.persist();
    }

    /// Count one read against an entry; unknown keys are a no-op.
    ///
    /// Not persisted on its own: the updated count reaches disk with the
    /// next `set` or `clear`, but is visible to `stats` immediately.
    pub fn increment_hit(&mut self, product_url: &str) {
        if let Some(entry) = self.data.products.get_mut(product_key(product_url)) {
            entry.cache_hits += 1;
        }
    }

    /// Aggregate statistics, including the five most-read entries.
    pub fn stats(&self) -> CacheStats {
        let total_hits = self.data.products.values().map(|e| e.cache_hits).sum();
        let mut top: Vec<TopProduct> = self
            .data
            .products
            .values()
            .map(|e| TopProduct { name: e.product_name.clone(), hits: e.cache_hits })
            .collect();
        top.sort_by(|a, b| b.hits.cmp(&a.hits));
        top.truncate(5);

        CacheStats {
            total_products: self.data.products.len(),
            total_hits,
            file_size_bytes: std::fs::metadata(&self.path).map_or(0, |m| m.len()),
            last_updated: self.data.last_updated.clone(),
            top_products: top,
        }
    }

    /// Drop every entry (the format version survives) and persist.
    pub fn clear(&mut self) {
        self.data.products.clear();
        self.persist();
    }

    /// Number of cached products.
    pub fn len(&self) -> usize {
        self.data.products.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.data.products.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&mut self) {
        self.data.last_updated = now_iso();
        if !self.persistent {
            return;
        }
        if let Err(e) = self.write_to_disk() {
            tracing::warn!(
                path = %self.path.display(),
                "cache write failed, continuing in-memory only: {e}"
            );
            self.persistent = false;
        }
    }

    fn write_to_disk(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.tesco.com/groceries/en-GB/products/294007923";

    fn sample_facts() -> NutritionFacts {
        NutritionFacts {
            serving_size: Some("100g".to_string()),
            energy: Some("115kcal".to_string()),
            protein: Some("21.5g".to_string()),
            carbs: Some("0g".to_string()),
            fat: Some("3.3g".to_string()),
            salt: Some("0.18g".to_string()),
        }
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = NutritionCache::open(&path);

        assert!(cache.is_empty());
        assert_eq!(cache.data.cache_version, CACHE_VERSION);
        assert!(!path.exists());
    }

    #[test]
    fn test_first_set_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = NutritionCache::open(&path);

        cache.set(URL, "Tesco British Chicken Breast", sample_facts());

        assert!(path.exists());
        let stats = cache.stats();
        assert_eq!(stats.total_products, 1);
        assert!(stats.file_size_bytes > 0);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));

        cache.set(URL, "Tesco British Chicken Breast", sample_facts());
        assert_eq!(cache.get(URL), Some(sample_facts()));
    }

    #[test]
    fn test_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        {
            let mut cache = NutritionCache::open(&path);
            cache.set(URL, "Tesco British Chicken Breast", sample_facts());
        }

        let reopened = NutritionCache::open(&path);
        assert_eq!(reopened.get(URL), Some(sample_facts()));
        assert_eq!(reopened.data.cache_version, CACHE_VERSION);
    }

    #[test]
    fn test_explicit_empty_is_distinct_from_miss() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));

        cache.set(URL, "Tesco British Chicken Breast", NutritionFacts::default());

        assert_eq!(cache.get(URL), Some(NutritionFacts::default()));
        assert_eq!(cache.get("https://www.tesco.com/groceries/en-GB/products/999"), None);
    }

    #[test]
    fn test_set_preserves_hits_and_overwrites_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));

        cache.set(URL, "Old Name Chicken", sample_facts());
        cache.increment_hit(URL);
        cache.increment_hit(URL);
        cache.set(URL, "New Name Chicken", NutritionFacts::default());

        let entry = &cache.data.products["294007923"];
        assert_eq!(entry.cache_hits, 2);
        assert_eq!(entry.product_name, "New Name Chicken");
        assert!(entry.nutrition.is_empty());
    }

    #[test]
    fn test_hit_counting_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));
        cache.set(URL, "Tesco British Chicken Breast", sample_facts());

        for _ in 0..3 {
            assert!(cache.get(URL).is_some());
            cache.increment_hit(URL);
        }

        assert_eq!(cache.stats().total_hits, 3);
    }

    #[test]
    fn test_increment_unknown_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));

        cache.increment_hit("https://www.tesco.com/groceries/en-GB/products/404");

        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_hits, 0);
    }

    #[test]
    fn test_stats_top_products_descending() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NutritionCache::open(dir.path().join("cache.json"));

        for (id, name, hits) in
            [("1", "One Product", 1), ("2", "Two Product", 4), ("3", "Three Product", 2)]
        {
            let url = format!("https://x/products/{id}");
            cache.set(&url, name, NutritionFacts::default());
            for _ in 0..hits {
                cache.increment_hit(&url);
            }
        }

        let top = cache.stats().top_products;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Two Product");
        assert_eq!(top[0].hits, 4);
        assert_eq!(top[1].name, "Three Product");
        assert_eq!(top[2].name, "One Product");
    }

    #[test]
    fn test_clear_preserves_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = NutritionCache::open(&path);
        cache.set(URL, "Tesco British Chicken Breast", sample_facts());

        cache.clear();

        assert!(cache.is_empty());
        let reopened = NutritionCache::open(&path);
        assert!(reopened.is_empty());
        assert_eq!(reopened.data.cache_version, CACHE_VERSION);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let mut cache = NutritionCache::open(&path);
        assert!(cache.is_empty());

        // recovery path still persists
        cache.set(URL, "Tesco British Chicken Breast", sample_facts());
        let reopened = NutritionCache::open(&path);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // the path is a directory, so writes fail
        let mut cache = NutritionCache::open(dir.path());

        cache.set(URL, "Tesco British Chicken Breast", sample_facts());

        assert!(!cache.persistent);
        assert_eq!(cache.get(URL), Some(sample_facts()));

        // further writes stay quiet and in-memory
        cache.set(URL, "Renamed Chicken Breast", sample_facts());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_file_format_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = NutritionCache::open(&path);
        cache.set(URL, "Tesco British Chicken Breast", sample_facts());

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["cache_version"], "1.0");
        assert!(value["last_updated"].is_string());
        let entry = &value["products"]["294007923"];
        assert_eq!(entry["product_name"], "Tesco British Chicken Breast");
        assert_eq!(entry["product_url"], URL);
        assert_eq!(entry["nutrition"]["energy"], "115kcal");
        assert_eq!(entry["cache_hits"], 0);
        assert!(entry["cached_at"].is_string());
    }
}
