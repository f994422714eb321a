//! CSV export of the cache for offline analysis.

use std::path::Path;

use csv::Writer;

use super::store::NutritionCache;
use crate::Error;

/// Column headers, in the order rows are written.
const COLUMNS: [&str; 11] = [
    "Product ID",
    "Product Name",
    "Product URL",
    "Serving Size",
    "Energy",
    "Protein",
    "Carbs",
    "Fat",
    "Salt",
    "Cache Hits",
    "Cached At",
];

impl NutritionCache {
    /// Write every entry to `path` as CSV, one row per product.
    ///
    /// Missing nutrient fields render as empty strings. Rows are emitted in
    /// key order, so exporting an unchanged store twice produces identical
    /// bytes. Returns the number of data rows written.
    pub fn export_csv(&self, path: &Path) -> Result<usize, Error> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(COLUMNS)?;

        for (key, entry) in &self.data.products {
            let nutrition = &entry.nutrition;
            let hits = entry.cache_hits.to_string();
            writer.write_record([
                key.as_str(),
                entry.product_name.as_str(),
                entry.product_url.as_str(),
                nutrition.serving_size.as_deref().unwrap_or(""),
                nutrition.energy.as_deref().unwrap_or(""),
                nutrition.protein.as_deref().unwrap_or(""),
                nutrition.carbs.as_deref().unwrap_or(""),
                nutrition.fat.as_deref().unwrap_or(""),
                nutrition.salt.as_deref().unwrap_or(""),
                hits.as_str(),
                entry.cached_at.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(self.data.products.len())
    }
}
