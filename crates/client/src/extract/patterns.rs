//! Regex sweeps over raw page source for product fields.

use regex::Regex;
use trolley_core::Product;
use url::Url;

use super::{ExtractStrategy, brand_from_title};

pub(crate) const DEFAULT_IMAGE: &str =
    "https://digitalcontent.api.tesco.com/v2/media/ghs/default-product.jpeg";

/// Sweeps the raw source for field patterns and pairs them up by position.
///
/// Titles, ids and tpncs are collected in separate passes, so the pairing is
/// approximate: it holds when the page lists fields in document order, which
/// is what the grocery search template does. Missing ids fall back to a
/// placeholder and missing brands are derived from the title.
pub struct ScriptPatterns {
    base: Url,
    title: Regex,
    id: Regex,
    tpnc: Regex,
    brand: Regex,
}

impl ScriptPatterns {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            title: Regex::new(r#""title":"([^"]+)""#).unwrap(),
            id: Regex::new(r#""ProductType:(\d+)""#).unwrap(),
            tpnc: Regex::new(r#""tpnc":"(\d+)""#).unwrap(),
            brand: Regex::new(r#""brandName":"([^"]+)""#).unwrap(),
        }
    }
}

fn capture_all(pattern: &Regex, content: &str) -> Vec<String> {
    pattern.captures_iter(content).map(|caps| caps[1].to_string()).collect()
}

impl ExtractStrategy for ScriptPatterns {
    fn name(&self) -> &'static str {
        "script-patterns"
    }

    fn extract(&self, content: &str, _query: &str) -> Vec<Product> {
        let titles = capture_all(&self.title, content);
        let ids = capture_all(&self.id, content);
        let tpncs = capture_all(&self.tpnc, content);
        let brands = capture_all(&self.brand, content);

        tracing::debug!(
            "correlating {} titles, {} ids, {} tpncs by position",
            titles.len(),
            ids.len(),
            tpncs.len()
        );

        let mut products = Vec::new();
        for (i, title) in titles.into_iter().enumerate() {
            if title.trim().chars().count() <= 5 {
                continue;
            }
            let product_id = ids.get(i).cloned().unwrap_or_else(|| format!("unknown_{i}"));
            let tpnc = tpncs.get(i).cloned().unwrap_or_else(|| product_id.clone());
            let brand =
                brands.get(i).cloned().unwrap_or_else(|| brand_from_title(&title));
            let url = self
                .base
                .join(&format!("/groceries/en-GB/products/{tpnc}"))
                .map(|u| u.to_string())
                .unwrap_or_default();

            products.push(Product {
                name: title,
                brand,
                product_id,
                url,
                image: DEFAULT_IMAGE.to_string(),
                ..Product::default()
            });
        }
        products
    }
}
