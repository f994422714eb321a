//! Query-anchored text salvage when structured extraction fails.

use std::hash::{DefaultHasher, Hash, Hasher};

use regex::Regex;
use trolley_core::Product;
use url::Url;

use super::ExtractStrategy;

/// Scrapes plausible product names straight out of the raw text.
///
/// This is the last rung of the ladder: no ids or prices survive at this
/// point, so each match gets a synthetic id hashed from its text and a
/// canonical-looking url built from it.
pub struct TextHeuristics {
    base: Url,
}

impl TextHeuristics {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    fn patterns(&self, query: &str) -> Vec<Regex> {
        let escaped = regex::escape(query);
        [
            format!(r#"(?i)Tesco[^<>"]*{escaped}[^<>"]*"#),
            format!(r#"(?i){escaped}[^<>"]*\d+[gG]\b"#),
            format!(r#"(?i)[A-Z][^<>"]*{escaped}[^<>"]*[0-9]+[gGkK]"#),
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    }
}

impl ExtractStrategy for TextHeuristics {
    fn name(&self) -> &'static str {
        "text-heuristics"
    }

    fn extract(&self, content: &str, query: &str) -> Vec<Product> {
        let mut products = Vec::new();

        for pattern in self.patterns(query) {
            for found in pattern.find_iter(content).take(10) {
                let text = found.as_str();
                if text.chars().count() <= 10 {
                    continue;
                }
                let product_id = synthetic_id(text);
                let url = self
                    .base
                    .join(&format!("/groceries/en-GB/products/{product_id}"))
                    .map(|u| u.to_string())
                    .unwrap_or_default();

                products.push(Product {
                    name: text.trim().to_string(),
                    product_id,
                    url,
                    ..Product::default()
                });
            }
        }
        products
    }
}

fn synthetic_id(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    (hasher.finish() % 1_000_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> TextHeuristics {
        TextHeuristics::new(Url::parse("https://www.tesco.com").unwrap())
    }

    #[test]
    fn test_salvages_names_from_raw_text() {
        let content = "<div>Tesco British Chicken Breast 650G</div>";

        let products = strategy().extract(content, "chicken");
        // Each pattern contributes its own reading of the same text.
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].name, "Tesco British Chicken Breast 650G");
        assert_eq!(products[1].name, "Chicken Breast 650G");
        for product in &products {
            assert!(!product.product_id.is_empty());
            assert!(product.url.contains("/groceries/en-GB/products/"));
        }
    }

    #[test]
    fn test_synthetic_ids_are_deterministic() {
        let content = "<div>Tesco British Chicken Breast 650G</div>";

        let first = strategy().extract(content, "chicken");
        let second = strategy().extract(content, "chicken");
        assert_eq!(first[0].product_id, second[0].product_id);
        assert!(first[0].product_id.parse::<u64>().unwrap() < 1_000_000_000);
    }

    #[test]
    fn test_query_metacharacters_are_escaped() {
        let products = strategy().extract("<div>nothing useful</div>", "chicken (fresh)");
        assert!(products.is_empty());
    }

    #[test]
    fn test_short_matches_are_dropped() {
        let products = strategy().extract("<b>Tesco Ham</b>", "ham");
        assert!(products.is_empty());
    }
}
