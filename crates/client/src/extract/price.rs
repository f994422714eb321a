//! Positional price enrichment over raw page content.

use regex::Regex;
use trolley_core::{PRICE_UNAVAILABLE, Product};

/// Collects currency-tagged numbers and assigns them to products by index.
///
/// The pairing is positional, not correlated: the i-th price found in the
/// content is assumed to belong to the i-th product. Only products still
/// carrying the unavailable sentinel are filled, so a strategy that
/// extracted a real price is never overwritten.
pub(crate) struct PriceEnricher {
    patterns: [Regex; 3],
    number: Regex,
    per_kg: Regex,
    per_gram: Regex,
}

impl PriceEnricher {
    pub(crate) fn new() -> Self {
        Self {
            patterns: [
                Regex::new(r#""price":\s*(\d+\.?\d*)"#).unwrap(),
                Regex::new(r#""currentPrice":\s*(\d+\.?\d*)"#).unwrap(),
                Regex::new(r#""displayPrice":\s*"([^"]+)""#).unwrap(),
            ],
            number: Regex::new(r"(\d+\.?\d*)").unwrap(),
            per_kg: Regex::new(r"(\d+\.?\d*)kg").unwrap(),
            per_gram: Regex::new(r"(\d+)g").unwrap(),
        }
    }

    /// Collect numeric prices from the content, one pattern at a time, in
    /// encounter order.
    pub(crate) fn collect(&self, content: &str) -> Vec<f64> {
        let mut raw = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(content) {
                raw.push(caps[1].to_string());
            }
        }

        let mut prices = Vec::new();
        for text in raw {
            if text.contains('£') {
                if let Some(caps) = self.number.captures(&text)
                    && let Ok(value) = caps[1].parse::<f64>()
                {
                    prices.push(value);
                }
            } else if let Ok(value) = text.parse::<f64>() {
                prices.push(value);
            }
        }
        prices
    }

    /// Assign the i-th price to the i-th product. Products beyond the
    /// shorter list keep whatever price they had.
    pub(crate) fn apply(&self, products: &mut [Product], prices: &[f64]) {
        for (product, price) in products.iter_mut().zip(prices) {
            if product.price != PRICE_UNAVAILABLE {
                continue;
            }
            product.price = format!("£{price:.2}");
            if let Some(unit) = self.unit_price(&product.name, *price) {
                product.unit_price = unit;
            }
        }
    }

    /// Derive a per-weight price when the name carries a parseable weight.
    fn unit_price(&self, name: &str, price: f64) -> Option<String> {
        let lower = name.to_lowercase();
        if lower.contains("kg") {
            let weight = self.per_kg.captures(&lower)?[1].parse::<f64>().ok()?;
            if weight > 0.0 {
                return Some(format!("£{:.2}/kg", price / weight));
            }
            return None;
        }
        if lower.contains('g') {
            let grams = self.per_gram.captures(&lower)?[1].parse::<f64>().ok()?;
            if grams > 0.0 {
                return Some(format!("£{:.2}/100g", price / grams * 100.0));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            product_id: "1".to_string(),
            url: "https://www.tesco.com/groceries/en-GB/products/1".to_string(),
            ..Product::default()
        }
    }

    #[test]
    fn test_collect_sweeps_patterns_in_order() {
        let content = r#"{"currentPrice": 4.00, "price": 3.50, "displayPrice": "£2.25"}"#;
        let enricher = PriceEnricher::new();
        assert_eq!(enricher.collect(content), vec![3.50, 4.00, 2.25]);
    }

    #[test]
    fn test_collect_skips_unparseable_display_price() {
        let content = r#""displayPrice": "Clubcard Price""#;
        assert!(PriceEnricher::new().collect(content).is_empty());
    }

    #[test]
    fn test_apply_is_bounded_by_shorter_list() {
        let mut products = vec![product("Chicken Thighs 1Kg"), product("Chicken Wings 800G")];
        let enricher = PriceEnricher::new();
        enricher.apply(&mut products, &[2.5]);
        assert_eq!(products[0].price, "£2.50");
        assert_eq!(products[1].price, PRICE_UNAVAILABLE);
    }

    #[test]
    fn test_apply_never_overwrites_extracted_price() {
        let mut products = vec![product("Chicken Breast 650G")];
        products[0].price = "£9.99".to_string();
        PriceEnricher::new().apply(&mut products, &[1.0]);
        assert_eq!(products[0].price, "£9.99");
    }

    #[test]
    fn test_unit_price_per_kg() {
        let mut products = vec![product("Whole Chicken 1.5Kg")];
        PriceEnricher::new().apply(&mut products, &[4.5]);
        assert_eq!(products[0].price, "£4.50");
        assert_eq!(products[0].unit_price, "£3.00/kg");
    }

    #[test]
    fn test_unit_price_per_100g() {
        let mut products = vec![product("Chicken Breast Portions 650G")];
        PriceEnricher::new().apply(&mut products, &[3.25]);
        assert_eq!(products[0].unit_price, "£0.50/100g");
    }

    #[test]
    fn test_no_weight_leaves_unit_price_empty() {
        let mut products = vec![product("Chicken Stock Pot")];
        PriceEnricher::new().apply(&mut products, &[1.0]);
        assert_eq!(products[0].price, "£1.00");
        assert_eq!(products[0].unit_price, "");
    }
}
