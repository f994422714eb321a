//! Embedded-JSON extraction from script blobs.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use trolley_core::{NutritionFacts, PRICE_UNAVAILABLE, Product};
use url::Url;

use super::{ExtractStrategy, product_id_from_url};

/// Key fragments whose presence marks an object as product-like.
const PRODUCT_INDICATORS: &[&str] = &[
    "name", "title", "price", "cost", "gtin", "barcode", "productid", "id", "sku", "brand",
    "description",
];

const NAME_KEYS: &[&str] = &["name", "title", "productName", "displayName"];
const PRICE_KEYS: &[&str] = &["price", "currentPrice", "displayPrice", "cost", "amount"];
const URL_KEYS: &[&str] = &["url", "link", "href", "productUrl", "permalink"];
const ID_KEYS: &[&str] = &["id", "productId", "tpnc", "sku", "gtin"];

/// Pulls products out of SPA state blobs and JSON islands in script tags.
///
/// Embedding depth is not fixed site-wide, so every parsed blob is walked
/// recursively and any object with enough product-ish keys is kept.
pub struct EmbeddedJson {
    base: Url,
    patterns: Vec<Regex>,
    script: Selector,
}

impl EmbeddedJson {
    pub fn new(base: Url) -> Self {
        let patterns = [
            r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\});",
            r"(?s)window\.__PRELOADED_STATE__\s*=\s*(\{.+?\});",
            r"(?s)__NEXT_DATA__\s*=\s*(\{.+?\})",
            r#"(?s)"products"\s*:\s*(\[.+?\])"#,
            r#"(?s)"results"\s*:\s*(\[.+?\])"#,
            r#"(?s)"items"\s*:\s*(\[.+?\])"#,
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect();

        Self { base, patterns, script: Selector::parse("script").expect("invalid selector") }
    }

    fn walk(&self, data: &Value, out: &mut Vec<Product>) {
        match data {
            Value::Object(map) => {
                if is_product_like(map)
                    && let Some(product) = self.product_from_object(map)
                {
                    out.push(product);
                }
                for value in map.values() {
                    if value.is_object() || value.is_array() {
                        self.walk(value, out);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if item.is_object() || item.is_array() {
                        self.walk(item, out);
                    }
                }
            }
            _ => {}
        }
    }

    fn product_from_object(&self, map: &Map<String, Value>) -> Option<Product> {
        let name = first_string(map, NAME_KEYS)?;
        if name.chars().count() < 3 {
            return None;
        }

        let mut url = self.url_from(map);
        let product_id = id_from(map, &url);
        if url.is_empty()
            && !product_id.is_empty()
            && let Ok(joined) = self.base.join(&format!("/groceries/en-GB/products/{product_id}"))
        {
            url = joined.to_string();
        }

        Some(Product {
            name,
            brand: string_key(map, "brand").unwrap_or_default(),
            product_id,
            url,
            price: price_from(map),
            unit_price: string_key(map, "unitPrice").unwrap_or_default(),
            promotion: first_string(map, &["promotion", "offer"]).unwrap_or_default(),
            availability: map.get("available").and_then(Value::as_bool).unwrap_or(true),
            image: first_string(map, &["image", "imageUrl"]).unwrap_or_default(),
            nutrition: nutrition_from(map),
        })
    }

    fn url_from(&self, map: &Map<String, Value>) -> String {
        for key in URL_KEYS {
            if let Some(Value::String(s)) = map.get(*key) {
                if s.starts_with('/')
                    && let Ok(joined) = self.base.join(s)
                {
                    return joined.to_string();
                }
                return s.clone();
            }
        }
        String::new()
    }
}

impl ExtractStrategy for EmbeddedJson {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    fn extract(&self, content: &str, _query: &str) -> Vec<Product> {
        let mut products = Vec::new();
        let doc = Html::parse_document(content);

        for script in doc.select(&self.script) {
            let text: String = script.text().collect();
            if text.is_empty() {
                continue;
            }
            for pattern in &self.patterns {
                let Some(caps) = pattern.captures(&text) else { continue };
                let Ok(data) = serde_json::from_str::<Value>(&caps[1]) else { continue };
                self.walk(&data, &mut products);
                if products.len() >= 5 {
                    products.truncate(10);
                    return products;
                }
            }
        }
        products
    }
}

fn is_product_like(map: &Map<String, Value>) -> bool {
    let hits = map
        .keys()
        .filter(|key| {
            let key = key.to_lowercase();
            PRODUCT_INDICATORS.iter().any(|indicator| key.contains(indicator))
        })
        .count();
    hits >= 2
}

fn string_key(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string_key(map, key))
}

fn id_from(map: &Map<String, Value>, url: &str) -> String {
    for key in ID_KEYS {
        match map.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    product_id_from_url(url).unwrap_or_default()
}

fn price_from(map: &Map<String, Value>) -> String {
    for key in PRICE_KEYS {
        let Some(value) = map.get(*key) else { continue };
        match value {
            Value::String(s) => return s.clone(),
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    return format!("£{v:.2}");
                }
            }
            Value::Object(nested) => {
                // Nested money objects look like {"amount": 2.50, "currency": "GBP"}.
                if let Some(v) = nested
                    .get("amount")
                    .or_else(|| nested.get("value"))
                    .and_then(Value::as_f64)
                    && v != 0.0
                {
                    return format!("£{v:.2}");
                }
            }
            _ => {}
        }
    }
    PRICE_UNAVAILABLE.to_string()
}

fn nutrition_from(map: &Map<String, Value>) -> NutritionFacts {
    let Some(value) = map.get("nutrition").or_else(|| map.get("nutritionalInfo")) else {
        return NutritionFacts::default();
    };
    if !value.is_object() {
        return NutritionFacts::default();
    }
    serde_json::from_value(value.clone()).unwrap_or_default()
}
