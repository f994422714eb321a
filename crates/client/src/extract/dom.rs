//! DOM-based extraction from product tile markup.

use scraper::{ElementRef, Html, Selector};
use trolley_core::{PRICE_UNAVAILABLE, Product};
use url::Url;

use super::{ExtractStrategy, product_id_from_url};

/// Container candidates in priority order. The first selector that yields a
/// usable product wins; bare product links are the last resort.
const CONTAINER_SELECTORS: &[&str] = &[
    r#"div[data-testid*="product"]"#,
    r#"div[class*="product"]"#,
    "article",
    "li[data-auto]",
    ".product-tile",
    r#"[data-auto*="product"]"#,
    r#"a[href*="/products/"]"#,
];

const NAME_SELECTORS: &[&str] = &["h1", "h2", "h3", "a[title]", r#"[data-auto*="title"]"#];

const PRICE_SELECTORS: &[&str] = &[r#"[data-auto*="price"]"#, ".price", r#"[class*="price"]"#];

/// Walks product tile markup when no script-side data survives.
pub struct DomTiles {
    base: Url,
    containers: Vec<(&'static str, Selector)>,
    names: Vec<Selector>,
    prices: Vec<Selector>,
    link: Selector,
    image: Selector,
}

impl DomTiles {
    pub fn new(base: Url) -> Self {
        let parse_all = |patterns: &[&'static str]| {
            patterns
                .iter()
                .map(|pattern| Selector::parse(pattern).expect("invalid selector"))
                .collect::<Vec<_>>()
        };
        let containers = CONTAINER_SELECTORS
            .iter()
            .map(|pattern| (*pattern, Selector::parse(pattern).expect("invalid selector")))
            .collect();

        Self {
            base,
            containers,
            names: parse_all(NAME_SELECTORS),
            prices: parse_all(PRICE_SELECTORS),
            link: Selector::parse("a[href]").expect("invalid selector"),
            image: Selector::parse("img").expect("invalid selector"),
        }
    }

    fn product_from_element(&self, element: ElementRef) -> Option<Product> {
        let name = self.name_from(element)?;
        let url = self.url_from(element);
        let product_id = product_id_from_url(&url).unwrap_or_default();

        Some(Product {
            name,
            product_id,
            url,
            price: self.price_from(element),
            image: self.image_from(element),
            ..Product::default()
        })
    }

    fn name_from(&self, element: ElementRef) -> Option<String> {
        for selector in &self.names {
            let Some(found) = element.select(selector).next() else { continue };
            let mut name = collapse_text(found);
            if name.is_empty()
                && let Some(title) = found.value().attr("title")
            {
                name = title.to_string();
            }
            if name.chars().count() > 3 {
                return Some(name);
            }
        }
        // A bare product link carries the name as its own text.
        if element.value().name() == "a" {
            let name = collapse_text(element);
            if name.chars().count() > 3 {
                return Some(name);
            }
        }
        None
    }

    fn price_from(&self, element: ElementRef) -> String {
        for selector in &self.prices {
            let Some(found) = element.select(selector).next() else { continue };
            let price = collapse_text(found);
            if !price.is_empty()
                && (price.contains('£') || price.chars().any(|c| c.is_ascii_digit()))
            {
                return price;
            }
        }
        PRICE_UNAVAILABLE.to_string()
    }

    fn url_from(&self, element: ElementRef) -> String {
        let href = if element.value().name() == "a" {
            element.value().attr("href")
        } else {
            element.select(&self.link).next().and_then(|a| a.value().attr("href"))
        };
        href.map(|href| self.join_relative(href)).unwrap_or_default()
    }

    fn image_from(&self, element: ElementRef) -> String {
        let Some(img) = element.select(&self.image).next() else {
            return String::new();
        };
        img.value()
            .attr("src")
            .filter(|src| !src.is_empty())
            .or_else(|| img.value().attr("data-src"))
            .map(|src| self.join_relative(src))
            .unwrap_or_default()
    }

    fn join_relative(&self, href: &str) -> String {
        if href.starts_with('/')
            && let Ok(joined) = self.base.join(href)
        {
            return joined.to_string();
        }
        href.to_string()
    }
}

impl ExtractStrategy for DomTiles {
    fn name(&self) -> &'static str {
        "dom-tiles"
    }

    fn extract(&self, content: &str, _query: &str) -> Vec<Product> {
        let doc = Html::parse_document(content);
        let mut products = Vec::new();

        for (pattern, selector) in &self.containers {
            let elements: Vec<_> = doc.select(selector).collect();
            if elements.is_empty() {
                continue;
            }
            tracing::debug!(
                "dom extraction: selector {} matched {} elements",
                pattern,
                elements.len()
            );

            for element in elements.into_iter().take(10) {
                if let Some(product) = self.product_from_element(element) {
                    products.push(product);
                }
            }
            if !products.is_empty() {
                break;
            }
        }
        products
    }
}

fn collapse_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
