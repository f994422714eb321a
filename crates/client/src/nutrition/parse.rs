//! Nutrition extraction from product detail pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use trolley_core::NutritionFacts;

static SERVING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+g)").unwrap());
static ENERGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*kcal").unwrap());
static KILOJOULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*kj").unwrap());
static FAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)fat\s+(\d+\.?\d*)\s*g").unwrap());
static SALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)salt\s+(\d+\.?\d*)\s*g").unwrap());
static PROTEIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)protein\s*(\d+\.?\d*)\s*g").unwrap());
static CARBS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)carbohydrate\s*(\d+\.?\d*)\s*g").unwrap());
static GRAMS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*g").unwrap());
static SALT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*(mg|g)").unwrap());

struct Selectors {
    serving: Selector,
    list: Selector,
    table: Selector,
    row: Selector,
    cell: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    // Obfuscated class from the storefront's serving-size display widget.
    serving: Selector::parse("div.ILAuM5ZwahtJKTg").expect("invalid selector"),
    list: Selector::parse(r#"dl[class*="nutritional-info-list" i]"#).expect("invalid selector"),
    table: Selector::parse("table").expect("invalid selector"),
    row: Selector::parse("tr").expect("invalid selector"),
    cell: Selector::parse("td, th").expect("invalid selector"),
});

/// Extracts nutrition facts from a product detail page.
///
/// Sources are tried in a fixed order: the serving-size widget, the
/// definition-list nutrition block, the first nutrition-looking table, and
/// finally a generic label/value row scan. When any nutrient was found
/// without a serving size, the per-100g labelling convention applies.
pub fn parse_nutrition(html: &str) -> NutritionFacts {
    let doc = Html::parse_document(html);
    let mut facts = NutritionFacts::default();

    if let Some(element) = doc.select(&SELECTORS.serving).next()
        && let Some(caps) = SERVING_RE.captures(&text_of(element))
    {
        facts.serving_size = Some(caps[1].to_string());
    }

    if let Some(list) = doc.select(&SELECTORS.list).next() {
        let text = text_of(list);
        if let Some(caps) = ENERGY_RE.captures(&text) {
            facts.energy = Some(format!("{}kcal", &caps[1]));
        }
        facts.fat = fat_before_saturates(&text);
        if let Some(caps) = SALT_RE.captures(&text) {
            facts.salt = Some(format!("{}g", &caps[1]));
        }
    }

    for table in doc.select(&SELECTORS.table) {
        let text = text_of(table);
        let lower = text.to_lowercase();
        if !lower.contains("nutrition") && !lower.contains("protein") {
            continue;
        }
        if let Some(caps) = PROTEIN_RE.captures(&text) {
            facts.protein = Some(format!("{}g", &caps[1]));
        }
        if let Some(caps) = CARBS_RE.captures(&text) {
            facts.carbs = Some(format!("{}g", &caps[1]));
        }
        if facts.energy.is_none()
            && let Some(caps) = ENERGY_RE.captures(&text)
        {
            facts.energy = Some(format!("{}kcal", &caps[1]));
        }
        if facts.fat.is_none() {
            facts.fat = fat_before_saturates(&text);
        }
        if facts.salt.is_none()
            && let Some(caps) = SALT_RE.captures(&text)
        {
            facts.salt = Some(format!("{}g", &caps[1]));
        }
        break;
    }

    if !has_nutrient_values(&facts) {
        scan_rows(&doc, &mut facts);
    }

    if !facts.is_empty() && facts.serving_size.is_none() {
        facts.serving_size = Some("100g".to_string());
    }

    facts
}

/// Matches a labelled fat value, ignoring everything from the first
/// "saturates" mention onward so sub-line values are never read as total fat.
fn fat_before_saturates(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let scope = match lower.find("saturat") {
        Some(idx) => &lower[..idx],
        None => lower.as_str(),
    };
    FAT_RE.captures(scope).map(|caps| format!("{}g", &caps[1]))
}

fn has_nutrient_values(facts: &NutritionFacts) -> bool {
    facts.energy.is_some()
        || facts.protein.is_some()
        || facts.carbs.is_some()
        || facts.fat.is_some()
        || facts.salt.is_some()
}

/// Generic two-cell row scan for pages without the dl or table layouts.
fn scan_rows(doc: &Html, facts: &mut NutritionFacts) {
    for row in doc.select(&SELECTORS.row) {
        let cells: Vec<String> = row.select(&SELECTORS.cell).map(text_of).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = cells[0].to_lowercase();
        if label.contains("saturat") {
            continue;
        }
        let value = &cells[1];

        if (label.contains("energy") || label.contains("calor")) && facts.energy.is_none() {
            if let Some(caps) = ENERGY_RE.captures(value) {
                facts.energy = Some(format!("{}kcal", &caps[1]));
            } else if let Some(caps) = KILOJOULE_RE.captures(value) {
                facts.energy = Some(format!("{}kJ", &caps[1]));
            }
        } else if label.contains("protein") && facts.protein.is_none() {
            if let Some(caps) = GRAMS_RE.captures(value) {
                facts.protein = Some(format!("{}g", &caps[1]));
            }
        } else if label.contains("carbohydrate") && facts.carbs.is_none() {
            if let Some(caps) = GRAMS_RE.captures(value) {
                facts.carbs = Some(format!("{}g", &caps[1]));
            }
        } else if label.contains("fat") && facts.fat.is_none() {
            if let Some(caps) = GRAMS_RE.captures(value) {
                facts.fat = Some(format!("{}g", &caps[1]));
            }
        } else if label.contains("salt")
            && facts.salt.is_none()
            && let Some(caps) = SALT_VALUE_RE.captures(value)
        {
            facts.salt = Some(format!("{}{}", &caps[1], caps[2].to_lowercase()));
        }
    }
}

fn text_of(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
