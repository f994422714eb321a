//! Brand derivation from product titles.

/// Derive a brand from a product title when none was extracted.
///
/// Own-label titles map sub-brand keywords to their specialised labels;
/// any other title contributes its first whitespace token as the brand.
pub fn brand_from_title(title: &str) -> String {
    let lower = title.to_lowercase();
    if title.starts_with("Tesco") {
        if lower.contains("finest") {
            return "Tesco Finest".to_string();
        }
        if lower.contains("organic") {
            return "Tesco Organic".to_string();
        }
        if lower.contains("free range") {
            return "Tesco Free Range".to_string();
        }
        return "Tesco".to_string();
    }
    match title.split_whitespace().next() {
        Some(word) => word.to_string(),
        None => "Unknown".to_string(),
    }
}
