pub mod entry;
pub mod feed;
pub mod stats;
pub mod subscription;

/// Normalize a user- or parser-supplied optional string: empty and
/// whitespace-only values count as absent.
pub fn normalize(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Deduplicate tag names case-sensitively, dropping empties. Sorted so the
/// stored set has one canonical order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .filter_map(|t| normalize(Some(t)))
        .collect();
    tags.sort();
    tags.dedup();
    tags
}
