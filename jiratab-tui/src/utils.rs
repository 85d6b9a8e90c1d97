/// Single-line, length-capped version of an error for the footer.
pub fn compact_error(value: &str) -> String {
    const LIMIT: usize = 80;
    let cleaned = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= LIMIT {
        return cleaned;
    }
    let truncated = cleaned.chars().take(LIMIT).collect::<String>();
    format!("{truncated}...")
}
