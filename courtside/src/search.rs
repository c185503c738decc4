//! Helpers for case-insensitive substring search in SQL.

/// Build an `ILIKE` pattern matching any value that contains `query`.
///
/// `%`, `_` and `\` in the query are escaped so they match literally; use with
/// `ESCAPE '\'`.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query() {
        assert_eq!(contains_pattern("milan"), "%milan%");
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(contains_pattern(""), "%%");
    }
}
