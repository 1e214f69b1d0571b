use log::{debug, warn};
use std::collections::HashMap;

/// Lower-cased header name -> column index.
pub type HeaderIndex = HashMap<String, usize>;

/// The form under which header names are compared: trimmed and lower-cased.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Maps every non-blank header to its column index.
///
/// When a header appears more than once, the last occurrence wins.
pub fn build_header_index(headers: &[String]) -> HeaderIndex {
    let mut index: HeaderIndex = HashMap::new();
    for (idx, h) in headers.iter().enumerate() {
        let key = normalize_header(h);
        if key.is_empty() {
            continue;
        }
        if let Some(prev) = index.insert(key, idx) {
            warn!(
                "build_header_index: duplicate header {:?}: column {} replaces column {}",
                h,
                idx + 1,
                prev + 1
            );
        }
    }
    debug!("build_header_index: {} headers indexed", index.len());
    index
}

pub fn lookup(index: &HeaderIndex, name: &str) -> Option<usize> {
    index.get(&normalize_header(name)).cloned()
}

/// The names that cannot be found in the index, in the order given.
pub fn missing_columns<'a, I>(index: &HeaderIndex, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|n| lookup(index, n).is_none())
        .map(|n| n.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(hs: &[&str]) -> Vec<String> {
        hs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let index = build_header_index(&headers(&["Name", "Roll No", "MATHS"]));
        assert_eq!(lookup(&index, "name"), Some(0));
        assert_eq!(lookup(&index, "roll no"), Some(1));
        assert_eq!(lookup(&index, "Maths"), Some(2));
        assert_eq!(lookup(&index, "Math"), None);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let index = build_header_index(&headers(&["  Name ", "Science"]));
        assert_eq!(lookup(&index, "Name"), Some(0));
        assert_eq!(lookup(&index, " science"), Some(1));
    }

    #[test]
    fn duplicate_header_last_occurrence_wins() {
        let index = build_header_index(&headers(&["Name", "English", "english"]));
        assert_eq!(lookup(&index, "English"), Some(2));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn blank_headers_are_not_indexed() {
        let index = build_header_index(&headers(&["Name", "", "  "]));
        assert_eq!(index.len(), 1);
        assert_eq!(lookup(&index, ""), None);
    }

    #[test]
    fn reports_missing_columns_in_order() {
        let index = build_header_index(&headers(&["Name", "Class"]));
        let missing = missing_columns(&index, ["Roll No", "name", "Section"]);
        assert_eq!(missing, vec!["Roll No".to_string(), "Section".to_string()]);
    }
}
