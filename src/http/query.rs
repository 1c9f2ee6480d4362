use std::collections::HashMap;

/// Splits a request target into its path and the raw query string after the first `?`.
#[must_use]
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Parses a raw query string into a key / value map.
///
/// Pairs are separated by `&` and split on the first `=`. A pair without `=` maps to an empty
/// value, empty pairs are skipped and a repeated key keeps its last value. Values are not
/// percent-decoded.
#[must_use]
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(key.to_string(), value.to_string());
    }
    params
}
