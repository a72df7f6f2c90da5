//! Split `source//subdir` into the base source and the subdirectory.

/// Splits a source string at the first `//` that follows the scheme's `://`.
///
/// Returns `(base, subdir)`; `subdir` is empty when none is present. A query
/// string trailing the subdir belongs to the base and is moved back onto it.
/// `//` inside the query string is never treated as the separator.
///
/// - `"https://example.com/real/module.zip//sub/dir"` → `("https://example.com/real/module.zip", "sub/dir")`
/// - `"https://example.com/m.zip//sub?ref=v1"` → `("https://example.com/m.zip?ref=v1", "sub")`
pub fn split_subdir(source: &str) -> (String, String) {
    let stop = source.find('?').unwrap_or(source.len());
    let offset = source[..stop].find("://").map(|i| i + 3).unwrap_or(0);

    let idx = match source[offset..stop].find("//") {
        Some(i) => i + offset,
        None => return (source.to_string(), String::new()),
    };

    let mut base = source[..idx].to_string();
    let mut subdir = &source[idx + 2..];
    if let Some(q) = subdir.find('?') {
        base.push_str(&subdir[q..]);
        subdir = &subdir[..q];
    }
    (base, subdir.to_string())
}
