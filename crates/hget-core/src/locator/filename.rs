//! Local file names for sources fetched into a directory.

use url::Url;

/// Name used when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// File name for saving `url` inside a directory: last non-empty path
/// segment, sanitized, or `download.bin`.
pub fn filename_for(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segs| segs.rfind(|s| !s.is_empty()));

    match segment.map(sanitize_filename) {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => DEFAULT_FILENAME.to_string(),
    }
}

/// Sanitizes a candidate file name.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots, spaces and underscores
/// - Limits length to 255 bytes (NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
