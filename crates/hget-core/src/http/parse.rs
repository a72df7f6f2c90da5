//! Parse raw response header lines into a `ResponseHead`.

use super::ResponseHead;

/// Parse collected header lines into the head of the final response.
///
/// With redirects followed, libcurl reports one header block per response;
/// every status line starts a new block, so only the last block survives.
/// Lines without a `:` (status lines aside) are ignored.
pub fn parse_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status: parse_status(line).unwrap_or(0),
                headers: Vec::new(),
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            head.headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    head
}

/// `HTTP/1.1 206 Partial Content` → 206.
fn parse_status(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
