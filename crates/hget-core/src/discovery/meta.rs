//! Tolerant scanner for `<meta name="terraform-get" content="...">`.
//!
//! Not a markup parser: it walks the document tag by tag, skipping anything it
//! does not understand, until it finds the meta tag or reaches the end of the
//! document head (`<body>` or `</head>`). Content past that point is never
//! looked at, not even for encoding problems.

use crate::error::{FetchError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Still inside the document head, looking for the tag.
    ScanningHead,
    /// Matching meta tag found; holds its `content`.
    Found(String),
    /// Reached `<body>`, `</head>`, end of input, or a truncated tag.
    Stopped,
}

/// Charsets the scanner can read. Anything else declared in an XML
/// declaration is refused.
const SUPPORTED_CHARSETS: &[&str] = &["utf-8", "ascii", "us-ascii"];

pub struct MetaScanner<'a> {
    doc: &'a [u8],
    pos: usize,
    keyword: &'a str,
    state: ScanState,
}

/// A parsed start tag or processing instruction.
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Value of the first attribute named `key` (case-insensitive), or "".
    fn attr(&self, key: &str) -> &str {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl<'a> MetaScanner<'a> {
    pub fn new(doc: &'a [u8], keyword: &'a str) -> Self {
        Self {
            doc,
            pos: 0,
            keyword,
            state: ScanState::ScanningHead,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Scans until the tag is found or the head ends. Returns the tag's
    /// `content`, or `None` if there is no matching tag in the head.
    pub fn run(mut self) -> Result<Option<String>> {
        while self.state == ScanState::ScanningHead {
            self.step()?;
        }
        let scanned = &self.doc[..self.pos.min(self.doc.len())];
        if let Err(e) = std::str::from_utf8(scanned) {
            return Err(FetchError::Markup {
                reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            });
        }
        match self.state {
            ScanState::Found(content) => Ok(Some(content)),
            _ => Ok(None),
        }
    }

    /// Consumes the next token.
    pub fn step(&mut self) -> Result<()> {
        if self.state != ScanState::ScanningHead {
            return Ok(());
        }
        let Some(off) = self.doc[self.pos..].iter().position(|&b| b == b'<') else {
            self.stop_at(self.doc.len());
            return Ok(());
        };
        self.pos += off;
        let rest = &self.doc[self.pos..];

        if rest.starts_with(b"<!--") {
            self.skip_past(b"-->");
        } else if rest.starts_with(b"<![CDATA[") {
            self.skip_past(b"]]>");
        } else if rest.starts_with(b"<!") {
            self.skip_past(b">");
        } else if rest.starts_with(b"<?") {
            self.processing_instruction()?;
        } else if rest.starts_with(b"</") {
            self.end_tag();
        } else if rest.get(1).is_some_and(|&b| is_name_start(b)) {
            self.start_tag();
        } else {
            // Lone '<' in text.
            self.pos += 1;
        }
        Ok(())
    }

    fn stop_at(&mut self, pos: usize) {
        self.pos = pos;
        self.state = ScanState::Stopped;
    }

    /// Moves past the next `needle`; stops the scan if there is none.
    fn skip_past(&mut self, needle: &[u8]) {
        match find(&self.doc[self.pos..], needle) {
            Some(i) => self.pos += i + needle.len(),
            None => self.stop_at(self.doc.len()),
        }
    }

    fn processing_instruction(&mut self) -> Result<()> {
        let Some((tag, end)) = parse_tag(self.doc, self.pos + 2) else {
            self.stop_at(self.doc.len());
            return Ok(());
        };
        if tag.is("xml") {
            let encoding = tag.attr("encoding");
            if !encoding.is_empty()
                && !SUPPORTED_CHARSETS
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(encoding))
            {
                return Err(FetchError::UnsupportedCharset {
                    charset: encoding.to_string(),
                });
            }
        }
        self.pos = end;
        Ok(())
    }

    fn end_tag(&mut self) {
        let mut i = self.pos + 2;
        let name = take_name(self.doc, &mut i);
        match find(&self.doc[i..], b">") {
            Some(gt) if local_name(&name).eq_ignore_ascii_case("head") => {
                self.stop_at(i + gt + 1)
            }
            Some(gt) => self.pos = i + gt + 1,
            None => self.stop_at(self.doc.len()),
        }
    }

    fn start_tag(&mut self) {
        let Some((tag, end)) = parse_tag(self.doc, self.pos + 1) else {
            self.stop_at(self.doc.len());
            return;
        };
        let name = local_name(&tag.name);

        if name.eq_ignore_ascii_case("body") {
            self.stop_at(end);
            return;
        }
        self.pos = end;

        if name.eq_ignore_ascii_case("meta") && tag.attr("name") == self.keyword {
            let content = tag.attr("content");
            if !content.is_empty() {
                self.state = ScanState::Found(content.to_string());
            }
        }
    }
}

/// Finds the source in `doc`: see `MetaScanner`.
pub fn find_source(doc: &[u8], keyword: &str) -> Result<Option<String>> {
    MetaScanner::new(doc, keyword).run()
}

/// Parses a tag name and attributes starting at `i` (just past `<` or `<?`).
/// Returns the tag and the index just past the closing `>`, or `None` when
/// the input ends first.
fn parse_tag(doc: &[u8], mut i: usize) -> Option<(Tag, usize)> {
    let name = take_name(doc, &mut i);
    let mut attrs = Vec::new();

    loop {
        skip_ws(doc, &mut i);
        match *doc.get(i)? {
            b'>' => return Some((Tag { name, attrs }, i + 1)),
            b'/' | b'?' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let key_start = i;
        while doc
            .get(i)
            .is_some_and(|&b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'?'))
        {
            i += 1;
        }
        if i == key_start {
            // Stray '='.
            i += 1;
            continue;
        }
        let key = String::from_utf8_lossy(&doc[key_start..i]).into_owned();

        skip_ws(doc, &mut i);
        if doc.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(doc, &mut i);
            let value = take_value(doc, &mut i)?;
            attrs.push((key, unescape(&value)));
        } else {
            // Valueless attribute: its value is its name.
            attrs.push((key.clone(), key));
        }
    }
}

fn take_value(doc: &[u8], i: &mut usize) -> Option<String> {
    let start = *i;
    match *doc.get(start)? {
        q @ (b'"' | b'\'') => {
            let len = doc[start + 1..].iter().position(|&b| b == q)?;
            *i = start + 1 + len + 1;
            Some(String::from_utf8_lossy(&doc[start + 1..start + 1 + len]).into_owned())
        }
        _ => {
            while doc
                .get(*i)
                .is_some_and(|&b| !b.is_ascii_whitespace() && b != b'>')
            {
                *i += 1;
            }
            Some(String::from_utf8_lossy(&doc[start..*i]).into_owned())
        }
    }
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

fn take_name(doc: &[u8], i: &mut usize) -> String {
    let start = *i;
    while doc
        .get(*i)
        .is_some_and(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.'))
    {
        *i += 1;
    }
    doc[start..*i].iter().map(|&b| b as char).collect()
}

/// `x:meta` → `meta`.
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn skip_ws(doc: &[u8], i: &mut usize) {
    while doc.get(*i).is_some_and(|b| b.is_ascii_whitespace()) {
        *i += 1;
    }
}

fn find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

/// Decodes `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&#NN;` and `&#xHH;`.
/// Unknown or broken references are kept as written.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(|n| n.ok())
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
