//! Client mode: does a locator address a single file or a directory tree?

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    File,
    Dir,
}

impl ClientMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientMode::File => "file",
            ClientMode::Dir => "dir",
        }
    }
}

/// Directory mode when the URL path ends with `/`, file mode otherwise.
/// Purely syntactic; the query string does not take part.
pub fn classify(url: &Url) -> ClientMode {
    if url.path().ends_with('/') {
        ClientMode::Dir
    } else {
        ClientMode::File
    }
}
