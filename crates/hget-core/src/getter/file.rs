//! File mode: optional range negotiation, then one GET streamed to disk.

use crate::error::{FetchError, Result};
use crate::http::{HttpClient, ResponseHead, ResponseSink};
use crate::range::{self, ByteRange, RangeError};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// What a file fetch did, beyond succeeding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    /// A `Range` header was sent (and 206 was acceptable).
    pub partial: bool,
    pub bytes_written: u64,
    /// The range directive was present but invalid; the whole file was fetched.
    pub range_warning: Option<RangeError>,
}

/// Writes an accepted response body to `dst`. The file is only created once
/// the status has been accepted.
struct FileSink<'a> {
    dst: &'a Path,
    url: &'a str,
    partial: bool,
    file: Option<BufWriter<File>>,
    created: bool,
    written: u64,
}

impl<'a> FileSink<'a> {
    fn new(dst: &'a Path, url: &'a str, partial: bool) -> Self {
        Self {
            dst,
            url,
            partial,
            file: None,
            created: false,
            written: 0,
        }
    }

    fn finish(&mut self) -> Result<u64> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .map_err(|e| FetchError::io("write", self.dst, e))?;
        }
        Ok(self.written)
    }

    /// Removes whatever was written so far.
    fn discard(&mut self) {
        drop(self.file.take());
        if self.created {
            if let Err(e) = fs::remove_file(self.dst) {
                tracing::warn!("could not remove partial file {}: {}", self.dst.display(), e);
            }
        }
    }
}

impl ResponseSink for FileSink<'_> {
    fn head(&mut self, head: &ResponseHead) -> Result<()> {
        let accepted = head.status == 200 || (self.partial && head.status == 206);
        if !accepted {
            return Err(FetchError::BadStatus {
                method: "GET",
                url: self.url.to_string(),
                code: head.status,
            });
        }

        if let Some(parent) = self.dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FetchError::io("create", parent, e))?;
        }
        let file = File::create(self.dst).map_err(|e| FetchError::io("create", self.dst, e))?;
        self.file = Some(BufWriter::new(file));
        self.created = true;
        Ok(())
    }

    fn body(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            FetchError::io(
                "write",
                self.dst,
                io::Error::new(io::ErrorKind::Other, "response body before head"),
            )
        })?;
        file.write_all(chunk)
            .map_err(|e| FetchError::io("write", self.dst, e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }
}

/// Fetches `url` into `dst`.
///
/// `range` is the parsed directive: `Ok(None)` for none, `Err` for an invalid
/// one (reported back in the outcome, never fatal). A valid range is only
/// sent after a successful HEAD probe advertising byte ranges.
pub(crate) fn fetch_file(
    client: &dyn HttpClient,
    dst: &Path,
    url: &str,
    range: std::result::Result<Option<ByteRange>, RangeError>,
) -> Result<FileOutcome> {
    let (range, range_warning) = match range {
        Ok(r) => (r, None),
        Err(e) => {
            tracing::debug!("{}; going to disregard range request and download entire file", e);
            (None, Some(e))
        }
    };

    let mut headers = Vec::new();
    let mut partial = false;
    if let Some(r) = range {
        if range::negotiate(client, url, &[]) {
            headers.push(("Range".to_string(), r.header_value()));
            partial = true;
        }
    }

    let mut sink = FileSink::new(dst, url, partial);
    let result = client
        .get(url, &headers, &mut sink)
        .and_then(|_| sink.finish());
    let bytes_written = match result {
        Ok(n) => n,
        Err(e) => {
            sink.discard();
            return Err(e);
        }
    };

    tracing::info!(
        "fetched {} -> {} ({} bytes{})",
        url,
        dst.display(),
        bytes_written,
        if partial { ", partial" } else { "" }
    );
    Ok(FileOutcome {
        partial,
        bytes_written,
        range_warning,
    })
}
