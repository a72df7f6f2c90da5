//! Error types for the HTTP getter.
//!
//! `FetchError` covers every fatal condition. Recoverable conditions (an
//! invalid range directive, a server without range support) never surface
//! here: the range directive error travels inside `FileOutcome` instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// curl reported an error (connect, resolve, timeout, ...).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Response status outside what the request accepts.
    #[error("bad response code: {method} {url} returned HTTP {code}")]
    BadStatus {
        method: &'static str,
        url: String,
        code: u32,
    },

    /// Discovery request succeeded but neither channel named a source.
    #[error("no source URL was returned for {url}")]
    NoSource { url: String },

    /// Discovery body declared (or used) a charset we cannot decode.
    #[error("can't decode document using charset {charset:?}")]
    UnsupportedCharset { charset: String },

    /// Discovery document broke off in a way the tolerant scanner cannot skip.
    #[error("malformed discovery document: {reason}")]
    Markup { reason: String },

    /// Requested subdirectory is missing from the staged tree.
    #[error("error downloading {source_url}: {err}")]
    SubdirMissing {
        source_url: String,
        #[source]
        err: io::Error,
    },

    #[error("{context} {}: {err}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("invalid URL {url:?}: {err}")]
    InvalidUrl {
        url: String,
        #[source]
        err: url::ParseError,
    },

    /// Error from an injected collaborator (dispatcher, resolver, copier, credentials).
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl FetchError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, err: io::Error) -> Self {
        FetchError::Io {
            context,
            path: path.into(),
            err,
        }
    }

    /// HTTP status carried by the error, if it is a status failure.
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::BadStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
