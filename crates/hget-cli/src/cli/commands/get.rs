//! `hget get|file|dir` – fetch a URL into a destination.

use anyhow::{Context, Result};
use hget_core::config::GetterConfig;
use hget_core::http::CurlClient;
use hget_core::locator;
use hget_core::netrc::{CredentialSource, NetrcCredentials};
use hget_core::{ClientMode, HttpDispatcher};
use std::path::Path;
use std::sync::Arc;

/// Mode chosen on the command line instead of from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forced {
    File,
    Dir,
}

pub fn run_get(
    cfg: &GetterConfig,
    use_netrc: bool,
    url: &str,
    dst: &Path,
    forced: Option<Forced>,
) -> Result<()> {
    let url = locator::parse(url)?;
    let credentials: Option<Arc<dyn CredentialSource>> = if use_netrc {
        Some(Arc::new(NetrcCredentials::from_env()))
    } else {
        None
    };
    let dispatcher = HttpDispatcher::new(Arc::new(CurlClient::new(cfg.http.clone())))
        .with_credentials(credentials);
    let getter = dispatcher.getter();

    let mode = match forced {
        Some(Forced::File) => ClientMode::File,
        Some(Forced::Dir) => ClientMode::Dir,
        None => getter.client_mode(&url),
    };
    tracing::info!("get {} ({}) -> {}", url, mode.as_str(), dst.display());

    match mode {
        ClientMode::Dir => {
            getter
                .get(dst, &url)
                .with_context(|| format!("fetch directory {}", url))?;
            println!("{} -> {}", url, dst.display());
        }
        ClientMode::File => {
            let outcome = getter
                .get_file(dst, &url)
                .with_context(|| format!("fetch file {}", url))?;
            if let Some(w) = &outcome.range_warning {
                tracing::warn!("{}", w);
                eprintln!("warning: {}; fetched the entire file", w);
            }
            println!(
                "{} -> {} ({} bytes{})",
                url,
                dst.display(),
                outcome.bytes_written,
                if outcome.partial { ", partial" } else { "" }
            );
        }
    }
    Ok(())
}
