//! Credential augmentation from the user's `.netrc`.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Adds credentials to a working copy of a locator before any request.
pub trait CredentialSource: Send + Sync {
    fn augment(&self, url: &mut Url) -> Result<()>;
}

/// One `machine` (or `default`) entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    /// `None` for the `default` entry.
    pub machine: Option<String>,
    pub login: String,
    pub password: String,
}

/// Reads `$NETRC`, or `~/.netrc` when unset. A missing file means no credentials.
#[derive(Debug, Clone)]
pub struct NetrcCredentials {
    path: Option<PathBuf>,
}

impl NetrcCredentials {
    pub fn from_env() -> Self {
        let path = std::env::var_os("NETRC")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| Path::new(&h).join(".netrc")));
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl CredentialSource for NetrcCredentials {
    /// Leaves URLs that already carry user info untouched.
    fn augment(&self, url: &mut Url) -> Result<()> {
        if !url.username().is_empty() {
            return Ok(());
        }
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let entries = parse_netrc(&data);
        let Some(entry) = find_machine(&entries, url) else {
            return Ok(());
        };

        tracing::debug!("using {} credentials for {}", path.display(), url.host_str().unwrap_or(""));
        url.set_username(&entry.login)
            .map_err(|()| anyhow!("cannot set credentials on {}", url))?;
        url.set_password(Some(&entry.password))
            .map_err(|()| anyhow!("cannot set credentials on {}", url))?;
        Ok(())
    }
}

/// Entry for the URL's host: `host:port` first, then bare host, then `default`.
fn find_machine<'a>(entries: &'a [NetrcEntry], url: &Url) -> Option<&'a NetrcEntry> {
    let host = url.host_str()?;
    let with_port = url.port().map(|p| format!("{}:{}", host, p));

    let named = |name: &str| {
        entries
            .iter()
            .find(|e| e.machine.as_deref() == Some(name))
    };
    with_port
        .as_deref()
        .and_then(named)
        .or_else(|| named(host))
        .or_else(|| entries.iter().find(|e| e.machine.is_none()))
}

/// Parses netrc text. `macdef` bodies (up to the next blank line) and `#`
/// comments are skipped; unknown tokens are ignored.
pub fn parse_netrc(data: &str) -> Vec<NetrcEntry> {
    let mut entries: Vec<NetrcEntry> = Vec::new();
    let mut in_macro = false;

    for line in data.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        let line = line.split('#').next().unwrap_or("");
        let mut tokens = line.split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "machine" => entries.push(NetrcEntry {
                    machine: tokens.next().map(str::to_string),
                    ..Default::default()
                }),
                "default" => entries.push(NetrcEntry::default()),
                "login" | "password" | "account" => {
                    let value = tokens.next().unwrap_or("").to_string();
                    if let Some(entry) = entries.last_mut() {
                        match token {
                            "login" => entry.login = value,
                            "password" => entry.password = value,
                            _ => {}
                        }
                    }
                }
                "macdef" => {
                    in_macro = true;
                    break;
                }
                _ => {}
            }
        }
    }

    entries
}
