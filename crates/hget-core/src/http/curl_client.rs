//! libcurl-backed `HttpClient`.
//!
//! One `Easy` handle per request, so a single `CurlClient` can be shared
//! between threads. Redirects are followed; the head handed to sinks is the
//! one of the final response.

use super::{parse_head, HttpClient, ResponseHead, ResponseSink};
use crate::config::HttpConfig;
use crate::error::{FetchError, Result};
use std::cell::RefCell;
use std::str;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    cfg: HttpConfig,
}

impl CurlClient {
    pub fn new(cfg: HttpConfig) -> Self {
        Self { cfg }
    }

    fn easy(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<curl::easy::Easy> {
        let transport = |source| FetchError::Transport {
            method,
            url: url.to_string(),
            source,
        };

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(transport)?;
        easy.follow_location(true).map_err(transport)?;
        easy.max_redirections(self.cfg.max_redirections)
            .map_err(transport)?;
        easy.connect_timeout(Duration::from_secs(self.cfg.connect_timeout_secs))
            .map_err(transport)?;
        easy.low_speed_limit(self.cfg.low_speed_limit)
            .map_err(transport)?;
        easy.low_speed_time(Duration::from_secs(self.cfg.low_speed_time_secs))
            .map_err(transport)?;
        easy.timeout(Duration::from_secs(self.cfg.timeout_secs))
            .map_err(transport)?;
        if let Some(ua) = &self.cfg.user_agent {
            easy.useragent(ua).map_err(transport)?;
        }
        if method == "HEAD" {
            easy.nobody(true).map_err(transport)?;
        }

        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))
                    .map_err(transport)?;
            }
            easy.http_headers(list).map_err(transport)?;
        }
        Ok(easy)
    }
}

fn collect_header(lines: &RefCell<Vec<String>>, data: &[u8]) -> bool {
    if let Ok(s) = str::from_utf8(data) {
        lines.borrow_mut().push(s.trim_end().to_string());
    }
    true
}

impl HttpClient for CurlClient {
    fn head(&self, url: &str, headers: &[(String, String)]) -> Result<ResponseHead> {
        let transport = |source| FetchError::Transport {
            method: "HEAD",
            url: url.to_string(),
            source,
        };
        let lines = RefCell::new(Vec::new());

        let mut easy = self.easy("HEAD", url, headers)?;
        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| collect_header(&lines, data))
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let mut head = parse_head(&lines.into_inner());
        head.status = easy.response_code().map_err(transport)?;
        Ok(head)
    }

    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        sink: &mut dyn ResponseSink,
    ) -> Result<ResponseHead> {
        let transport = |source| FetchError::Transport {
            method: "GET",
            url: url.to_string(),
            source,
        };
        let lines = RefCell::new(Vec::new());
        let mut delivered = false;
        let mut sink_error: Option<FetchError> = None;

        let mut easy = self.easy("GET", url, headers)?;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| collect_header(&lines, data))
                .map_err(transport)?;
            transfer
                .write_function(|data| {
                    if !delivered {
                        delivered = true;
                        let head = parse_head(&lines.borrow());
                        if let Err(e) = sink.head(&head) {
                            sink_error = Some(e);
                            return Ok(0); // abort transfer
                        }
                    }
                    match sink.body(data) {
                        Ok(()) => Ok(data.len()),
                        Err(e) => {
                            sink_error = Some(e);
                            Ok(0)
                        }
                    }
                })
                .map_err(transport)?;
            transfer.perform()
        };

        // A sink abort surfaces from curl as a write error; report the cause.
        if let Some(e) = sink_error {
            return Err(e);
        }
        performed.map_err(transport)?;

        let mut head = parse_head(&lines.into_inner());
        head.status = easy.response_code().map_err(transport)?;
        if !delivered {
            // Empty body: the write callback never ran.
            sink.head(&head)?;
        }
        Ok(head)
    }
}
