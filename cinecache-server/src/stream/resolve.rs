use std::time::Duration;

use reqwest::{Client, header::LOCATION, redirect};
use tracing::debug;
use url::Url;

use super::signing::{SignError, ensure_http, parse_target};

pub const MAX_REDIRECTS: usize = 10;

/// Follows redirects by hand with `HEAD` requests so the final location can
/// be signed instead of an intermediate hop.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    http: Client,
    max_redirects: usize,
}

impl RedirectResolver {
    pub fn new(timeout: Duration) -> Result<Self, SignError> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(concat!("cinecache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SignError::Resolve(err.to_string()))?;

        Ok(Self {
            http,
            max_redirects: MAX_REDIRECTS,
        })
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Returns the first non-redirect location reachable from `raw`. Any
    /// non-redirect status ends the walk; the media proxy reports it.
    pub async fn resolve(&self, raw: &str) -> Result<Url, SignError> {
        let mut current = parse_target(raw)?;

        for hop in 0..=self.max_redirects {
            let response = self
                .http
                .head(current.clone())
                .send()
                .await
                .map_err(|err| SignError::Resolve(err.to_string()))?;

            let status = response.status();
            if !status.is_redirection() {
                return Ok(current);
            }

            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
            else {
                return Ok(current);
            };

            if hop == self.max_redirects {
                break;
            }

            let next = current
                .join(location)
                .map_err(|err| SignError::Resolve(err.to_string()))?;
            ensure_http(&next)?;
            debug!(hop, from = %current, to = %next, "following stream redirect");
            current = next;
        }

        Err(SignError::Resolve(format!(
            "more than {} redirects",
            self.max_redirects
        )))
    }
}
