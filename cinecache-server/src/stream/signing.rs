use std::{fmt, time::Duration};

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("signing key must not be empty")]
    InvalidKey,
    #[error("invalid stream url: {0}")]
    InvalidUrl(String),
    #[error("unsupported stream url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("stream link expired")]
    Expired,
    #[error("stream link signature mismatch")]
    BadSignature,
    #[error("failed to resolve stream url: {0}")]
    Resolve(String),
}

/// A signed link handed to clients. `url` points at the media proxy and
/// carries the target, expiry and signature as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedStream {
    pub url: String,
    pub target: String,
    pub expires: i64,
    pub signature: String,
}

/// Issues and checks HMAC-SHA256 signatures over `"{expires}\n{url}"`.
#[derive(Clone)]
pub struct StreamSigner {
    key: Zeroizing<Vec<u8>>,
    media_proxy_url: Url,
}

impl fmt::Debug for StreamSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSigner")
            .field("media_proxy_url", &self.media_proxy_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StreamSigner {
    pub fn new(key: &[u8], media_proxy_url: Url) -> Result<Self, SignError> {
        if key.is_empty() {
            return Err(SignError::InvalidKey);
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            media_proxy_url,
        })
    }

    pub fn media_proxy_url(&self) -> &Url {
        &self.media_proxy_url
    }

    pub fn sign(
        &self,
        target: &str,
        ttl: Duration,
        now: i64,
    ) -> Result<SignedStream, SignError> {
        let target = parse_target(target)?;
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires = now.saturating_add(ttl_secs);
        let signature = self.signature(target.as_str(), expires)?;

        let mut url = self.media_proxy_url.clone();
        url.query_pairs_mut()
            .append_pair("url", target.as_str())
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);

        Ok(SignedStream {
            url: url.into(),
            target: target.into(),
            expires,
            signature,
        })
    }

    /// Check a link presented back to the proxy. Expiry is checked before
    /// the signature; the comparison runs in constant time.
    pub fn verify(
        &self,
        target: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> Result<(), SignError> {
        let target = parse_target(target)?;
        if now > expires {
            return Err(SignError::Expired);
        }

        let provided =
            hex::decode(signature).map_err(|_| SignError::BadSignature)?;
        let mac = self.mac(target.as_str(), expires)?;
        mac.verify_slice(&provided)
            .map_err(|_| SignError::BadSignature)
    }

    fn signature(&self, target: &str, expires: i64) -> Result<String, SignError> {
        let mac = self.mac(target, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self, target: &str, expires: i64) -> Result<HmacSha256, SignError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| SignError::InvalidKey)?;
        mac.update(expires.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(target.as_bytes());
        Ok(mac)
    }
}

/// Parse a stream target, accepting only `http` and `https`.
pub fn parse_target(raw: &str) -> Result<Url, SignError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| SignError::InvalidUrl(err.to_string()))?;
    ensure_http(&url)?;
    Ok(url)
}

pub(crate) fn ensure_http(url: &Url) -> Result<(), SignError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SignError::UnsupportedScheme(other.to_string())),
    }
}
