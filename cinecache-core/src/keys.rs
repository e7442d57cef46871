//! Canonical cache keys derived from request URLs.
//!
//! Two requests that differ only in query-parameter order, in how their
//! values were percent-encoded, or in whether they carried the upstream
//! credential parameter collapse onto the same key.

use url::{Url, form_urlencoded};

/// Query parameter carrying the upstream API credential.
pub const DEFAULT_CREDENTIAL_PARAM: &str = "api_key";

#[derive(Debug, Clone)]
pub struct KeyCodec {
    credential_param: String,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_PARAM)
    }
}

impl KeyCodec {
    pub fn new(credential_param: impl Into<String>) -> Self {
        Self {
            credential_param: credential_param.into(),
        }
    }

    pub fn credential_param(&self) -> &str {
        &self.credential_param
    }

    /// Derive the cache key for `url`, which may be absolute or just a
    /// path with an optional query string.
    ///
    /// The path is kept verbatim. Parameters are decoded, the credential
    /// parameter is dropped (compared case-insensitively), and the rest are
    /// stably sorted by name byte-wise before being re-encoded. Repeated
    /// parameters stay as separate entries.
    pub fn derive_key(&self, url: &str) -> String {
        let without_fragment =
            url.split_once('#').map_or(url, |(head, _)| head);
        let (target, query) = match without_fragment.split_once('?') {
            Some((target, query)) => (target, Some(query)),
            None => (without_fragment, None),
        };
        let path = strip_origin(target);

        let mut params: Vec<(String, String)> = query
            .map(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .filter(|(name, _)| {
                        !name.eq_ignore_ascii_case(&self.credential_param)
                    })
                    .collect()
            })
            .unwrap_or_default();

        if params.is_empty() {
            return path.to_string();
        }

        params.sort_by(|left, right| left.0.cmp(&right.0));

        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();

        format!("{path}?{encoded}")
    }
}

/// Path of `target` as written. Only a parseable absolute URL with an
/// authority loses its origin; anything else is already a path.
fn strip_origin(target: &str) -> &str {
    let Ok(parsed) = Url::parse(target) else {
        return target;
    };
    let Some(rest) = target
        .get(parsed.scheme().len()..)
        .and_then(|rest| rest.strip_prefix("://"))
    else {
        return target;
    };
    rest.find('/').map_or("/", |slash| &rest[slash..])
}
