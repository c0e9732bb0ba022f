//! Shared HTTP fetcher for sitemap and page downloads.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

/// Browser-like User-Agent; some sites refuse requests from unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// How far into a page to look for a `<meta>` charset declaration.
const META_SNIFF_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Thin wrapper over a pooled `reqwest::Client`.
/// Plain GETs only: no auth, no caching headers, default redirect policy.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self { client })
    }

    /// GETs `url` and returns the body as text. Non-2xx responses are errors.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let body = self
            .get(url, timeout)
            .await?
            .text()
            .await
            .map_err(|source| request_error(url, source))?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }

    /// GETs an HTML page and decodes it by BOM, then the Content-Type charset,
    /// then a `<meta>` declaration, falling back to UTF-8.
    pub async fn get_html(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self.get(url, timeout).await?;
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| charset_label(v.as_bytes()))
            .map(<[u8]>::to_vec);
        let bytes = response
            .bytes()
            .await
            .map_err(|source| request_error(url, source))?;
        debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(decode_html(&bytes, declared.as_deref()))
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn request_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        source,
    }
}

/// Decodes page bytes. A BOM wins over `declared`, which wins over a
/// `<meta>` charset near the top of the document.
pub fn decode_html(bytes: &[u8], declared: Option<&[u8]>) -> String {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let encoding = declared
        .and_then(Encoding::for_label)
        .or_else(|| charset_label(head).and_then(Encoding::for_label))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Value following the first `charset=`, unquoted. Matches both a
/// Content-Type header and `<meta charset>` / `<meta http-equiv>` markup.
fn charset_label(haystack: &[u8]) -> Option<&[u8]> {
    const KEY: &[u8] = b"charset=";
    let start = haystack
        .windows(KEY.len())
        .position(|w| w.eq_ignore_ascii_case(KEY))?
        + KEY.len();
    let rest = &haystack[start..];
    let rest = rest
        .strip_prefix(b"\"")
        .or_else(|| rest.strip_prefix(b"'"))
        .unwrap_or(rest);
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}
