//! Sitemap Reader — turns a sitemap URL or pasted sitemap XML into page URLs.
//!
//! Extraction rule:
//! 1. `<loc>` children of `<url>` elements in the sitemaps.org namespace.
//! 2. If that yields nothing, every `<loc>` element in the document, whatever its namespace.
//!
//! Order is document order; duplicates are kept.

use std::time::Duration;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;
use tracing::{error, info};

use crate::acquisition::http::{FetchError, Fetcher};

pub const SITEMAP_NAMESPACE: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";
const SITEMAP_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("could not download sitemap: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid sitemap XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid sitemap XML: {0}")]
    Attribute(#[from] AttrError),

    #[error("invalid sitemap XML: {0}")]
    Malformed(&'static str),
}

#[derive(Clone)]
pub struct SitemapReader {
    fetcher: Fetcher,
    timeout: Duration,
}

impl SitemapReader {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            timeout: SITEMAP_FETCH_TIMEOUT,
        }
    }

    /// Extracts page URLs from `source`, a sitemap URL or the sitemap XML itself.
    ///
    /// Failures are logged here and returned; callers report them to the user
    /// and carry on with no internal URLs.
    pub async fn read(&self, source: &str) -> Result<Vec<String>, SitemapError> {
        let source = source.trim();
        let parsed = if is_url(source) {
            match self.fetcher.get_text(source, self.timeout).await {
                Ok(xml) => parse_sitemap(&xml),
                Err(e) => Err(e.into()),
            }
        } else {
            parse_sitemap(source)
        };

        match &parsed {
            Ok(urls) => info!("Extracted {} URLs from sitemap", urls.len()),
            Err(e) => error!("Sitemap extraction failed: {e}"),
        }
        parsed
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// An open element on the parse stack.
struct Open {
    in_sitemap_ns: bool,
    local: Vec<u8>,
}

/// Parses sitemap XML and applies the extraction rule.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Open> = Vec::new();
    let mut saw_root = false;
    let mut namespaced = Vec::new();
    let mut any_loc = Vec::new();
    // (is namespaced url/loc, text so far) for the innermost open <loc>
    let mut capture: Option<(bool, String)> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                if stack.is_empty() && saw_root {
                    return Err(SitemapError::Malformed("content after the document element"));
                }
                saw_root = true;
                check_element(&ns, &e)?;

                let open = Open {
                    in_sitemap_ns: is_sitemap_ns(&ns),
                    local: e.local_name().as_ref().to_vec(),
                };
                if open.local == b"loc" {
                    let under_url = stack
                        .last()
                        .is_some_and(|parent| parent.in_sitemap_ns && parent.local == b"url");
                    capture = Some((open.in_sitemap_ns && under_url, String::new()));
                }
                stack.push(open);
            }
            (ns, Event::Empty(e)) => {
                check_element(&ns, &e)?;
                if stack.is_empty() {
                    if saw_root {
                        return Err(SitemapError::Malformed("content after the document element"));
                    }
                    saw_root = true;
                }
            }
            (_, Event::Text(e)) => {
                if stack.is_empty() {
                    return Err(SitemapError::Malformed("text outside the document element"));
                }
                if let Some((_, text)) = capture.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            (_, Event::CData(e)) => {
                if let Some((_, text)) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            (_, Event::End(_)) => {
                let closed = stack
                    .pop()
                    .ok_or(SitemapError::Malformed("unexpected closing tag"))?;
                if closed.local == b"loc" {
                    if let Some((is_namespaced, text)) = capture.take() {
                        let url = text.trim();
                        if !url.is_empty() {
                            if is_namespaced {
                                namespaced.push(url.to_string());
                            }
                            any_loc.push(url.to_string());
                        }
                    }
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(SitemapError::Malformed("no document element"));
    }
    if !stack.is_empty() {
        return Err(SitemapError::Malformed("unclosed element at end of document"));
    }

    Ok(if namespaced.is_empty() {
        any_loc
    } else {
        namespaced
    })
}

/// Rejects what the event reader lets through: bad names, unbound prefixes
/// and broken attributes (unquoted or duplicated).
fn check_element(ns: &ResolveResult, e: &BytesStart) -> Result<(), SitemapError> {
    if !is_xml_name(e.name().as_ref()) {
        return Err(SitemapError::Malformed("invalid element name"));
    }
    if matches!(ns, ResolveResult::Unknown(_)) {
        return Err(SitemapError::Malformed("unbound namespace prefix"));
    }
    for attr in e.attributes() {
        if !is_xml_name(attr?.key.as_ref()) {
            return Err(SitemapError::Malformed("invalid attribute name"));
        }
    }
    Ok(())
}

/// XML `Name` production, with any non-ASCII byte accepted as a name character.
fn is_xml_name(name: &[u8]) -> bool {
    let Some((&first, rest)) = name.split_first() else {
        return false;
    };
    let start = |b: u8| b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80;
    start(first)
        && rest
            .iter()
            .all(|&b| start(b) || b.is_ascii_digit() || b == b'-' || b == b'.')
}

fn is_sitemap_ns(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE)
}
