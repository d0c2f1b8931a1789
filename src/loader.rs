//! Document loader: fetching pages and preparing their URLs.
//!
//! A thin, synchronous wrapper over the HTTP client. URL preparation mirrors
//! the way links arrive from social media: shortened links are resolved with
//! a HEAD request (no body download), and the query string (UTM and referral
//! tags) is trimmed so the stored document URL is canonical.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::error::{MarkpipeError, Result};

fn client(headers: &[(String, String)]) -> Result<Client> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| MarkpipeError::FetchError(format!("invalid header name: {}", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| MarkpipeError::FetchError(format!("invalid header value: {}", name)))?;
        map.insert(header_name, header_value);
    }
    Client::builder()
        .default_headers(map)
        .build()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))
}

/// Resolve a shortened URL by following redirects.
///
/// A HEAD request avoids downloading the page body; the client follows
/// redirects and the final destination URL is returned.
pub fn unshorten_url(url: &str, headers: &[(String, String)]) -> Result<String> {
    let response = client(headers)?
        .head(url)
        .send()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))?;
    Ok(response.url().to_string())
}

/// Remove the query string, including UTM and referral tags, from a URL.
///
/// ```rust
/// use markpipe::trim_url;
///
/// let trimmed = trim_url("https://example.com/post.html?utm_source=feed").unwrap();
/// assert_eq!(trimmed, "https://example.com/post.html");
/// ```
pub fn trim_url(url: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|_| MarkpipeError::InvalidUrl(url.to_string()))?;
    parsed.set_query(None);
    Ok(parsed.into())
}

/// Prepare a URL for content extraction: unshorten, then trim.
///
/// With both switches off this is a pass-through.
pub fn prepare_url(
    url: &str,
    unshorten: bool,
    trim: bool,
    headers: &[(String, String)],
) -> Result<String> {
    let mut url = url.to_string();
    if unshorten {
        url = unshorten_url(&url, headers)?;
    }
    if trim {
        url = trim_url(&url)?;
    }
    Ok(url)
}

/// Fetch the HTML body of a URL.
pub fn fetch_html(url: &str, headers: &[(String, String)]) -> Result<String> {
    let response = client(headers)?
        .get(url)
        .send()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))?;
    if !response.status().is_success() {
        return Err(MarkpipeError::FetchError(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }
    response
        .text()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))
}

/// Download a media file to disk and return the path written.
///
/// Without an explicit filename, the name is derived from the URL stem and
/// the extension from the Content-Type response header, so
/// `.../coffee.jpeg` served as `image/jpeg` lands as `coffee.jpeg`.
pub fn download_media(url: &str, filename: Option<&Path>) -> Result<PathBuf> {
    let response = client(&[])?
        .get(url)
        .send()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))?;
    if !response.status().is_success() {
        return Err(MarkpipeError::FetchError(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }

    let path = match filename {
        Some(path) => path.to_path_buf(),
        None => {
            let parsed =
                Url::parse(url).map_err(|_| MarkpipeError::InvalidUrl(url.to_string()))?;
            let segment = parsed
                .path_segments()
                .and_then(|segments| segments.last())
                .filter(|segment| !segment.is_empty())
                .unwrap_or("download");
            let stem = segment.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(segment);
            let extension = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split('/').nth(1))
                .map(|subtype| subtype.split(';').next().unwrap_or(subtype).trim().to_string());
            match extension {
                Some(extension) => PathBuf::from(format!("{}.{}", stem, extension)),
                None => PathBuf::from(segment),
            }
        }
    };

    let bytes = response
        .bytes()
        .map_err(|e| MarkpipeError::FetchError(e.to_string()))?;
    fs::write(&path, &bytes)
        .map_err(|e| MarkpipeError::FetchError(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}
