//! Short URL API endpoints
//!
//! Creation, listing and statistics of short URLs

use axum::Extension;
use serde::Deserialize;
use serde_json::Value;

use crate::service::CreateShortLink;
use crate::service::ListView;
use crate::service::ShortLinkService;
use crate::service::ShortLinkSummary;
use crate::service::StatsView;
use crate::storage::Storage;

use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::parse_expiry;

/// Create short URL form
///
/// Unknown fields are rejected
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateShortUrlForm {
    /// URL to shorten, required
    #[serde(rename = "longURL")]
    long_url: Option<String>,

    /// Custom shortcode, generated when absent or empty
    shortcode: Option<String>,

    /// Minutes until expiry, as a number or a numeric string
    expiry: Option<Value>,
}

/// Create a short URL based on the [`CreateShortUrlForm`](CreateShortUrlForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "longURL": "https://openai.com", "shortcode": "gpt", "expiry": 60 }' \
///     http://localhost:5000/shorturls
/// ```
///
/// Response:
/// ```json
/// { "success": true, "data": { "shortcode": "gpt", "shortURL": "http://localhost:5000/gpt" ... } }
/// ```
pub async fn create<S: Storage>(
    Extension(service): Extension<ShortLinkService<S>>,
    Form(form): Form<CreateShortUrlForm>,
) -> Result<Success<ShortLinkSummary>, Error> {
    let Some(long_url) = form.long_url.filter(|long_url| !long_url.is_empty()) else {
        tracing::debug!("Missing longURL in request body");

        return Err(Error::bad_request("longURL is required"));
    };

    let values = CreateShortLink {
        long_url,
        shortcode: form.shortcode,
        expiry_minutes: parse_expiry(form.expiry.as_ref())?,
    };

    let summary = service.create(&values).await?;

    Ok(Success::created(summary))
}

/// List all short URLs, expired ones included
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/shorturls
/// ```
///
/// Response:
/// ```json
/// { "success": true, "data": [ { "shortcode": "gpt", "clicks": 3, "isExpired": false ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(service): Extension<ShortLinkService<S>>,
) -> Result<Success<Vec<ListView>>, Error> {
    let short_urls = service.list().await?;

    Ok(Success::ok(short_urls))
}

/// Get a single short URL, without its click history
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/shorturls/gpt
/// ```
pub async fn single<S: Storage>(
    Extension(service): Extension<ShortLinkService<S>>,
    PathParameters(shortcode): PathParameters<String>,
) -> Result<Success<ListView>, Error> {
    let short_url = service.single(&shortcode).await?;

    Ok(Success::ok(short_url))
}

/// Get the statistics of a single short URL, including every recorded click
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/shorturls/gpt/stats
/// ```
///
/// Response:
/// ```json
/// { "success": true, "data": { "shortcode": "gpt", "clicks": 1, "clickLogs": [ ... ] ... } }
/// ```
pub async fn stats<S: Storage>(
    Extension(service): Extension<ShortLinkService<S>>,
    PathParameters(shortcode): PathParameters<String>,
) -> Result<Success<StatsView>, Error> {
    let stats = service.stats(&shortcode).await?;

    Ok(Success::ok(stats))
}
