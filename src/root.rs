//! The root!
//!
//! The most important part of the service, the actual redirect logic

use std::str::Utf8Error;

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::LOCATION;
use axum::http::header::REFERER;
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::api::Error;
use crate::service::ShortLinkService;
use crate::storage::Storage;

/// The root!
///
/// All requests not matched by the API end up in this function.
///
/// The path is the shortcode: expired short links answer `410 Gone`, live ones redirect with
/// `302 Found` after the click is recorded. `HEAD` redirects the same way without a click.
pub async fn root<S: Storage>(
    Extension(service): Extension<ShortLinkService<S>>,
    method: Method,
    user_agent: Option<TypedHeader<UserAgent>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<(StatusCode, HeaderMap), Error> {
    let shortcode = uri.path().trim_start_matches('/');

    if !matches!(method, Method::GET | Method::HEAD)
        || shortcode.is_empty()
        || shortcode.contains('/')
    {
        tracing::debug!("Route not found: {method} {uri}");

        return Err(route_not_found().await);
    }

    let shortcode = url_decode_shortcode(shortcode)
        .map_err(|_| Error::bad_request("URL contains invalid UTF-8 characters"))?;

    tracing::debug!("Looking for shortcode: /{shortcode}");

    let resolved = service.resolve(&shortcode).await?;

    // only an actual visit counts as a click
    if method == Method::GET {
        let referrer = headers
            .get(REFERER)
            .and_then(|referrer| referrer.to_str().ok());

        service
            .record_click(
                &shortcode,
                referrer,
                user_agent.as_ref().map(|user_agent| user_agent.as_str()),
            )
            .await?;
    }

    tracing::debug!(r#"Shortcode "{shortcode}" redirecting to: {}"#, resolved.long_url);

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location(&resolved.long_url)?);

    Ok((StatusCode::FOUND, headers))
}

/// Response for any route that does not exist
#[allow(clippy::unused_async)]
pub async fn route_not_found() -> Error {
    Error::not_found("Route not found")
}

/// URL decode shortcode
///
/// Uses percentage encoding for the decoding, might error in case of invalid UTF-8
fn url_decode_shortcode(shortcode: &str) -> Result<String, Utf8Error> {
    let decoded = percent_decode_str(shortcode);

    decoded.decode_utf8().map(|decoded| decoded.to_string())
}

/// Location header for a long URL
///
/// Long URLs are stored as given, when that is not plain ASCII the normalized form of the URL is
/// used instead
fn location(long_url: &str) -> Result<HeaderValue, Error> {
    if long_url.is_ascii() {
        if let Ok(location) = HeaderValue::from_str(long_url) {
            return Ok(location);
        }
    }

    Url::parse(long_url)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .ok_or_else(|| {
            tracing::error!("Long URL can not be used as location: {long_url}");

            Error::internal_server_error("Internal server error")
        })
}
