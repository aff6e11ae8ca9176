//! API request helpers

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Error;
use crate::service;

/// Parse an expiry in minutes
///
/// Accepts an integer or a string holding one, `null` counts as absent. Whether the number is
/// positive is up to the service.
///
/// ```rust
/// let expiry = serde_json::json!("15");
/// assert_eq!(parse_expiry(Some(&expiry)).unwrap(), Some(15))
/// ```
pub fn parse_expiry(expiry: Option<&Value>) -> Result<Option<i64>, Error> {
    let minutes = match expiry {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    minutes
        .map(Some)
        .ok_or_else(|| Error::from(service::Error::InvalidExpiry))
}

/// Message with the underlying cause appended, when there is one
fn with_source<E>(message: &str, err: &E) -> String
where
    E: std::error::Error,
{
    match err.source() {
        Some(source) => format!("{message}: {source}"),
        None => message.to_string(),
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request(with_source("Data error", &err)))
            }
            JsonRejection::JsonSyntaxError(err) => {
                Err(Error::bad_request(with_source("JSON syntax error", &err)))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => Err(Error::bad_request(with_source(
                "Invalid characters in JSON",
                &err,
            ))),
            err => Err(Error::bad_request(format!("Unknown JSON error: {err}"))),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    F: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => Err(Error::bad_request(
                format!("Invalid path parameter: {}", err.body_text()),
            )),
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request(format!("Missing path parameter: {err}")))
            }
            err => Err(Error::bad_request(format!("Unknown path error: {err}"))),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    P: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}
