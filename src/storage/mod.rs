//! All things related to the storage of short links and their clicks

use core::fmt;
use std::future::Future;

use chrono::DateTime;
use chrono::Utc;

use crate::short_links::ClickEvent;
use crate::short_links::ShortLink;

pub use memory::Memory;
#[cfg(feature = "postgres")]
pub use postgres::Postgres;

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> anyhow::Result<Memory> {
    tracing::info!("Using in-memory storage, short links are lost on shutdown");

    Ok(Memory::new())
}

/// Setup the storage
///
/// Uses the `DATABASE_URL` environment variable
#[cfg(feature = "postgres")]
pub async fn setup() -> anyhow::Result<Postgres> {
    use anyhow::Context;

    let database_url = std::env::var("DATABASE_URL").context("`DATABASE_URL` is not set")?;

    Postgres::connect(&database_url).await
}

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// The shortcode is already taken by another short link
    Conflict,

    /// No short link with the shortcode exists
    NotFound,

    /// A connection error with the storage
    Connection(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Conflict => write!(f, "Shortcode already exists"),
            Error::NotFound => write!(f, "Shortcode does not exist"),
            Error::Connection(error) => write!(f, "Connection error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a short link
pub struct CreateShortLinkValues<'a> {
    /// The unique shortcode
    pub shortcode: &'a str,

    /// The URL the shortcode redirects to, already validated
    pub long_url: &'a str,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Moment after which the shortcode stops redirecting
    pub expiry_time: DateTime<Utc>,
}

/// Storage with all supported operations
///
/// Every operation is a single atomic step, implementations may be called concurrently
pub trait Storage: Clone + Send + Sync + 'static {
    /// Insert a new short link
    ///
    /// Fails with [`Error::Conflict`] when the shortcode exists, the check and the insert are
    /// one operation so at most one of several concurrent inserts can win
    fn insert(
        &self,
        values: &CreateShortLinkValues<'_>,
    ) -> impl Future<Output = Result<ShortLink>> + Send;

    /// Find a single short link by its shortcode, including its click logs
    ///
    /// Expired short links are returned as well
    fn find_by_shortcode(
        &self,
        shortcode: &str,
    ) -> impl Future<Output = Result<Option<ShortLink>>> + Send;

    /// Find a single short link by its shortcode, without its click logs
    fn find_summary_by_shortcode(
        &self,
        shortcode: &str,
    ) -> impl Future<Output = Result<Option<ShortLink>>> + Send;

    /// Record a click: increment the counter and append the event in one update
    ///
    /// Fails with [`Error::NotFound`] when the shortcode does not exist
    fn record_click(
        &self,
        shortcode: &str,
        event: &ClickEvent,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Find all short links, newest first, without their click logs
    fn find_all(&self) -> impl Future<Output = Result<Vec<ShortLink>>> + Send;

    /// Physically remove short links that expired before the given moment
    ///
    /// Returns the number of removed short links
    fn delete_expired(&self, before: DateTime<Utc>) -> impl Future<Output = Result<u64>> + Send;

    /// Release the resources held by the storage
    fn close(&self) -> impl Future<Output = ()> + Send;
}
