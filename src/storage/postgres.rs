//! Postgres storage
//!
//! Uniqueness of shortcodes is enforced by the primary key, clicks are serialized per short link
//! by the row lock taken when incrementing the counter

use std::time::Duration;

use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::short_links::ClickEvent;
use crate::short_links::ShortLink;

use super::CreateShortLinkValues;
use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Could not connect to the database")?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> anyhow::Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .context("Migrations could not run")?;

        Ok(Self { connection_pool })
    }
}

/// `SQLx` version of a short link, without click logs
#[derive(sqlx::FromRow)]
struct SqlxShortLink {
    /// Shortcode
    shortcode: String,

    /// Long URL
    long_url: String,

    /// Creation date
    created_at: DateTime<Utc>,

    /// Expiry time
    expiry_time: DateTime<Utc>,

    /// Click counter
    clicks: i64,
}

/// `SQLx` version of a click event
#[derive(sqlx::FromRow)]
struct SqlxClickEvent {
    /// Time of the click
    clicked_at: DateTime<Utc>,

    /// Referrer
    source: String,

    /// User agent
    user_agent: String,
}

impl ShortLink {
    /// Create short link from `SQLx` version
    fn from_sqlx_short_link(short_link: SqlxShortLink, click_logs: Vec<ClickEvent>) -> Self {
        Self {
            shortcode: short_link.shortcode,
            long_url: short_link.long_url,
            created_at: short_link.created_at,
            expiry_time: short_link.expiry_time,
            clicks: u64::try_from(short_link.clicks).unwrap_or_default(),
            click_logs,
        }
    }
}

impl ClickEvent {
    /// Create click event from `SQLx` version
    fn from_sqlx_click_event(event: SqlxClickEvent) -> Self {
        Self {
            timestamp: event.clicked_at,
            source: event.source,
            user_agent: event.user_agent,
        }
    }
}

impl Storage for Postgres {
    async fn insert(&self, values: &CreateShortLinkValues<'_>) -> Result<ShortLink> {
        let short_link = sqlx::query_as::<_, SqlxShortLink>(
            r"
            INSERT INTO short_links (shortcode, long_url, created_at, expiry_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (shortcode) DO NOTHING
            RETURNING shortcode, long_url, created_at, expiry_time, clicks
            ",
        )
        .bind(values.shortcode)
        .bind(values.long_url)
        .bind(values.created_at)
        .bind(values.expiry_time)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        short_link
            .map(|short_link| ShortLink::from_sqlx_short_link(short_link, Vec::new()))
            .ok_or(Error::Conflict)
    }

    async fn find_by_shortcode(&self, shortcode: &str) -> Result<Option<ShortLink>> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        // counter and logs have to come from the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

        let short_link = sqlx::query_as::<_, SqlxShortLink>(
            r"
            SELECT shortcode, long_url, created_at, expiry_time, clicks
            FROM short_links
            WHERE shortcode = $1
            LIMIT 1
            ",
        )
        .bind(shortcode)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(connection_error)?;

        let Some(short_link) = short_link else {
            return Ok(None);
        };

        let click_logs = sqlx::query_as::<_, SqlxClickEvent>(
            r"
            SELECT clicked_at, source, user_agent
            FROM click_logs
            WHERE shortcode = $1
            ORDER BY id ASC
            ",
        )
        .bind(shortcode)
        .fetch_all(&mut *transaction)
        .await
        .map_err(connection_error)?
        .into_iter()
        .map(ClickEvent::from_sqlx_click_event)
        .collect::<Vec<ClickEvent>>();

        transaction.commit().await.map_err(connection_error)?;

        Ok(Some(ShortLink::from_sqlx_short_link(
            short_link, click_logs,
        )))
    }

    async fn find_summary_by_shortcode(&self, shortcode: &str) -> Result<Option<ShortLink>> {
        let short_link = sqlx::query_as::<_, SqlxShortLink>(
            r"
            SELECT shortcode, long_url, created_at, expiry_time, clicks
            FROM short_links
            WHERE shortcode = $1
            LIMIT 1
            ",
        )
        .bind(shortcode)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(short_link.map(|short_link| ShortLink::from_sqlx_short_link(short_link, Vec::new())))
    }

    async fn record_click(&self, shortcode: &str, event: &ClickEvent) -> Result<()> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        let updated = sqlx::query(
            r"
            UPDATE short_links
            SET clicks = clicks + 1
            WHERE shortcode = $1
            ",
        )
        .bind(shortcode)
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO click_logs (shortcode, clicked_at, source, user_agent)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(shortcode)
        .bind(event.timestamp)
        .bind(&event.source)
        .bind(&event.user_agent)
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        let short_links = sqlx::query_as::<_, SqlxShortLink>(
            r"
            SELECT shortcode, long_url, created_at, expiry_time, clicks
            FROM short_links
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?
        .into_iter()
        .map(|short_link| ShortLink::from_sqlx_short_link(short_link, Vec::new()))
        .collect::<Vec<ShortLink>>();

        Ok(short_links)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let deleted = sqlx::query(
            r"
            DELETE FROM short_links
            WHERE expiry_time < $1
            ",
        )
        .bind(before)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(deleted.rows_affected())
    }

    async fn close(&self) {
        self.connection_pool.close().await;
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
