//! Short link service
//!
//! Business rules on top of the storage: validation, shortcode generation, expiry and click
//! recording. No state is kept between calls, every operation reads from the storage.

use core::fmt;
use std::sync::Arc;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Serialize;
use url::Url;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::Settings;
use crate::short_links::ClickEvent;
use crate::short_links::ShortLink;
use crate::shortcode;
use crate::shortcode::Generator;
use crate::shortcode::RandomGenerator;
use crate::storage;
use crate::storage::CreateShortLinkValues;
use crate::storage::Storage;

/// Service errors
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The long URL is not an absolute URL
    InvalidUrl,

    /// The expiry is not a positive number of minutes
    InvalidExpiry,

    /// The custom shortcode can not be used, with the reason
    InvalidShortcode(String),

    /// The custom shortcode is used by another short link
    ShortcodeTaken,

    /// No free shortcode was generated within the attempt budget
    GenerationExhausted,

    /// No short link with the shortcode exists
    NotFound,

    /// The short link exists, but no longer redirects
    Expired,

    /// The storage could not be reached or failed
    StorageUnavailable,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidUrl => write!(f, "Invalid URL format"),
            Error::InvalidExpiry => write!(f, "expiry must be a positive number"),
            Error::InvalidShortcode(reason) => write!(f, "{reason}"),
            Error::ShortcodeTaken => write!(f, "Custom shortcode already exists"),
            Error::GenerationExhausted => write!(f, "Could not generate a unique shortcode"),
            Error::NotFound => write!(f, "Shortcode not found"),
            Error::Expired => write!(f, "URL has expired"),
            Error::StorageUnavailable => write!(f, "Internal server error"),
        }
    }
}

/// Result type for all service interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a short link with
#[derive(Debug, Default)]
pub struct CreateShortLink {
    /// URL to shorten
    pub long_url: String,

    /// Custom shortcode, generated when absent
    pub shortcode: Option<String>,

    /// Minutes until the short link expires, the default when absent
    pub expiry_minutes: Option<i64>,
}

/// A freshly created short link
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLinkSummary {
    pub shortcode: String,
    #[serde(rename = "shortURL")]
    pub short_url: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub clicks: u64,
}

/// Where a shortcode redirects to
#[derive(Debug, PartialEq, Eq)]
pub struct Resolved {
    pub long_url: String,
}

/// Statistics of a single short link, with its full click history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub shortcode: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
    #[serde(rename = "shortURL")]
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub clicks: u64,
    pub click_logs: Vec<ClickEvent>,
    pub is_expired: bool,
}

/// A short link in the listing, without click history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub shortcode: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
    #[serde(rename = "shortURL")]
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub clicks: u64,
    pub is_expired: bool,
}

/// Short link service
#[derive(Clone)]
pub struct ShortLinkService<S: Storage> {
    /// Storage owning all short links
    storage: S,

    /// Source of the current time
    clock: Arc<dyn Clock>,

    /// Source of shortcode candidates
    generator: Arc<dyn Generator>,

    /// Base URL for composed short URLs
    base_url: String,

    /// Minutes a short link lives when no expiry is given
    default_expiry_minutes: u32,

    /// Number of generated shortcodes tried before giving up
    shortcode_attempts: u32,
}

impl<S: Storage> ShortLinkService<S> {
    /// Create the service on top of a storage
    pub fn new(storage: S, settings: &Settings) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            generator: Arc::new(RandomGenerator::new(settings.shortcode_length)),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            default_expiry_minutes: settings.default_expiry_minutes,
            shortcode_attempts: settings.shortcode_attempts,
        }
    }

    /// Use another clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use another shortcode generator
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = generator;
        self
    }

    /// The storage this service works on
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Create a short link
    ///
    /// All input is validated before the storage is touched. A custom shortcode is used as is
    /// and never retried, a generated one is retried until the attempt budget is spent.
    pub async fn create(&self, values: &CreateShortLink) -> Result<ShortLinkSummary> {
        let long_url = parse_long_url(&values.long_url)?;

        let expiry_minutes = match values.expiry_minutes {
            Some(minutes) if minutes > 0 => minutes,
            Some(_) => return Err(Error::InvalidExpiry),
            None => i64::from(self.default_expiry_minutes),
        };

        let created_at = self.clock.now();
        let expiry_time = TimeDelta::try_minutes(expiry_minutes)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .ok_or(Error::InvalidExpiry)?;

        let custom_shortcode = values
            .shortcode
            .as_deref()
            .filter(|shortcode| !shortcode.is_empty());

        let short_link = if let Some(shortcode) = custom_shortcode {
            shortcode::check_custom(shortcode).map_err(Error::InvalidShortcode)?;

            self.insert_custom(shortcode, long_url, created_at, expiry_time)
                .await?
        } else {
            self.insert_generated(long_url, created_at, expiry_time)
                .await?
        };

        tracing::info!(
            "Short URL created: {} -> {}",
            short_link.shortcode,
            short_link.long_url
        );

        Ok(ShortLinkSummary {
            short_url: self.short_url(&short_link.shortcode),
            shortcode: short_link.shortcode,
            long_url: short_link.long_url,
            created_at: short_link.created_at,
            expiry_time: short_link.expiry_time,
            clicks: short_link.clicks,
        })
    }

    /// Insert a short link with a custom shortcode
    async fn insert_custom(
        &self,
        shortcode: &str,
        long_url: &str,
        created_at: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    ) -> Result<ShortLink> {
        let values = CreateShortLinkValues {
            shortcode,
            long_url,
            created_at,
            expiry_time,
        };

        match self.storage.insert(&values).await {
            Ok(short_link) => Ok(short_link),
            Err(storage::Error::Conflict) => {
                tracing::warn!("Custom shortcode already exists: {shortcode}");

                Err(Error::ShortcodeTaken)
            }
            Err(err) => Err(storage_unavailable("insert", shortcode, &err)),
        }
    }

    /// Insert a short link with a generated shortcode
    async fn insert_generated(
        &self,
        long_url: &str,
        created_at: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    ) -> Result<ShortLink> {
        for attempt in 1..=self.shortcode_attempts {
            let shortcode = self.generator.generate();

            let values = CreateShortLinkValues {
                shortcode: &shortcode,
                long_url,
                created_at,
                expiry_time,
            };

            match self.storage.insert(&values).await {
                Ok(short_link) => return Ok(short_link),
                Err(storage::Error::Conflict) => {
                    tracing::debug!(
                        "Generated shortcode {shortcode} is taken (attempt {attempt}/{})",
                        self.shortcode_attempts
                    );
                }
                Err(err) => return Err(storage_unavailable("insert", &shortcode, &err)),
            }
        }

        tracing::error!(
            "No free shortcode found after {} attempts",
            self.shortcode_attempts
        );

        Err(Error::GenerationExhausted)
    }

    /// Resolve a shortcode to the URL it redirects to
    ///
    /// Does not record a click, see [`Self::record_click`]
    pub async fn resolve(&self, shortcode: &str) -> Result<Resolved> {
        let short_link = self.fetch(shortcode, "resolve").await?;

        if short_link.is_expired(self.clock.now()) {
            tracing::warn!("Expired URL accessed: {shortcode}");

            return Err(Error::Expired);
        }

        Ok(Resolved {
            long_url: short_link.long_url,
        })
    }

    /// Record a click on a shortcode
    ///
    /// Expiry is not checked here, it only gates the redirect
    pub async fn record_click(
        &self,
        shortcode: &str,
        referrer: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<()> {
        let event = ClickEvent::new(self.clock.now(), referrer, user_agent);

        match self.storage.record_click(shortcode, &event).await {
            Ok(()) => {
                tracing::info!("Click recorded for: {shortcode} from {}", event.source);

                Ok(())
            }
            Err(storage::Error::NotFound) => Err(Error::NotFound),
            Err(err) => Err(storage_unavailable("record_click", shortcode, &err)),
        }
    }

    /// Statistics of a single short link, including the complete click history
    pub async fn stats(&self, shortcode: &str) -> Result<StatsView> {
        let short_link = self.fetch(shortcode, "stats").await?;
        let is_expired = short_link.is_expired(self.clock.now());

        tracing::debug!("Stats retrieved for: {shortcode}");

        Ok(StatsView {
            short_url: self.short_url(&short_link.shortcode),
            shortcode: short_link.shortcode,
            long_url: short_link.long_url,
            created_at: short_link.created_at,
            expiry_time: short_link.expiry_time,
            clicks: short_link.clicks,
            click_logs: short_link.click_logs,
            is_expired,
        })
    }

    /// A single short link without its click history
    pub async fn single(&self, shortcode: &str) -> Result<ListView> {
        let short_link = self
            .storage
            .find_summary_by_shortcode(shortcode)
            .await
            .map_err(|err| storage_unavailable("single", shortcode, &err))?
            .ok_or_else(|| {
                tracing::debug!("Shortcode not found: {shortcode}");

                Error::NotFound
            })?;

        Ok(self.list_view(short_link, self.clock.now()))
    }

    /// List all short links, expired ones included
    pub async fn list(&self) -> Result<Vec<ListView>> {
        let short_links = self
            .storage
            .find_all()
            .await
            .map_err(|err| storage_unavailable("list", "*", &err))?;

        let now = self.clock.now();

        tracing::debug!("Retrieved {} short links", short_links.len());

        Ok(short_links
            .into_iter()
            .map(|short_link| self.list_view(short_link, now))
            .collect())
    }

    /// Physically remove short links that expired more than `grace` ago
    ///
    /// Expiry is always computed at read time, purging only reclaims space
    pub async fn purge_expired(&self, grace: TimeDelta) -> Result<u64> {
        let before = self.clock.now() - grace;

        let deleted = self
            .storage
            .delete_expired(before)
            .await
            .map_err(|err| storage_unavailable("purge", "*", &err))?;

        if deleted > 0 {
            tracing::info!("Purged {deleted} short links expired before {before}");
        }

        Ok(deleted)
    }

    /// Fetch a short link, absence is an error
    async fn fetch(&self, shortcode: &str, operation: &'static str) -> Result<ShortLink> {
        self.storage
            .find_by_shortcode(shortcode)
            .await
            .map_err(|err| storage_unavailable(operation, shortcode, &err))?
            .ok_or_else(|| {
                tracing::debug!("Shortcode not found: {shortcode}");

                Error::NotFound
            })
    }

    fn list_view(&self, short_link: ShortLink, now: DateTime<Utc>) -> ListView {
        ListView {
            short_url: self.short_url(&short_link.shortcode),
            is_expired: short_link.is_expired(now),
            shortcode: short_link.shortcode,
            long_url: short_link.long_url,
            created_at: short_link.created_at,
            expiry_time: short_link.expiry_time,
            clicks: short_link.clicks,
        }
    }

    /// Compose the short URL of a shortcode
    fn short_url(&self, shortcode: &str) -> String {
        format!("{}/{shortcode}", self.base_url)
    }
}

/// Parse and validate a long URL
///
/// Has to be absolute, with a host. The URL is stored as given, not in its normalized form.
fn parse_long_url(long_url: &str) -> Result<&str> {
    let long_url = long_url.trim();

    match Url::parse(long_url) {
        Ok(url) if url.has_host() => Ok(long_url),
        _ => {
            tracing::warn!("Invalid URL provided: {long_url}");

            Err(Error::InvalidUrl)
        }
    }
}

/// Log a storage failure with its context and hide it behind a generic error
fn storage_unavailable(operation: &str, shortcode: &str, err: &storage::Error) -> Error {
    tracing::error!("Storage failed during {operation} of {shortcode}: {err}");

    Error::StorageUnavailable
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::Memory;

    /// Generator handing out a fixed sequence of shortcodes, repeating the last one
    struct SequenceGenerator {
        shortcodes: Mutex<Vec<&'static str>>,
        calls: Mutex<u32>,
    }

    impl SequenceGenerator {
        fn new(mut shortcodes: Vec<&'static str>) -> Self {
            shortcodes.reverse();

            Self {
                shortcodes: Mutex::new(shortcodes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl Generator for SequenceGenerator {
        fn generate(&self) -> String {
            *self.calls.lock().unwrap() += 1;

            let mut shortcodes = self.shortcodes.lock().unwrap();
            if shortcodes.len() > 1 {
                shortcodes.pop().unwrap().to_string()
            } else {
                shortcodes[0].to_string()
            }
        }
    }

    /// Storage that is never reachable
    #[derive(Clone)]
    struct Unreachable;

    impl Storage for Unreachable {
        async fn insert(&self, _values: &CreateShortLinkValues<'_>) -> storage::Result<ShortLink> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn find_by_shortcode(&self, _shortcode: &str) -> storage::Result<Option<ShortLink>> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn find_summary_by_shortcode(
            &self,
            _shortcode: &str,
        ) -> storage::Result<Option<ShortLink>> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn record_click(&self, _shortcode: &str, _event: &ClickEvent) -> storage::Result<()> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn find_all(&self) -> storage::Result<Vec<ShortLink>> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn delete_expired(&self, _before: DateTime<Utc>) -> storage::Result<u64> {
            Err(storage::Error::Connection("refused".to_string()))
        }

        async fn close(&self) {}
    }

    fn settings() -> Settings {
        Settings {
            base_url: "https://sho.rt/".to_string(),
            ..Settings::default()
        }
    }

    fn service() -> (ShortLinkService<Memory>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = ShortLinkService::new(Memory::new(), &settings()).with_clock(clock.clone());

        (service, clock)
    }

    fn create_values(
        long_url: &str,
        shortcode: Option<&str>,
        expiry: Option<i64>,
    ) -> CreateShortLink {
        CreateShortLink {
            long_url: long_url.to_string(),
            shortcode: shortcode.map(ToString::to_string),
            expiry_minutes: expiry,
        }
    }

    #[tokio::test]
    async fn test_create_and_stats_round_trip() {
        let (service, _) = service();

        let summary = service
            .create(&create_values("https://example.com/x", None, None))
            .await
            .unwrap();
        assert_eq!(8, summary.shortcode.len());
        assert_eq!(format!("https://sho.rt/{}", summary.shortcode), summary.short_url);
        assert_eq!(0, summary.clicks);

        let stats = service.stats(&summary.shortcode).await.unwrap();
        assert_eq!("https://example.com/x", stats.long_url);
        assert_eq!(0, stats.clicks);
        assert!(stats.click_logs.is_empty());
        assert!(!stats.is_expired);
    }

    #[tokio::test]
    async fn test_default_expiry() {
        let (service, _) = service();

        let summary = service
            .create(&create_values("https://example.com/", None, None))
            .await
            .unwrap();

        assert_eq!(Duration::minutes(30), summary.expiry_time - summary.created_at);

        let summary = service
            .create(&create_values("https://example.com/", None, Some(90)))
            .await
            .unwrap();

        assert_eq!(Duration::minutes(90), summary.expiry_time - summary.created_at);
    }

    #[tokio::test]
    async fn test_validation() {
        let (service, _) = service();

        let result = service.create(&create_values("not-a-url", None, None)).await;
        assert_eq!(Some(Error::InvalidUrl), result.err());

        let result = service.create(&create_values("mailto:someone@example.com", None, None)).await;
        assert_eq!(Some(Error::InvalidUrl), result.err());

        let result = service.create(&create_values("https://x.com", None, Some(-5))).await;
        assert_eq!(Some(Error::InvalidExpiry), result.err());

        let result = service.create(&create_values("https://x.com", None, Some(0))).await;
        assert_eq!(Some(Error::InvalidExpiry), result.err());

        let result = service.create(&create_values("https://x.com", None, Some(i64::MAX))).await;
        assert_eq!(Some(Error::InvalidExpiry), result.err());

        let result = service.create(&create_values("https://x.com", Some("a?b"), None)).await;
        assert!(matches!(result, Err(Error::InvalidShortcode(_))));

        // nothing was stored along the way
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_shortcode_taken() {
        let (service, _) = service();

        service
            .create(&create_values("https://openai.com", Some("gpt"), None))
            .await
            .unwrap();

        let result = service
            .create(&create_values("https://example.com", Some("gpt"), None))
            .await;
        assert_eq!(Some(Error::ShortcodeTaken), result.err());

        // the original is untouched
        let resolved = service.resolve("gpt").await.unwrap();
        assert_eq!("https://openai.com", resolved.long_url);
    }

    #[tokio::test]
    async fn test_empty_custom_shortcode_is_generated() {
        let (service, _) = service();

        let summary = service
            .create(&create_values("https://example.com", Some(""), None))
            .await
            .unwrap();

        assert_eq!(8, summary.shortcode.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_custom_shortcode() {
        let (service, _) = service();

        let mut handles = Vec::new();
        for index in 0..32 {
            let service = service.clone();

            handles.push(tokio::spawn(async move {
                let long_url = format!("https://example.com/{index}");

                service
                    .create(&create_values(&long_url, Some("race"), None))
                    .await
            }));
        }

        let mut created = 0;
        let mut taken = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(Error::ShortcodeTaken) => taken += 1,
                Err(err) => panic!("Unexpected error: {err}"),
            }
        }

        assert_eq!(1, created);
        assert_eq!(31, taken);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clicks() {
        let (service, _) = service();

        service
            .create(&create_values("https://example.com", Some("busy"), None))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for index in 0..100 {
            let service = service.clone();

            handles.push(tokio::spawn(async move {
                let referrer = format!("https://referrer.example/{index}");

                service
                    .record_click("busy", Some(&referrer), Some("test-agent"))
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = service.stats("busy").await.unwrap();
        assert_eq!(100, stats.clicks);
        assert_eq!(100, stats.click_logs.len());
    }

    #[tokio::test]
    async fn test_expiry_without_mutation() {
        let (service, clock) = service();

        service
            .create(&create_values("https://example.com", Some("soon"), Some(1)))
            .await
            .unwrap();

        let resolved = service.resolve("soon").await.unwrap();
        assert_eq!("https://example.com", resolved.long_url);

        clock.advance(Duration::seconds(61));

        assert_eq!(Some(Error::Expired), service.resolve("soon").await.err());

        // still there for statistics
        let stats = service.stats("soon").await.unwrap();
        assert!(stats.is_expired);

        let list = service.list().await.unwrap();
        assert_eq!(1, list.len());
        assert!(list[0].is_expired);
    }

    #[tokio::test]
    async fn test_single_without_click_history() {
        let (service, clock) = service();

        service
            .create(&create_values("https://example.com", Some("one"), Some(1)))
            .await
            .unwrap();
        service.record_click("one", Some("https://ref.example.com/"), None).await.unwrap();

        let single = service.single("one").await.unwrap();
        assert_eq!("one", single.shortcode);
        assert_eq!("https://sho.rt/one", single.short_url);
        assert_eq!(1, single.clicks);
        assert!(!single.is_expired);

        clock.advance(Duration::minutes(2));

        assert!(service.single("one").await.unwrap().is_expired);
    }

    #[tokio::test]
    async fn test_record_click_on_expired_link() {
        let (service, clock) = service();

        service
            .create(&create_values("https://example.com", Some("old"), Some(1)))
            .await
            .unwrap();

        clock.advance(Duration::minutes(5));

        service.record_click("old", None, None).await.unwrap();

        let stats = service.stats("old").await.unwrap();
        assert_eq!(1, stats.clicks);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (service, clock) = service();

        service
            .create(&create_values("https://example.com", Some("short"), Some(1)))
            .await
            .unwrap();
        service
            .create(&create_values("https://example.com", Some("long"), Some(120)))
            .await
            .unwrap();

        clock.advance(Duration::minutes(10));

        // within the grace period nothing goes
        let deleted = service.purge_expired(Duration::minutes(30)).await.unwrap();
        assert_eq!(0, deleted);

        let deleted = service.purge_expired(Duration::minutes(5)).await.unwrap();
        assert_eq!(1, deleted);

        assert_eq!(Some(Error::NotFound), service.stats("short").await.err());
        assert!(service.stats("long").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_shortcode() {
        let (service, _) = service();

        assert_eq!(Some(Error::NotFound), service.resolve("nope").await.err());
        assert_eq!(Some(Error::NotFound), service.stats("nope").await.err());
        assert_eq!(Some(Error::NotFound), service.single("nope").await.err());
        assert_eq!(
            Some(Error::NotFound),
            service.record_click("nope", None, None).await.err()
        );
    }

    #[tokio::test]
    async fn test_generation_retries_on_collision() {
        let (service, _) = service();

        service
            .create(&create_values("https://example.com", Some("taken"), None))
            .await
            .unwrap();

        let generator = Arc::new(SequenceGenerator::new(vec!["taken", "taken", "free"]));
        let service = service.with_generator(generator.clone());

        let summary = service
            .create(&create_values("https://example.com/other", None, None))
            .await
            .unwrap();

        assert_eq!("free", summary.shortcode);
        assert_eq!(3, generator.calls());
    }

    #[tokio::test]
    async fn test_generation_exhausted() {
        let (service, _) = service();

        service
            .create(&create_values("https://example.com", Some("taken"), None))
            .await
            .unwrap();

        let generator = Arc::new(SequenceGenerator::new(vec!["taken"]));
        let service = service.with_generator(generator.clone());

        let result = service
            .create(&create_values("https://example.com/other", None, None))
            .await;

        assert_eq!(Some(Error::GenerationExhausted), result.err());
        assert_eq!(5, generator.calls());
    }

    #[tokio::test]
    async fn test_storage_unavailable() {
        let service = ShortLinkService::new(Unreachable, &settings());

        let result = service.create(&create_values("https://example.com", None, None)).await;
        assert_eq!(Some(Error::StorageUnavailable), result.err());

        let result = service.create(&create_values("https://example.com", Some("a"), None)).await;
        assert_eq!(Some(Error::StorageUnavailable), result.err());

        assert_eq!(Some(Error::StorageUnavailable), service.resolve("a").await.err());
        assert_eq!(Some(Error::StorageUnavailable), service.stats("a").await.err());
        assert_eq!(Some(Error::StorageUnavailable), service.single("a").await.err());
        assert_eq!(Some(Error::StorageUnavailable), service.list().await.err());
        assert_eq!(
            Some(Error::StorageUnavailable),
            service.record_click("a", None, None).await.err()
        );

        // validation comes before storage access
        let result = service.create(&create_values("not-a-url", None, None)).await;
        assert_eq!(Some(Error::InvalidUrl), result.err());
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (service, _) = service();

        let summary = service
            .create(&create_values("https://openai.com", Some("gpt"), None))
            .await
            .unwrap();
        assert_eq!("gpt", summary.shortcode);
        assert_eq!("https://sho.rt/gpt", summary.short_url);
        assert_eq!(0, summary.clicks);

        let resolved = service.resolve("gpt").await.unwrap();
        assert_eq!("https://openai.com", resolved.long_url);

        service.record_click("gpt", None, Some("curl/8.0")).await.unwrap();

        let stats = service.stats("gpt").await.unwrap();
        assert_eq!(1, stats.clicks);
        assert_eq!(1, stats.click_logs.len());
        assert_eq!("direct", stats.click_logs[0].source);
        assert_eq!("curl/8.0", stats.click_logs[0].user_agent);
    }
}
