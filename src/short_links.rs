//! Short links
//!
//! The single persisted entity: a shortcode bound to a long URL, with its click history

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// Referrer recorded when the client did not send one
pub const DIRECT_SOURCE: &str = "direct";

/// User agent recorded when the client did not send one
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Short link as stored
#[derive(Clone, Debug)]
pub struct ShortLink {
    /// Unique external identifier
    pub shortcode: String,

    /// Location the shortcode redirects to
    pub long_url: String,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Moment after which the shortcode no longer redirects
    pub expiry_time: DateTime<Utc>,

    /// Number of recorded clicks, always equal to `click_logs.len()`
    pub clicks: u64,

    /// Recorded clicks, oldest first
    pub click_logs: Vec<ClickEvent>,
}

impl ShortLink {
    /// Create a fresh link without any clicks
    pub fn new(
        shortcode: String,
        long_url: String,
        created_at: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            shortcode,
            long_url,
            created_at,
            expiry_time,
            clicks: 0,
            click_logs: Vec::new(),
        }
    }

    /// Is the link expired at the given moment?
    ///
    /// Expiry is never stored, it is always derived from `expiry_time`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_time
    }
}

/// A single resolution of a shortcode
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    /// Time of the redirect
    pub timestamp: DateTime<Utc>,

    /// Referrer of the click, `direct` when absent
    pub source: String,

    /// User agent of the client, `Unknown` when absent
    pub user_agent: String,
}

impl ClickEvent {
    /// Create a click event, falling back to the defaults for missing metadata
    pub fn new(timestamp: DateTime<Utc>, source: Option<&str>, user_agent: Option<&str>) -> Self {
        Self {
            timestamp,
            source: non_empty_or(source, DIRECT_SOURCE),
            user_agent: non_empty_or(user_agent, UNKNOWN_USER_AGENT),
        }
    }
}

fn non_empty_or(value: Option<&str>, default: &str) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}
