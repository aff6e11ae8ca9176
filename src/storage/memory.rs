//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::short_links::ClickEvent;
use crate::short_links::ShortLink;

use super::CreateShortLinkValues;
use super::Error;
use super::Result;
use super::Storage;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All short links in storage, by shortcode
    short_links: Arc<Mutex<HashMap<String, ShortLink>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for Memory {
    async fn insert(&self, values: &CreateShortLinkValues<'_>) -> Result<ShortLink> {
        let mut short_links = self.short_links.lock().await;

        match short_links.entry(values.shortcode.to_string()) {
            Entry::Occupied(_) => Err(Error::Conflict),
            Entry::Vacant(entry) => {
                let short_link = ShortLink::new(
                    values.shortcode.to_string(),
                    values.long_url.to_string(),
                    values.created_at,
                    values.expiry_time,
                );

                Ok(entry.insert(short_link).clone())
            }
        }
    }

    async fn find_by_shortcode(&self, shortcode: &str) -> Result<Option<ShortLink>> {
        Ok(self.short_links.lock().await.get(shortcode).cloned())
    }

    async fn find_summary_by_shortcode(&self, shortcode: &str) -> Result<Option<ShortLink>> {
        Ok(self
            .short_links
            .lock()
            .await
            .get(shortcode)
            .map(without_click_logs))
    }

    async fn record_click(&self, shortcode: &str, event: &ClickEvent) -> Result<()> {
        let mut short_links = self.short_links.lock().await;

        let short_link = short_links.get_mut(shortcode).ok_or(Error::NotFound)?;

        short_link.clicks += 1;
        short_link.click_logs.push(event.clone());

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        let mut short_links = self
            .short_links
            .lock()
            .await
            .values()
            .map(without_click_logs)
            .collect::<Vec<ShortLink>>();

        short_links.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(short_links)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let mut short_links = self.short_links.lock().await;

        let count_before = short_links.len();
        short_links.retain(|_, short_link| short_link.expiry_time >= before);

        Ok((count_before - short_links.len()) as u64)
    }

    async fn close(&self) {}
}

/// Copy of a short link, leaving the click history behind
fn without_click_logs(short_link: &ShortLink) -> ShortLink {
    ShortLink {
        shortcode: short_link.shortcode.clone(),
        long_url: short_link.long_url.clone(),
        created_at: short_link.created_at,
        expiry_time: short_link.expiry_time,
        clicks: short_link.clicks,
        click_logs: Vec::new(),
    }
}
