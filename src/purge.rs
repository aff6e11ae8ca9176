//! Background purge of expired short links
//!
//! Best effort only: expiry is computed at read time, so a late or skipped purge never changes
//! what a request sees, apart from statistics of long expired links disappearing

use std::time::Duration;

use chrono::TimeDelta;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::service::ShortLinkService;
use crate::storage::Storage;

/// Spawn the purge loop, it stops when the token is cancelled
pub fn spawn<S: Storage>(
    service: ShortLinkService<S>,
    every: Duration,
    grace_minutes: u32,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let grace = TimeDelta::minutes(i64::from(grace_minutes));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Purging short links expired for more than {grace_minutes} minutes every {}s",
            every.as_secs()
        );

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(err) = service.purge_expired(grace).await {
                        tracing::debug!("Purge failed, retrying next tick: {err}");
                    }
                }
            }
        }

        tracing::debug!("Purge stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Settings;
    use crate::service::CreateShortLink;
    use crate::storage::Memory;

    #[tokio::test]
    async fn test_purge_loop() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service =
            ShortLinkService::new(Memory::new(), &Settings::default()).with_clock(clock.clone());

        let values = CreateShortLink {
            long_url: "https://www.example.com/".to_string(),
            shortcode: Some("gone".to_string()),
            expiry_minutes: Some(1),
        };
        service.create(&values).await.unwrap();

        clock.advance(TimeDelta::minutes(10));

        let shutdown = CancellationToken::new();
        let handle = spawn(
            service.clone(),
            Duration::from_millis(10),
            5,
            shutdown.clone(),
        );

        // the first tick fires immediately
        for _ in 0..100 {
            if service.stats("gone").await.is_err() {
                break;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(service.list().await.unwrap().is_empty());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
