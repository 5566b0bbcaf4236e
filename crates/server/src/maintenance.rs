//! Periodic expiry of cached pages.

use std::time::Duration;

use pagecache_core::{PageStore, PaginateCache};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Run `cleanup` every `every`, starting one period from now.
///
/// Failures are logged and the loop keeps going; the next tick retries.
pub fn spawn_cleanup<S>(cache: PaginateCache<S>, every: Duration) -> JoinHandle<()>
where
    S: PageStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = cache.cleanup().await {
                tracing::warn!("page cache cleanup failed: {}", e);
            }
        }
    })
}
