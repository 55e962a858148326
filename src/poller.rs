//! Status Poller.
//!
//! A background task that calls [`RemoteService::status`] once per period
//! and hands every result to a publish callback. The first call happens one
//! full period after start. Each call is awaited before the next tick is
//! taken, so at most one status request is ever outstanding; ticks missed
//! while a slow call was running are skipped, not replayed.
//!
//! The task stops when its [`PollerHandle`] is stopped or dropped, or when
//! the publish callback reports that nobody is listening anymore.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::client::RemoteService;
use crate::error::Result;
use crate::models::StatusSnapshot;

/// Period used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the polling task. Dropping the handle cancels it.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start polling. `publish` returns `false` to end the loop.
pub fn spawn_poller<F>(service: Arc<dyn RemoteService>, period: Duration, mut publish: F) -> PollerHandle
where
    F: FnMut(Result<StatusSnapshot>) -> bool + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            debug!("polling service status");
            let result = service.status().await;
            if !publish(result) {
                debug!("status listener gone, poller exiting");
                break;
            }
        }
    });
    PollerHandle { task }
}
