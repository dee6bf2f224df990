use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Default quiet period before a query is sent to the geocoder.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs at most one delayed task at a time.
///
/// Arming always aborts the previous task first, whether it is still waiting
/// out its delay or already running. Dropping the debouncer aborts too, so a
/// torn-down session never sees a late effect.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task` to start once the delay elapses without another `arm`.
    pub fn arm<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending task. Returns `true` if one was still live.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
