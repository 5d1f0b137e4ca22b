//! The host's watcher table and the port the engine registers through.

use crate::config::WatcherConfig;
use crate::errors::AutomationError;
use crate::screen::ScreenQuery;
use crate::selector::Selector;
use crate::watcher::UiWatcher;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument, trace};

/// Where watchers get installed. Implemented by the host device that owns
/// the polling loop.
pub trait WatcherRegistry: Send + Sync {
    /// Install `watcher` under `name`. What happens on a duplicate name is up
    /// to the host.
    fn register_watcher(&self, name: &str, watcher: Box<dyn UiWatcher>);
}

type Entry = (String, Arc<dyn UiWatcher>);

/// Reference host: an ordered watcher table plus the wait loop that runs it.
///
/// Watchers run in registration order. Registering a name that already
/// exists replaces the old watcher but keeps its position.
pub struct WatcherTable {
    watchers: Mutex<Vec<Entry>>,
    triggered: Mutex<Vec<String>>,
    /// Threads currently inside `run_watchers`.
    running_on: Mutex<Vec<ThreadId>>,
    poll_interval: Duration,
}

impl WatcherTable {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            watchers: Mutex::new(Vec::new()),
            triggered: Mutex::new(Vec::new()),
            running_on: Mutex::new(Vec::new()),
            poll_interval,
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.poll_interval())
    }

    pub fn remove_watcher(&self, name: &str) -> bool {
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = watchers.len();
        watchers.retain(|(n, _)| n != name);
        watchers.len() != before
    }

    pub fn watcher_names(&self) -> Vec<String> {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every registered watcher once, in order. Returns true if any of
    /// them triggered.
    ///
    /// A watcher that itself waits would re-enter this on the same thread;
    /// that nested call is a no-op returning false. Other threads waiting on
    /// the same table still run the watchers.
    pub fn run_watchers(&self) -> bool {
        let Some(_guard) = WatcherContextGuard::enter(&self.running_on) else {
            debug!("Already running watchers on this thread, skipping nested run");
            return false;
        };

        // snapshot so watchers may touch the table without deadlocking
        let watchers: Vec<Entry> = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut any_triggered = false;
        for (name, watcher) in &watchers {
            trace!(watcher = %name, "Checking watcher");
            if watcher.check_for_condition() {
                debug!(watcher = %name, "Watcher triggered");
                self.set_watcher_triggered(name);
                any_triggered = true;
            }
        }
        any_triggered
    }

    fn set_watcher_triggered(&self, name: &str) {
        let mut triggered = self.triggered.lock().unwrap_or_else(PoisonError::into_inner);
        if !triggered.iter().any(|n| n == name) {
            triggered.push(name.to_string());
        }
    }

    pub fn has_watcher_triggered(&self, name: &str) -> bool {
        self.triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|n| n == name)
    }

    pub fn has_any_watcher_triggered(&self) -> bool {
        !self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn reset_watcher_triggers(&self) {
        self.triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Wait for `selector` to appear, running the watchers on every tick
    /// where it is absent. The target gets one last check at the deadline.
    #[instrument(level = "debug", skip(self, screen))]
    pub fn wait_for_exists(
        &self,
        screen: &dyn ScreenQuery,
        selector: &Selector,
        timeout: Duration,
    ) -> bool {
        let start = Instant::now();
        loop {
            if screen.exists(selector) {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!("Timed out after {:?} waiting for {}", timeout, selector);
                return false;
            }
            self.run_watchers();
            let remaining = timeout.saturating_sub(start.elapsed());
            thread::sleep(self.poll_interval.min(remaining));
        }
    }

    /// [`wait_for_exists`](Self::wait_for_exists) on tokio's blocking pool.
    pub async fn wait_for_exists_async(
        self: Arc<Self>,
        screen: Arc<dyn ScreenQuery>,
        selector: Selector,
        timeout: Duration,
    ) -> Result<bool, AutomationError> {
        task::spawn_blocking(move || self.wait_for_exists(screen.as_ref(), &selector, timeout))
            .await
            .map_err(|e| AutomationError::PlatformError(format!("Task join error: {e}")))
    }
}

impl Default for WatcherTable {
    fn default() -> Self {
        Self::from_config(&WatcherConfig::default())
    }
}

impl WatcherRegistry for WatcherTable {
    fn register_watcher(&self, name: &str, watcher: Box<dyn UiWatcher>) {
        let watcher: Arc<dyn UiWatcher> = Arc::from(watcher);
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = watchers.iter_mut().find(|(n, _)| n == name) {
            debug!(watcher = %name, "Replacing registered watcher");
            slot.1 = watcher;
        } else {
            watchers.push((name.to_string(), watcher));
        }
    }
}

struct WatcherContextGuard<'a> {
    running_on: &'a Mutex<Vec<ThreadId>>,
    thread: ThreadId,
}

impl<'a> WatcherContextGuard<'a> {
    /// `None` if the current thread is already running watchers.
    fn enter(running_on: &'a Mutex<Vec<ThreadId>>) -> Option<Self> {
        let thread = thread::current().id();
        let mut threads = running_on.lock().unwrap_or_else(PoisonError::into_inner);
        if threads.contains(&thread) {
            return None;
        }
        threads.push(thread);
        Some(Self { running_on, thread })
    }
}

impl Drop for WatcherContextGuard<'_> {
    fn drop(&mut self) {
        self.running_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|t| *t != self.thread);
    }
}
