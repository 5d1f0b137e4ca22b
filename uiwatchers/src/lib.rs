//! Watchers that keep UI tests moving past unexpected dialogs
//!
//! While a test waits for an element, the host's polling loop runs every
//! registered watcher. The watchers in this crate look for crash,
//! app-not-responding, certificate-warning and vendor launcher dialogs,
//! record what they saw and click the dialog away so the wait can finish on
//! its own merits.
//!
//! ```
//! use std::sync::Arc;
//! use uiwatchers::testing::{FakeNode, FakeScreen, FakeWindow};
//! use uiwatchers::{WatcherEngine, WatcherTable};
//!
//! let screen = Arc::new(FakeScreen::new());
//! let table = Arc::new(WatcherTable::default());
//! let engine = WatcherEngine::new(screen.clone(), table.clone());
//! engine.register_anr_and_crash_watchers();
//!
//! screen.show(
//!     FakeWindow::new("android").modal().with_node(
//!         FakeNode::new("com.android.server.am.AppErrorDialog")
//!             .with_text("Calculator has stopped")
//!             .with_child(FakeNode::button("OK")),
//!     ),
//! );
//!
//! assert!(table.run_watchers());
//! assert_eq!(engine.get_errors(), vec!["Calculator has stopped".to_string()]);
//! ```

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error_log;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod screen;
pub mod selector;
pub mod testing;
#[cfg(test)]
mod tests;
pub mod watcher;

pub use config::WatcherConfig;
pub use dispatcher::RemediationDispatcher;
pub use engine::WatcherEngine;
pub use error_log::{ErrorLog, ErrorLogReader, IncidentKind, UNAVAILABLE_TEXT};
pub use errors::AutomationError;
pub use registry::{WatcherRegistry, WatcherTable};
pub use screen::ScreenQuery;
pub use selector::Selector;
pub use watcher::{DialogWatcher, UiWatcher, WatcherKind};
