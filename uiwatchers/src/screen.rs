//! The screen-query capability watchers are written against.

use crate::errors::AutomationError;
use crate::selector::Selector;
use std::time::Duration;

/// The narrow surface of the screen-query engine the watchers need.
///
/// Implementations resolve a [`Selector`] against the current UI tree on
/// every call. Any action may fail with [`AutomationError::ElementNotFound`]
/// when the control vanished between being observed and being acted on.
pub trait ScreenQuery: Send + Sync {
    /// Whether an element matching `selector` is currently on screen.
    fn exists(&self, selector: &Selector) -> bool;

    /// Text of the first element matching `selector`.
    fn get_text(&self, selector: &Selector) -> Result<String, AutomationError>;

    /// Click the first element matching `selector`.
    fn click(&self, selector: &Selector) -> Result<(), AutomationError>;

    /// Click and block until a window transition settles. Returns whether a
    /// new window actually appeared.
    fn click_and_wait_for_new_window(&self, selector: &Selector)
        -> Result<bool, AutomationError>;

    /// Wait up to `timeout` for a matching element to appear.
    fn wait_for_exists(&self, selector: &Selector, timeout: Duration) -> bool;

    /// Package name of the application currently in the foreground.
    fn current_foreground_package(&self) -> Result<String, AutomationError>;
}
