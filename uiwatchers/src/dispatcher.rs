//! Best-effort dismissal of interstitial dialogs.
//!
//! Nothing in here returns an error: a control that vanished before it could
//! be clicked is logged and forgotten, and the outer wait keeps polling.

use crate::config::WatcherConfig;
use crate::screen::ScreenQuery;
use crate::selector::Selector;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Clone)]
pub struct RemediationDispatcher {
    screen: Arc<dyn ScreenQuery>,
    dismiss_button: Selector,
    dismiss_timeout: Duration,
}

impl RemediationDispatcher {
    pub fn new(screen: Arc<dyn ScreenQuery>, config: &WatcherConfig) -> Self {
        Self {
            screen,
            dismiss_button: Selector::text(config.dismiss_button_text.clone())
                .and(Selector::enabled(true)),
            dismiss_timeout: config.dismiss_timeout(),
        }
    }

    /// Selector of the generic dismissal button.
    pub fn dismiss_button(&self) -> &Selector {
        &self.dismiss_button
    }

    pub fn dismiss_timeout(&self) -> Duration {
        self.dismiss_timeout
    }

    /// Generic handler run after every ANR or crash match.
    ///
    /// Logs the foreground package, waits up to the dismiss timeout for an
    /// enabled OK button and clicks it.
    pub fn post_handle(&self) {
        match self.screen.current_foreground_package() {
            Ok(package) => error!("UI Exception Message: {:<20}", package),
            Err(e) => error!("UI Exception Message: <unknown package> ({})", e),
        }

        // the button can take a while to become enabled
        if !self
            .screen
            .wait_for_exists(&self.dismiss_button, self.dismiss_timeout)
        {
            debug!(
                "Dismiss button {} did not appear within {:?}",
                self.dismiss_button, self.dismiss_timeout
            );
        }

        self.click(&self.dismiss_button);
    }

    /// Click `selector`, swallowing any failure. Returns whether the click
    /// went through.
    pub fn click(&self, selector: &Selector) -> bool {
        match self.screen.click(selector) {
            Ok(()) => true,
            Err(e) if e.is_element_not_found() => {
                error!("dialog gone? {}: {}", selector, e);
                false
            }
            Err(e) => {
                error!("Exception clicking {}: {}", selector, e);
                false
            }
        }
    }

    /// Click `selector` and wait for the resulting window transition,
    /// swallowing any failure. Returns whether the click went through.
    pub fn click_and_wait_for_new_window(&self, selector: &Selector) -> bool {
        match self.screen.click_and_wait_for_new_window(selector) {
            Ok(new_window) => {
                debug!("Clicked {}, new window: {}", selector, new_window);
                true
            }
            Err(e) if e.is_element_not_found() => {
                error!("dialog gone? {}: {}", selector, e);
                false
            }
            Err(e) => {
                error!("Exception clicking {}: {}", selector, e);
                false
            }
        }
    }
}
