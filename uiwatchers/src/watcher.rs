//! Watchers: named condition/action pairs the host runs while it waits.

use crate::dispatcher::RemediationDispatcher;
use crate::error_log::{ErrorLog, IncidentKind};
use crate::screen::ScreenQuery;
use crate::selector::Selector;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Behaviour invoked by the host's polling loop.
///
/// Returns `true` when the watcher matched and handled something.
pub trait UiWatcher: Send + Sync {
    fn check_for_condition(&self) -> bool;
}

impl<F> UiWatcher for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn check_for_condition(&self) -> bool {
        self()
    }
}

/// The interstitial patterns this crate knows how to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatcherKind {
    /// Browser certificate warning, accepted with "Continue"
    SslCertError,
    /// Vendor launcher/system dialog with a generic primary button
    VendorLaunchDialog,
    /// "App not responding" dialog matched by class
    Anr,
    /// "App not responding" dialog matched by text
    AnrFallback,
    /// "App has stopped" dialog matched by class
    Crash,
    /// "App has stopped" dialog matched by text
    CrashFallback,
}

impl WatcherKind {
    /// Registration order used by `register_anr_and_crash_watchers`.
    pub const ANR_AND_CRASH: [WatcherKind; 5] = [
        WatcherKind::Anr,
        WatcherKind::AnrFallback,
        WatcherKind::Crash,
        WatcherKind::CrashFallback,
        WatcherKind::VendorLaunchDialog,
    ];

    /// Name the watcher is registered under in the host's table.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SslCertError => "SSLCERTERROR",
            Self::VendorLaunchDialog => "vivolaunch",
            Self::Anr => "ANR",
            Self::AnrFallback => "ANR2",
            Self::Crash => "CRASH",
            Self::CrashFallback => "CRASH2",
        }
    }

    pub fn selector(&self) -> Selector {
        match self {
            Self::SslCertError => Selector::class_name("android.widget.Button")
                .and(Selector::package_name("com.android.browser"))
                .and(Selector::text("Continue")),
            Self::VendorLaunchDialog => Selector::resource_id("android:id/button1"),
            Self::Anr => Selector::class_name("com.android.server.am.AppNotRespondingDialog"),
            // class names drift across platform versions, the text does not
            Self::AnrFallback => Selector::package_name("android")
                .and(Selector::text_contains("isn't responding.")),
            Self::Crash => Selector::class_name("com.android.server.am.AppErrorDialog"),
            Self::CrashFallback => {
                Selector::package_name("android").and(Selector::text_contains("has stopped"))
            }
        }
    }

    /// The incident a match is recorded as, or `None` for watchers that
    /// only dismiss.
    pub fn incident(&self) -> Option<IncidentKind> {
        match self {
            Self::Anr | Self::AnrFallback => Some(IncidentKind::Anr),
            Self::Crash | Self::CrashFallback => Some(IncidentKind::Crash),
            Self::SslCertError | Self::VendorLaunchDialog => None,
        }
    }
}

impl fmt::Display for WatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A [`UiWatcher`] for one [`WatcherKind`].
///
/// Holds no state of its own between invocations; every call re-queries the
/// screen.
#[derive(Clone)]
pub struct DialogWatcher {
    kind: WatcherKind,
    selector: Selector,
    screen: Arc<dyn ScreenQuery>,
    errors: ErrorLog,
    dispatcher: RemediationDispatcher,
}

impl DialogWatcher {
    pub fn new(
        kind: WatcherKind,
        screen: Arc<dyn ScreenQuery>,
        errors: ErrorLog,
        dispatcher: RemediationDispatcher,
    ) -> Self {
        Self {
            kind,
            selector: kind.selector(),
            screen,
            errors,
            dispatcher,
        }
    }

    pub fn kind(&self) -> WatcherKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Best-effort read of the matched dialog's text.
    fn read_dialog_text(&self) -> Option<String> {
        match self.screen.get_text(&self.selector) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("dialog gone? {}: {}", self.name(), e);
                None
            }
        }
    }
}

impl UiWatcher for DialogWatcher {
    fn check_for_condition(&self) -> bool {
        if !self.screen.exists(&self.selector) {
            return false;
        }

        warn!(watcher = self.name(), "Watcher condition matched");

        match self.kind.incident() {
            Some(incident) => {
                let text = self.read_dialog_text();
                self.errors.record_incident(incident, text);
                self.dispatcher.post_handle();
            }
            None if self.kind == WatcherKind::VendorLaunchDialog => {
                self.dispatcher.click_and_wait_for_new_window(&self.selector);
            }
            None => {
                self.dispatcher.click(&self.selector);
            }
        }

        debug!(watcher = self.name(), "Watcher triggered");
        true
    }
}

impl fmt::Debug for DialogWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogWatcher")
            .field("kind", &self.kind)
            .field("selector", &self.selector)
            .finish()
    }
}
