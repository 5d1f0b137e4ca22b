use crate::config::WatcherConfig;
use crate::dispatcher::RemediationDispatcher;
use crate::error_log::{ErrorLog, ErrorLogReader, IncidentKind};
use crate::registry::WatcherRegistry;
use crate::screen::ScreenQuery;
use crate::watcher::{DialogWatcher, WatcherKind};
use std::sync::Arc;
use tracing::{info, instrument};

/// Installs the built-in watchers into a host and collects what they detect.
///
/// The engine never drives polling itself. It writes watchers into the
/// injected [`WatcherRegistry`] and owns the [`ErrorLog`] they append to.
pub struct WatcherEngine {
    screen: Arc<dyn ScreenQuery>,
    registry: Arc<dyn WatcherRegistry>,
    errors: ErrorLog,
    dispatcher: RemediationDispatcher,
    config: WatcherConfig,
}

impl WatcherEngine {
    pub fn new(screen: Arc<dyn ScreenQuery>, registry: Arc<dyn WatcherRegistry>) -> Self {
        Self::with_config(screen, registry, WatcherConfig::default())
    }

    pub fn with_config(
        screen: Arc<dyn ScreenQuery>,
        registry: Arc<dyn WatcherRegistry>,
        config: WatcherConfig,
    ) -> Self {
        let config = config.normalized();
        let dispatcher = RemediationDispatcher::new(screen.clone(), &config);
        Self {
            screen,
            registry,
            errors: ErrorLog::new(),
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Build the watcher for `kind`, wired to this engine's log and dispatcher.
    pub fn watcher(&self, kind: WatcherKind) -> DialogWatcher {
        DialogWatcher::new(
            kind,
            self.screen.clone(),
            self.errors.clone(),
            self.dispatcher.clone(),
        )
    }

    fn install(&self, kind: WatcherKind) {
        self.registry
            .register_watcher(kind.name(), Box::new(self.watcher(kind)));
    }

    /// Install the ANR, crash and vendor launcher watchers. Calling this
    /// twice registers them twice; deduplication is the host's call.
    #[instrument(skip(self))]
    pub fn register_anr_and_crash_watchers(&self) {
        for kind in WatcherKind::ANR_AND_CRASH {
            self.install(kind);
        }
        info!("Registered GUI Exception watchers");
    }

    #[instrument(skip(self))]
    pub fn register_accept_ssl_cert_watcher(&self) {
        self.install(WatcherKind::SslCertError);
        info!("Registered SSL Certificate Error Watchers");
    }

    /// Diagnostics recorded so far, oldest first.
    pub fn get_errors(&self) -> Vec<String> {
        self.errors.snapshot()
    }

    pub fn reset(&self) {
        self.errors.reset();
    }

    /// Read-only handle to the log, for test code on other threads.
    pub fn error_log(&self) -> ErrorLogReader {
        self.errors.reader()
    }

    pub fn on_anr_detected(&self, error_text: impl Into<String>) {
        self.errors
            .record_incident(IncidentKind::Anr, Some(error_text.into()));
    }

    pub fn on_crash_detected(&self, error_text: impl Into<String>) {
        self.errors
            .record_incident(IncidentKind::Crash, Some(error_text.into()));
    }

    /// Run the generic ANR/crash post-handler now.
    pub fn post_handler(&self) {
        self.dispatcher.post_handle();
    }
}
