use std::sync::Arc;
use std::time::Duration;
use uiwatchers::testing::{FakeNode, FakeScreen, FakeWindow};
use uiwatchers::{Selector, WatcherConfig, WatcherEngine, WatcherTable};

fn fast_config() -> WatcherConfig {
    WatcherConfig {
        poll_interval_ms: 10,
        ..Default::default()
    }
}

fn login_screen() -> Arc<FakeScreen> {
    let screen = Arc::new(FakeScreen::new());
    screen.show(FakeWindow::new("com.example.app").with_node(FakeNode::button("Login")));
    screen
}

#[tokio::test]
async fn wait_succeeds_once_crash_dialog_is_cleared() -> anyhow::Result<()> {
    let screen = login_screen();
    screen.show(
        FakeWindow::new("android").modal().with_node(
            FakeNode::new("com.android.server.am.AppErrorDialog")
                .with_text("Example has stopped")
                .with_child(FakeNode::button("OK")),
        ),
    );

    let config = fast_config();
    let table = Arc::new(WatcherTable::from_config(&config));
    let engine = WatcherEngine::with_config(screen.clone(), table.clone(), config);
    engine.register_anr_and_crash_watchers();

    let found = table
        .clone()
        .wait_for_exists_async(screen.clone(), Selector::text("Login"), Duration::from_secs(2))
        .await?;

    assert!(found);
    assert!(table.has_watcher_triggered("CRASH"));
    assert_eq!(engine.get_errors(), vec!["Example has stopped".to_string()]);
    Ok(())
}

#[tokio::test]
async fn wait_succeeds_after_certificate_warning() -> anyhow::Result<()> {
    let screen = login_screen();
    screen.show(
        FakeWindow::new("com.android.browser")
            .modal()
            .with_node(FakeNode::button("Continue")),
    );

    let config = fast_config();
    let table = Arc::new(WatcherTable::from_config(&config));
    let engine = WatcherEngine::with_config(screen.clone(), table.clone(), config);
    engine.register_accept_ssl_cert_watcher();

    let found = table
        .clone()
        .wait_for_exists_async(screen.clone(), Selector::text("Login"), Duration::from_secs(2))
        .await?;

    assert!(found);
    assert!(engine.get_errors().is_empty());
    Ok(())
}

#[tokio::test]
async fn wait_times_out_behind_an_undismissable_dialog() -> anyhow::Result<()> {
    let screen = login_screen();
    screen.show(
        FakeWindow::new("android").modal().with_node(
            FakeNode::new("com.android.server.am.AppErrorDialog").with_text("Example has stopped"),
        ),
    );

    let config = fast_config();
    let table = Arc::new(WatcherTable::from_config(&config));
    let engine = WatcherEngine::with_config(screen.clone(), table.clone(), config);
    engine.register_anr_and_crash_watchers();

    let found = table
        .clone()
        .wait_for_exists_async(
            screen.clone(),
            Selector::text("Login"),
            Duration::from_millis(100),
        )
        .await?;

    assert!(!found);
    // recorded once per tick by CRASH and CRASH2
    let errors = engine.get_errors();
    assert!(errors.len() >= 2);
    assert!(errors.iter().all(|e| e == "Example has stopped"));
    Ok(())
}
