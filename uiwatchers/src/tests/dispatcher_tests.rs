use super::init_tracing;
use crate::testing::{FakeNode, FakeScreen, FakeWindow, ScreenEvent};
use crate::{RemediationDispatcher, Selector, WatcherConfig};
use std::sync::Arc;
use std::time::Duration;

fn ok_button() -> Selector {
    Selector::text("OK").and(Selector::enabled(true))
}

fn dispatcher(screen: &Arc<FakeScreen>) -> RemediationDispatcher {
    RemediationDispatcher::new(screen.clone(), &WatcherConfig::default())
}

#[test]
fn test_post_handle_clicks_ok_button() {
    init_tracing();
    let screen = Arc::new(FakeScreen::new());
    screen.set_foreground_package(Some("com.example.app"));
    screen.show(FakeWindow::new("android").with_node(FakeNode::button("OK")));

    dispatcher(&screen).post_handle();

    assert_eq!(
        screen.events(),
        vec![
            ScreenEvent::ForegroundPackage,
            ScreenEvent::WaitForExists(ok_button(), Duration::from_millis(5000)),
            ScreenEvent::Click(ok_button()),
        ]
    );
    assert_eq!(screen.window_count(), 0);
}

#[test]
fn test_post_handle_waits_for_late_button() {
    let screen = Arc::new(FakeScreen::new());
    screen.show_on_wait(FakeWindow::new("android").with_node(FakeNode::button("OK")));

    dispatcher(&screen).post_handle();

    assert_eq!(screen.clicks(), vec![ok_button()]);
    assert_eq!(screen.window_count(), 0);
}

#[test]
fn test_post_handle_without_button_still_returns() {
    init_tracing();
    let screen = Arc::new(FakeScreen::new());

    dispatcher(&screen).post_handle();

    // the click is still attempted and its failure swallowed
    assert_eq!(screen.clicks(), vec![ok_button()]);
}

#[test]
fn test_post_handle_ignores_disabled_button() {
    let screen = Arc::new(FakeScreen::new());
    screen.show(FakeWindow::new("android").with_node(FakeNode::button("OK").disabled()));

    dispatcher(&screen).post_handle();

    assert_eq!(screen.window_count(), 1);
}

#[test]
fn test_post_handle_tolerates_missing_foreground_package() {
    let screen = Arc::new(FakeScreen::new());
    screen.set_foreground_package(None);
    screen.show(FakeWindow::new("android").with_node(FakeNode::button("OK")));

    dispatcher(&screen).post_handle();

    assert_eq!(screen.window_count(), 0);
}

#[test]
fn test_wait_is_bounded_even_when_configured_higher() {
    let screen = Arc::new(FakeScreen::new());
    let config = WatcherConfig {
        dismiss_timeout_ms: 120_000,
        ..Default::default()
    };
    RemediationDispatcher::new(screen.clone(), &config).post_handle();

    let timeouts = screen.wait_timeouts();
    assert_eq!(timeouts.len(), 1);
    assert!(timeouts[0] <= Duration::from_millis(5000));
}

#[test]
fn test_custom_button_text() {
    let screen = Arc::new(FakeScreen::new());
    screen.show(FakeWindow::new("android").with_node(FakeNode::button("Close app")));
    let config = WatcherConfig {
        dismiss_button_text: "Close app".to_string(),
        ..Default::default()
    };

    RemediationDispatcher::new(screen.clone(), &config).post_handle();

    assert_eq!(screen.window_count(), 0);
}

#[test]
fn test_click_swallows_vanished_element() {
    init_tracing();
    let screen = Arc::new(FakeScreen::new());
    screen.show(FakeWindow::new("android").with_node(FakeNode::button("OK").vanish_on_click()));

    let clicked = dispatcher(&screen).click(&Selector::text("OK"));

    assert!(!clicked);
    assert_eq!(screen.window_count(), 0);
}

#[test]
fn test_click_and_wait_for_new_window() {
    let screen = Arc::new(FakeScreen::new());
    let button1 = Selector::resource_id("android:id/button1");
    screen.show(
        FakeWindow::new("com.vivo.launcher").with_node(
            FakeNode::button("Allow").with_resource_id("android:id/button1"),
        ),
    );
    let dispatcher = dispatcher(&screen);

    assert!(dispatcher.click_and_wait_for_new_window(&button1));
    assert!(!dispatcher.click_and_wait_for_new_window(&button1));
    assert_eq!(
        screen.clicks(),
        vec![button1.clone(), button1]
    );
}
