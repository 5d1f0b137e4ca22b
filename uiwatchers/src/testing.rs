//! In-memory [`ScreenQuery`] for exercising watchers without a device.
//!
//! The screen is a stack of windows, topmost last. A modal window hides every
//! window below it. Nodes can be scripted to vanish when their text is read
//! or when they are clicked, which reproduces the race between observing a
//! dialog and acting on it.

use crate::errors::AutomationError;
use crate::screen::ScreenQuery;
use crate::selector::Selector;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Calls observed by a [`FakeScreen`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Exists(Selector),
    GetText(Selector),
    Click(Selector),
    ClickAndWaitForNewWindow(Selector),
    WaitForExists(Selector, Duration),
    ForegroundPackage,
}

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub class_name: String,
    pub text: String,
    pub resource_id: Option<String>,
    pub enabled: bool,
    pub children: Vec<FakeNode>,
    /// Reading the text fails and the whole window disappears.
    pub vanish_on_text_read: bool,
    /// Clicking fails and the whole window disappears.
    pub vanish_on_click: bool,
    /// A successful click closes the window.
    pub closes_window: bool,
}

impl FakeNode {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// An enabled `android.widget.Button` labelled `text` that closes its window.
    pub fn button(text: impl Into<String>) -> Self {
        Self::new("android.widget.Button")
            .with_text(text)
            .closes_window()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn vanish_on_text_read(mut self) -> Self {
        self.vanish_on_text_read = true;
        self
    }

    pub fn vanish_on_click(mut self) -> Self {
        self.vanish_on_click = true;
        self
    }

    pub fn closes_window(mut self) -> Self {
        self.closes_window = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub package: String,
    pub modal: bool,
    pub nodes: Vec<FakeNode>,
}

impl FakeWindow {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            modal: false,
            nodes: Vec::new(),
        }
    }

    /// Hides every window underneath while shown.
    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn with_node(mut self, node: FakeNode) -> Self {
        self.nodes.push(node);
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    windows: Vec<FakeWindow>,
    deferred: Vec<FakeWindow>,
    foreground_package: Option<String>,
}

#[derive(Debug)]
pub struct FakeScreen {
    state: Mutex<FakeState>,
    events: Mutex<Vec<ScreenEvent>>,
}

impl Default for FakeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeScreen {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                foreground_package: Some("com.android.launcher3".to_string()),
                ..Default::default()
            }),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Push a window on top of the stack.
    pub fn show(&self, window: FakeWindow) {
        self.lock_state().windows.push(window);
    }

    /// Keep `window` hidden until the next `wait_for_exists` call.
    pub fn show_on_wait(&self, window: FakeWindow) {
        self.lock_state().deferred.push(window);
    }

    /// `None` makes `current_foreground_package` fail.
    pub fn set_foreground_package(&self, package: Option<&str>) {
        self.lock_state().foreground_package = package.map(str::to_string);
    }

    pub fn window_count(&self) -> usize {
        self.lock_state().windows.len()
    }

    pub fn events(&self) -> Vec<ScreenEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_events(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Selectors of every click attempted, with or without window wait.
    pub fn clicks(&self) -> Vec<Selector> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScreenEvent::Click(s) | ScreenEvent::ClickAndWaitForNewWindow(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn wait_timeouts(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScreenEvent::WaitForExists(_, timeout) => Some(timeout),
                _ => None,
            })
            .collect()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_event(&self, event: ScreenEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Click shared by both click flavours. Returns whether the window closed.
    fn click_node(&self, selector: &Selector) -> Result<bool, AutomationError> {
        let mut state = self.lock_state();
        let (window, node) = locate(&state.windows, selector)
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))?;
        if node.vanish_on_click {
            state.windows.remove(window);
            return Err(AutomationError::ElementNotFound(format!(
                "{selector} vanished before click"
            )));
        }
        if node.closes_window {
            state.windows.remove(window);
            return Ok(true);
        }
        Ok(false)
    }
}

impl ScreenQuery for FakeScreen {
    fn exists(&self, selector: &Selector) -> bool {
        self.push_event(ScreenEvent::Exists(selector.clone()));
        locate(&self.lock_state().windows, selector).is_some()
    }

    fn get_text(&self, selector: &Selector) -> Result<String, AutomationError> {
        self.push_event(ScreenEvent::GetText(selector.clone()));
        let mut state = self.lock_state();
        let (window, node) = locate(&state.windows, selector)
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))?;
        if node.vanish_on_text_read {
            state.windows.remove(window);
            return Err(AutomationError::ElementNotFound(format!(
                "{selector} vanished before text read"
            )));
        }
        Ok(node.text.clone())
    }

    fn click(&self, selector: &Selector) -> Result<(), AutomationError> {
        self.push_event(ScreenEvent::Click(selector.clone()));
        self.click_node(selector).map(|_| ())
    }

    fn click_and_wait_for_new_window(
        &self,
        selector: &Selector,
    ) -> Result<bool, AutomationError> {
        self.push_event(ScreenEvent::ClickAndWaitForNewWindow(selector.clone()));
        self.click_node(selector)
    }

    fn wait_for_exists(&self, selector: &Selector, timeout: Duration) -> bool {
        self.push_event(ScreenEvent::WaitForExists(selector.clone(), timeout));
        let mut state = self.lock_state();
        if locate(&state.windows, selector).is_some() {
            return true;
        }
        let deferred = std::mem::take(&mut state.deferred);
        state.windows.extend(deferred);
        locate(&state.windows, selector).is_some()
    }

    fn current_foreground_package(&self) -> Result<String, AutomationError> {
        self.push_event(ScreenEvent::ForegroundPackage);
        self.lock_state()
            .foreground_package
            .clone()
            .ok_or_else(|| AutomationError::PlatformError("No foreground application".to_string()))
    }
}

/// Topmost visible node matching `selector`, with the index of its window.
fn locate(windows: &[FakeWindow], selector: &Selector) -> Option<(usize, FakeNode)> {
    let first_visible = windows.iter().rposition(|w| w.modal).unwrap_or(0);
    windows
        .iter()
        .enumerate()
        .skip(first_visible)
        .rev()
        .find_map(|(i, w)| find_node(&w.nodes, w, selector).map(|n| (i, n.clone())))
}

fn find_node<'a>(
    nodes: &'a [FakeNode],
    window: &FakeWindow,
    selector: &Selector,
) -> Option<&'a FakeNode> {
    for node in nodes {
        if node_matches(node, window, selector) {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, window, selector) {
            return Some(found);
        }
    }
    None
}

fn node_matches(node: &FakeNode, window: &FakeWindow, selector: &Selector) -> bool {
    match selector {
        Selector::ClassName(class_name) => node.class_name == *class_name,
        Selector::Text(text) => node.text == *text,
        Selector::TextContains(fragment) => node.text.contains(fragment.as_str()),
        Selector::PackageName(package) => window.package == *package,
        Selector::ResourceId(id) => node.resource_id.as_deref() == Some(id.as_str()),
        Selector::Enabled(enabled) => node.enabled == *enabled,
        Selector::Has(inner) => find_node(&node.children, window, inner).is_some(),
        Selector::And(parts) => parts.iter().all(|p| node_matches(node, window, p)),
        Selector::Invalid(_) => false,
    }
}
