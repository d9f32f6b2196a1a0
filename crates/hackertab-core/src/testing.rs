//! Test doubles shared by the unit tests.

use crate::storage::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use crate::widget::{ElementHandle, MinimizedTray};
use kurbo::Size;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Simple blocking executor for tests.
pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker { dummy_raw_waker() }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> BoxFuture<'_, StorageResult<String>> {
        Box::pin(async { Err(StorageError::Io("disk on fire".to_string())) })
    }

    fn set(&self, _key: &str, _value: &str) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async { Err(StorageError::Io("quota exceeded".to_string())) })
    }

    fn remove(&self, _key: &str) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async { Err(StorageError::Io("disk on fire".to_string())) })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async { Err(StorageError::Io("disk on fire".to_string())) })
    }
}

#[derive(Debug, Default)]
pub struct FakeElementState {
    pub styles: HashMap<String, String>,
    pub classes: HashSet<String>,
    pub text: String,
    pub title: String,
}

/// Element that records what the manager did to it.
///
/// Its outer size follows the `width`/`height` styles and collapses to zero
/// while `display: none`, like a laid-out DOM node.
#[derive(Debug, Clone, Default)]
pub struct FakeElement(pub Rc<RefCell<FakeElementState>>);

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let el = Self::new();
        el.0.borrow_mut().text = text.to_string();
        el
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().styles.get(property).cloned()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.contains(class)
    }

    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn title(&self) -> String {
        self.0.borrow().title.clone()
    }

    fn px_style(&self, property: &str) -> f64 {
        self.style(property)
            .and_then(|v| v.trim_end_matches("px").parse().ok())
            .unwrap_or(0.0)
    }
}

impl ElementHandle for FakeElement {
    fn set_style(&self, property: &str, value: &str) {
        self.0.borrow_mut().styles.insert(property.to_string(), value.to_string());
    }

    fn remove_style(&self, property: &str) {
        self.0.borrow_mut().styles.remove(property);
    }

    fn add_class(&self, class: &str) {
        self.0.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.remove(class);
    }

    fn set_text(&self, text: &str) {
        self.0.borrow_mut().text = text.to_string();
    }

    fn set_title(&self, title: &str) {
        self.0.borrow_mut().title = title.to_string();
    }

    fn text_content(&self) -> String {
        self.text()
    }

    fn outer_size(&self) -> Size {
        if self.style("display").as_deref() == Some("none") {
            return Size::ZERO;
        }
        Size::new(self.px_style("width"), self.px_style("height"))
    }
}

/// Tray that records proxies, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct FakeTray(pub Rc<RefCell<Vec<(String, String)>>>);

impl FakeTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, id: &str) -> usize {
        self.0.borrow().iter().filter(|(pid, _)| pid == id).count()
    }

    pub fn label(&self, id: &str) -> Option<String> {
        self.0.borrow().iter().find(|(pid, _)| pid == id).map(|(_, l)| l.clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl MinimizedTray for FakeTray {
    fn add_proxy(&mut self, id: &str, label: &str) {
        self.0.borrow_mut().push((id.to_string(), label.to_string()));
    }

    fn remove_proxy(&mut self, id: &str) {
        self.0.borrow_mut().retain(|(pid, _)| pid != id);
    }
}
