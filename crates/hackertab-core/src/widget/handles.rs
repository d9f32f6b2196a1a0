//! Element handles a widget exposes to the chrome manager.

use kurbo::Size;

/// A handle to one rendered element (a DOM node in the browser shell).
///
/// Handles are cheap shared references; mutation goes through `&self` the
/// same way DOM calls do.
pub trait ElementHandle {
    fn set_style(&self, property: &str, value: &str);
    fn remove_style(&self, property: &str);
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn set_text(&self, text: &str);
    fn set_title(&self, title: &str);
    fn text_content(&self) -> String;
    /// Laid-out size. Zero while the element is hidden.
    fn outer_size(&self) -> Size;
}

/// Shared area holding proxies for minimized widgets.
pub trait MinimizedTray {
    /// Show a proxy for `id`. Activating it must call back into
    /// `toggle_minimize(id)`.
    fn add_proxy(&mut self, id: &str, label: &str);
    /// Remove the proxy for `id`, if present.
    fn remove_proxy(&mut self, id: &str);
}

/// A chrome capability backed by an optional control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Drag,
    Minimize,
    Resize,
    Lock,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Drag,
        Capability::Minimize,
        Capability::Resize,
        Capability::Lock,
    ];

    /// Selector of the control inside a widget root.
    pub fn selector(self) -> &'static str {
        match self {
            Capability::Drag => ".drag-header",
            Capability::Minimize => ".minimize-btn",
            Capability::Resize => ".resize-btn",
            Capability::Lock => ".lock-btn",
        }
    }
}

/// A widget root plus whichever chrome controls it has.
#[derive(Debug, Clone)]
pub struct WidgetHandles<E> {
    pub root: E,
    pub drag_handle: Option<E>,
    pub minimize: Option<E>,
    pub resize: Option<E>,
    pub lock: Option<E>,
}

impl<E> WidgetHandles<E> {
    /// A root with no controls.
    pub fn new(root: E) -> Self {
        Self {
            root,
            drag_handle: None,
            minimize: None,
            resize: None,
            lock: None,
        }
    }

    pub fn with_drag_handle(mut self, handle: E) -> Self {
        self.drag_handle = Some(handle);
        self
    }

    pub fn with_minimize(mut self, button: E) -> Self {
        self.minimize = Some(button);
        self
    }

    pub fn with_resize(mut self, button: E) -> Self {
        self.resize = Some(button);
        self
    }

    pub fn with_lock(mut self, button: E) -> Self {
        self.lock = Some(button);
        self
    }

    /// Control backing a capability.
    pub fn control(&self, capability: Capability) -> Option<&E> {
        match capability {
            Capability::Drag => self.drag_handle.as_ref(),
            Capability::Minimize => self.minimize.as_ref(),
            Capability::Resize => self.resize.as_ref(),
            Capability::Lock => self.lock.as_ref(),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.control(capability).is_some()
    }

    /// Capabilities with no control.
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| !self.supports(*c))
            .collect()
    }
}
