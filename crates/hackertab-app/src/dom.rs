//! DOM-backed element handles and minimized tray.

use hackertab_core::{ElementHandle, MinimizedTray};
use kurbo::Size;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Attribute tying a tray proxy back to its widget.
pub const WIDGET_ID_ATTR: &str = "data-widget-id";

/// An `HtmlElement` as seen by the widget manager.
///
/// DOM calls that fail are logged and otherwise ignored; the manager's own
/// state stays authoritative.
#[derive(Debug, Clone)]
pub struct DomElement(pub HtmlElement);

impl DomElement {
    /// Find a descendant matching `selector`.
    pub fn query(root: &Element, selector: &str) -> Option<Self> {
        root.query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map(DomElement)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.0
    }
}

impl ElementHandle for DomElement {
    fn set_style(&self, property: &str, value: &str) {
        if let Err(e) = self.0.style().set_property(property, value) {
            log::warn!("Failed to set {} on #{}: {:?}", property, self.0.id(), e);
        }
    }

    fn remove_style(&self, property: &str) {
        if let Err(e) = self.0.style().remove_property(property) {
            log::warn!("Failed to clear {} on #{}: {:?}", property, self.0.id(), e);
        }
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_title(&self, title: &str) {
        self.0.set_title(title);
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn outer_size(&self) -> Size {
        Size::new(self.0.offset_width() as f64, self.0.offset_height() as f64)
    }
}

/// The shared `#minimizedContainer` strip.
///
/// Proxies are plain buttons carrying [`WIDGET_ID_ATTR`]; a single delegated
/// click listener on the container routes activations back to the manager.
pub struct DomTray {
    document: Document,
    container: Element,
}

impl DomTray {
    pub fn new(document: Document, container: Element) -> Self {
        Self { document, container }
    }

    fn proxy(&self, id: &str) -> Option<Element> {
        self.container
            .query_selector(&format!("[{}=\"{}\"]", WIDGET_ID_ATTR, id))
            .ok()
            .flatten()
    }
}

impl MinimizedTray for DomTray {
    fn add_proxy(&mut self, id: &str, label: &str) {
        let button = match self.document.create_element("button") {
            Ok(button) => button,
            Err(e) => {
                log::error!("Failed to create tray proxy for {}: {:?}", id, e);
                return;
            }
        };
        button.set_class_name("minimized-widget");
        button.set_text_content(Some(label));
        let _ = button.set_attribute(WIDGET_ID_ATTR, id);
        let _ = button.set_attribute("aria-label", &format!("Restore {} widget", label));
        if let Err(e) = self.container.append_child(&button) {
            log::error!("Failed to add tray proxy for {}: {:?}", id, e);
        }
    }

    fn remove_proxy(&mut self, id: &str) {
        if let Some(proxy) = self.proxy(id) {
            proxy.remove();
        }
    }
}

/// Widget id of the tray proxy an event landed on, if any.
pub fn proxy_widget_id(target: Option<web_sys::EventTarget>) -> Option<String> {
    let element = target?.dyn_into::<Element>().ok()?;
    let proxy = element
        .closest(&format!("[{}]", WIDGET_ID_ATTR))
        .ok()
        .flatten()?;
    proxy.get_attribute(WIDGET_ID_ATTR)
}
