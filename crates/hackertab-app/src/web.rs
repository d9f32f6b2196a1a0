//! WebAssembly entry point: binds the widget manager to the new-tab page.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use hackertab_core::storage::LocalStorageStore;
use hackertab_core::{Capability, ChromeConfig, PersistWrite, WidgetConfig, WidgetHandles, WidgetManager};
use kurbo::{Point, Size};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, Window};
use web_time::Instant;

use crate::dom::{proxy_widget_id, DomElement, DomTray};

/// Class marking every widget root on the page.
const WIDGET_SELECTOR: &str = ".draggable";
/// Id of the minimized-widgets strip.
const TRAY_ID: &str = "minimizedContainer";
/// Class hiding a widget until its saved chrome has been applied.
const LOADING_CLASS: &str = "loading";

type DomManager = WidgetManager<LocalStorageStore, DomElement, DomTray>;

/// Document-level move/up listeners, attached for the life of one drag.
struct DragListeners {
    target: EventTarget,
    on_move: js_sys::Function,
    on_up: js_sys::Function,
}

impl DragListeners {
    fn attach(target: EventTarget, on_move: js_sys::Function, on_up: js_sys::Function) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback("mousemove", &on_move)?;
        target.add_event_listener_with_callback("mouseup", &on_up)?;
        Ok(Self { target, on_move, on_up })
    }
}

impl Drop for DragListeners {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback("mousemove", &self.on_move);
        let _ = self.target.remove_event_listener_with_callback("mouseup", &self.on_up);
    }
}

/// The single scheduled viewport flush.
#[derive(Default)]
struct ResizeTimer {
    handle: Option<i32>,
    flush: Option<js_sys::Function>,
}

impl ResizeTimer {
    /// Replace any scheduled flush with one `delay` from now.
    fn arm(&mut self, window: &Window, delay: Duration) {
        if let Some(handle) = self.handle.take() {
            window.clear_timeout_with_handle(handle);
        }
        let Some(flush) = &self.flush else {
            return;
        };
        // Round up so the timer never fires before the deadline it waits for
        let ms = delay.as_micros().div_ceil(1000).min(i32::MAX as u128) as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(flush, ms) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::warn!("Failed to schedule resize flush: {:?}", e),
        }
    }
}

struct Shell {
    manager: DomManager,
    drag: Option<DragListeners>,
    resize_timer: ResizeTimer,
}

type SharedShell = Rc<RefCell<Shell>>;

/// Document handlers created once and reused for every drag.
#[derive(Clone)]
struct DragCallbacks {
    document: Document,
    on_move: js_sys::Function,
    on_up: js_sys::Function,
}

fn spawn_write(write: PersistWrite<LocalStorageStore>) {
    wasm_bindgen_futures::spawn_local(async move {
        write.run().await;
    });
}

fn spawn_writes(writes: Vec<PersistWrite<LocalStorageStore>>) {
    for write in writes {
        spawn_write(write);
    }
}

fn viewport_size(window: &Window) -> Size {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(width, height)
}

fn pointer(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f64, event.client_y() as f64)
}

/// Whether a pointer event started on one of the header's buttons.
fn on_control(event: &MouseEvent) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest("button").ok().flatten())
        .is_some()
}

fn listen_mouse(target: &EventTarget, kind: &str, handler: impl FnMut(MouseEvent) + 'static) -> Result<js_sys::Function, JsValue> {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    let function: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    target.add_event_listener_with_callback(kind, &function)?;
    // Widgets live as long as the page
    closure.forget();
    Ok(function)
}

fn listen_key(target: &EventTarget, kind: &str, handler: impl FnMut(KeyboardEvent) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_event(target: &EventTarget, kind: &str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Build the move/up handlers without attaching them.
fn drag_callbacks(shell: &SharedShell, document: &Document) -> DragCallbacks {
    let move_shell = Rc::clone(shell);
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        move_shell.borrow_mut().manager.drag_to(pointer(&event));
    });

    let up_shell = Rc::clone(shell);
    let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
        let write = {
            let mut shell = up_shell.borrow_mut();
            // Dropping the guard detaches both document listeners
            shell.drag = None;
            shell.manager.end_drag()
        };
        if let Some(write) = write {
            spawn_write(write);
        }
    });

    let callbacks = DragCallbacks {
        document: document.clone(),
        on_move: on_move.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        on_up: on_up.as_ref().unchecked_ref::<js_sys::Function>().clone(),
    };
    on_move.forget();
    on_up.forget();
    callbacks
}

/// Wire one widget's controls to the manager.
fn wire_widget(
    shell: &SharedShell,
    drag: &DragCallbacks,
    id: &str,
    handles: &WidgetHandles<DomElement>,
) -> Result<(), JsValue> {
    if let Some(header) = &handles.drag_handle {
        let target: &EventTarget = header.element().as_ref();

        let (down_shell, down_id, callbacks) = (Rc::clone(shell), id.to_string(), drag.clone());
        listen_mouse(target, "mousedown", move |event: MouseEvent| {
            if event.button() != 0 || on_control(&event) {
                return;
            }
            let mut shell = down_shell.borrow_mut();
            match shell.manager.start_drag(&down_id, pointer(&event)) {
                Ok(true) => {
                    let listeners = DragListeners::attach(
                        callbacks.document.clone().into(),
                        callbacks.on_move.clone(),
                        callbacks.on_up.clone(),
                    );
                    match listeners {
                        Ok(listeners) => shell.drag = Some(listeners),
                        Err(e) => {
                            log::error!("Failed to track drag of {}: {:?}", down_id, e);
                            let _ = shell.manager.end_drag();
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => log::error!("{}", e),
            }
        })?;

        let (key_shell, key_id) = (Rc::clone(shell), id.to_string());
        listen_key(target, "keydown", move |event: KeyboardEvent| {
            let result = key_shell
                .borrow_mut()
                .manager
                .handle_key(&key_id, &event.key(), event.shift_key());
            match result {
                Ok(Some(write)) => {
                    event.prevent_default();
                    spawn_write(write);
                }
                Ok(None) => {}
                Err(e) => log::error!("{}", e),
            }
        })?;
    }

    type Action = fn(&mut DomManager, &str) -> hackertab_core::ChromeResult<Option<PersistWrite<LocalStorageStore>>>;
    let buttons: [(Capability, Action); 3] = [
        (Capability::Minimize, |m, id| m.toggle_minimize(id)),
        (Capability::Resize, |m, id| m.cycle_resize(id)),
        (Capability::Lock, |m, id| m.toggle_lock(id)),
    ];
    for (capability, action) in buttons {
        let Some(button) = handles.control(capability) else {
            continue;
        };
        let (click_shell, click_id) = (Rc::clone(shell), id.to_string());
        listen_mouse(button.element().as_ref(), "click", move |event: MouseEvent| {
            // Keep the click from starting a drag on the header
            event.stop_propagation();
            let result = action(&mut click_shell.borrow_mut().manager, &click_id);
            match result {
                Ok(Some(write)) => spawn_write(write),
                Ok(None) => {}
                Err(e) => log::error!("{}", e),
            }
        })?;
    }

    Ok(())
}

/// Register every widget on the page and restore its saved chrome.
fn register_widgets(shell: &SharedShell, drag: &DragCallbacks, document: &Document) -> Result<usize, JsValue> {
    let nodes = document.query_selector_all(WIDGET_SELECTOR)?;
    let mut registered = 0;

    for i in 0..nodes.length() {
        let Some(root) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let id = root.id();
        if id.is_empty() {
            log::warn!("Skipping {} element without an id", WIDGET_SELECTOR);
            continue;
        }

        let mut handles = WidgetHandles::new(DomElement(root.clone()));
        handles.drag_handle = DomElement::query(&root, Capability::Drag.selector());
        handles.minimize = DomElement::query(&root, Capability::Minimize.selector());
        handles.resize = DomElement::query(&root, Capability::Resize.selector());
        handles.lock = DomElement::query(&root, Capability::Lock.selector());

        let _ = root.class_list().add_1(LOADING_CLASS);

        let pending = match shell
            .borrow_mut()
            .manager
            .register_widget(&id, handles.clone(), WidgetConfig::default())
        {
            Ok(pending) => pending,
            Err(e) => {
                log::error!("{}", e);
                let _ = root.class_list().remove_1(LOADING_CLASS);
                continue;
            }
        };
        wire_widget(shell, drag, &id, &handles)?;

        let restore_shell = Rc::clone(shell);
        wasm_bindgen_futures::spawn_local(async move {
            let restored = pending.load().await;
            if let Err(e) = restore_shell.borrow_mut().manager.apply_restored(restored) {
                log::error!("{}", e);
            }
            let _ = root.class_list().remove_1(LOADING_CLASS);
        });
        registered += 1;
    }

    Ok(registered)
}

fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
    let tray = document
        .get_element_by_id(TRAY_ID)
        .ok_or_else(|| JsValue::from_str("Missing #minimizedContainer"))?;
    let store = LocalStorageStore::new().map_err(|e| JsValue::from_str(&e.to_string()))?;

    let config = ChromeConfig::default();
    let debounce_ms = config.resize_debounce_ms;
    let manager = WidgetManager::new(
        config,
        Arc::new(store),
        DomTray::new(document.clone(), tray.clone()),
        viewport_size(&window),
    );
    let shell: SharedShell = Rc::new(RefCell::new(Shell {
        manager,
        drag: None,
        resize_timer: ResizeTimer::default(),
    }));

    let drag = drag_callbacks(&shell, &document);
    let count = register_widgets(&shell, &drag, &document)?;
    log::info!("Registered {} widget(s)", count);

    // Tray proxies: one delegated listener for all of them
    let tray_shell = Rc::clone(&shell);
    listen_mouse(tray.as_ref(), "click", move |event: MouseEvent| {
        let Some(id) = proxy_widget_id(event.target()) else {
            return;
        };
        let result = tray_shell.borrow_mut().manager.toggle_minimize(&id);
        match result {
            Ok(Some(write)) => spawn_write(write),
            Ok(None) => {}
            Err(e) => log::error!("{}", e),
        }
    })?;

    // No text selection while dragging
    let select_shell = Rc::clone(&shell);
    listen_event(document.as_ref(), "selectstart", move |event: Event| {
        if select_shell.borrow().manager.is_dragging() {
            event.prevent_default();
        }
    })?;

    // Viewport resizes settle before widgets are re-fitted
    let flush_shell = Rc::clone(&shell);
    let flush_window = window.clone();
    let flush = Closure::<dyn FnMut()>::new(move || {
        let now = Instant::now();
        let writes = {
            let mut shell = flush_shell.borrow_mut();
            shell.resize_timer.handle = None;
            let writes = shell.manager.flush_viewport(now);
            // Fired ahead of the resize clock: wait out the remainder
            if let Some(remaining) = shell.manager.viewport_settles_in(now) {
                shell.resize_timer.arm(&flush_window, remaining);
            }
            writes
        };
        spawn_writes(writes);
    });
    shell.borrow_mut().resize_timer.flush = Some(flush.as_ref().unchecked_ref::<js_sys::Function>().clone());
    flush.forget();

    let resize_shell = Rc::clone(&shell);
    let resize_window = window.clone();
    let debounce = Duration::from_millis(debounce_ms);
    listen_event(window.as_ref(), "resize", move |_event: Event| {
        let viewport = viewport_size(&resize_window);
        let mut shell = resize_shell.borrow_mut();
        shell.manager.viewport_resized(viewport, Instant::now());
        shell.resize_timer.arm(&resize_window, debounce);
    })?;

    Ok(())
}

/// Initialize and run the widget chrome.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("Logger already initialized"));
    }

    log::info!("Starting hackertab (WASM)");

    if let Err(e) = start() {
        log::error!("hackertab failed to start: {:?}", e);
    }
}
