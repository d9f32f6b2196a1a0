//! Widget manager: drag, keyboard move, resize cycling, minimize and lock
//! for every registered widget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kurbo::{Point, Size, Vec2};
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use super::handles::{Capability, ElementHandle, MinimizedTray, WidgetHandles};
use super::presets::SizePresets;
use super::state::{ChromeMode, WidgetState};
use crate::config::{ChromeConfig, WidgetConfig};
use crate::debounce::Debouncer;
use crate::geometry::{clamp_position, max_position, px};
use crate::storage::{ChromeStore, KeyValueStore, PendingRestore, PersistWrite, Restored};

/// z-index applied to a widget while it is being dragged.
const DRAG_Z_INDEX: &str = "1000";
const LOCKED_LABEL: &str = "[L]";
const UNLOCKED_LABEL: &str = "[X]";

/// Manager errors. These are caller mistakes, not runtime failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChromeError {
    #[error("Widget already registered: {0}")]
    AlreadyRegistered(String),
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),
    #[error("Widget {0} has no size presets")]
    EmptyPresets(String),
}

/// Result type for manager operations.
pub type ChromeResult<T> = Result<T, ChromeError>;

/// Arrow key direction for keyboard moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Left,
    Right,
    Up,
    Down,
}

impl MoveKey {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            _ => None,
        }
    }

    fn delta(self, step: f64) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-step, 0.0),
            Self::Right => Vec2::new(step, 0.0),
            Self::Up => Vec2::new(0.0, -step),
            Self::Down => Vec2::new(0.0, step),
        }
    }
}

/// The single in-flight drag.
#[derive(Debug, Clone)]
struct ActiveDrag {
    id: String,
    /// Pointer position minus widget corner at drag start.
    offset: Vec2,
}

struct WidgetEntry<E> {
    state: WidgetState,
    handles: WidgetHandles<E>,
    presets: SizePresets,
    default_tier: usize,
}

impl<E: ElementHandle> WidgetEntry<E> {
    /// Extent used for containment: the laid-out size, or the current
    /// preset while the element reports nothing (hidden, not yet laid out).
    fn extent(&self) -> Size {
        let measured = self.handles.root.outer_size();
        if measured.width > 0.0 && measured.height > 0.0 {
            return measured;
        }
        self.presets
            .get(self.state.size_tier)
            .map(|p| p.size())
            .unwrap_or(Size::ZERO)
    }

    fn apply_position(&self) {
        let root = &self.handles.root;
        root.set_style("left", &px(self.state.position.x));
        root.set_style("top", &px(self.state.position.y));
    }

    fn apply_size(&self, previous: Option<usize>) {
        let root = &self.handles.root;
        if let Some(prev) = previous.and_then(|tier| self.presets.get(tier)) {
            root.remove_class(&prev.class_name);
        }
        let Some(preset) = self.presets.get(self.state.size_tier) else {
            return;
        };
        root.add_class(&preset.class_name);
        root.set_style("width", &px(preset.width));
        root.set_style("height", &px(preset.height));
        if let Some(button) = &self.handles.resize {
            button.set_title(&preset.title());
        }
    }

    fn apply_lock(&self) {
        if let Some(button) = &self.handles.lock {
            if self.state.locked {
                button.add_class("locked");
                button.set_text(LOCKED_LABEL);
            } else {
                button.remove_class("locked");
                button.set_text(UNLOCKED_LABEL);
            }
        }
        if let Some(header) = &self.handles.drag_handle {
            header.set_style("cursor", if self.state.locked { "default" } else { "move" });
        }
    }

    /// Clamp into the viewport and repaint. Returns whether it moved.
    fn clamp_into(&mut self, viewport: Size) -> bool {
        let clamped = clamp_position(self.state.position, self.extent(), viewport);
        let moved = clamped != self.state.position;
        self.state.position = clamped;
        self.apply_position();
        moved
    }

    /// First line of the header text, falling back to the id.
    fn tray_label(&self) -> String {
        self.handles
            .drag_handle
            .as_ref()
            .map(|h| h.text_content())
            .and_then(|text| text.lines().map(str::trim).find(|l| !l.is_empty()).map(String::from))
            .unwrap_or_else(|| self.state.id.clone())
    }

    fn apply_minimized<T: MinimizedTray>(&mut self, tray: &mut T, minimized: bool) {
        self.state.minimized = minimized;
        let id = self.state.id.clone();
        if minimized {
            self.handles.root.set_style("display", "none");
            tray.add_proxy(&id, &self.tray_label());
        } else {
            // Back to whatever the stylesheet says
            self.handles.root.remove_style("display");
            tray.remove_proxy(&id);
        }
    }
}

/// Owns the chrome state of every registered widget.
///
/// All operations are synchronous state + element mutations. Operations
/// that change persisted state return a [`PersistWrite`] which the caller
/// awaits or spawns; a failed write is logged and never rolls anything back.
pub struct WidgetManager<S: KeyValueStore, E: ElementHandle, T: MinimizedTray> {
    config: ChromeConfig,
    store: ChromeStore<S>,
    tray: T,
    viewport: Size,
    widgets: HashMap<String, WidgetEntry<E>>,
    /// Registration order, for deterministic fan-out.
    order: Vec<String>,
    /// At most one widget drags at a time.
    drag: Option<ActiveDrag>,
    resize_debouncer: Debouncer<Size>,
}

impl<S: KeyValueStore, E: ElementHandle, T: MinimizedTray> WidgetManager<S, E, T> {
    /// Create a manager for a viewport of the given size.
    pub fn new(config: ChromeConfig, store: Arc<S>, tray: T, viewport: Size) -> Self {
        let store = ChromeStore::with_prefix(store, config.key_prefix.clone());
        let resize_debouncer = Debouncer::new(config.resize_debounce());
        Self {
            config,
            store,
            tray,
            viewport,
            widgets: HashMap::new(),
            order: Vec::new(),
            drag: None,
            resize_debouncer,
        }
    }

    /// Current viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// State of a widget.
    pub fn widget(&self, id: &str) -> Option<&WidgetState> {
        self.widgets.get(id).map(|e| &e.state)
    }

    /// All widget states in registration order.
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetState> {
        self.order
            .iter()
            .filter_map(|id| self.widgets.get(id))
            .map(|e| &e.state)
    }

    /// Size presets of a widget.
    pub fn presets(&self, id: &str) -> Option<&SizePresets> {
        self.widgets.get(id).map(|e| &e.presets)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Whether any widget is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The widget being dragged, if any.
    pub fn dragging_widget(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.id.as_str())
    }

    /// Interaction mode of a widget.
    pub fn mode(&self, id: &str) -> Option<ChromeMode> {
        let entry = self.widgets.get(id)?;
        Some(if self.dragging_widget() == Some(id) {
            ChromeMode::Dragging
        } else if entry.state.minimized {
            ChromeMode::Minimized
        } else {
            ChromeMode::Normal
        })
    }

    /// Register a widget with default state and visuals.
    ///
    /// Returns the read of its persisted state; feed the result to
    /// [`apply_restored`](Self::apply_restored) once it resolves.
    pub fn register_widget(
        &mut self,
        id: &str,
        handles: WidgetHandles<E>,
        config: WidgetConfig,
    ) -> ChromeResult<PendingRestore<S>> {
        if self.widgets.contains_key(id) {
            return Err(ChromeError::AlreadyRegistered(id.to_string()));
        }

        let presets = config.presets.unwrap_or_else(|| self.config.presets.clone());
        if presets.is_empty() {
            return Err(ChromeError::EmptyPresets(id.to_string()));
        }

        for capability in handles.missing() {
            log::warn!(
                "Widget {} has no {} control; {:?} disabled",
                id,
                capability.selector(),
                capability
            );
        }

        let default_tier = presets.clamp_tier(config.default_tier.unwrap_or(self.config.default_tier));
        let mut entry = WidgetEntry {
            state: WidgetState::new(id, config.default_position, default_tier),
            handles,
            presets,
            default_tier,
        };
        entry.apply_size(None);
        entry.clamp_into(self.viewport);
        entry.apply_lock();

        log::debug!("Registered widget {}", id);
        self.widgets.insert(id.to_string(), entry);
        self.order.push(id.to_string());

        Ok(self.store.read(id))
    }

    /// Register a widget and wait for its persisted state before returning.
    pub async fn register_and_restore(
        &mut self,
        id: &str,
        handles: WidgetHandles<E>,
        config: WidgetConfig,
    ) -> ChromeResult<()> {
        let pending = self.register_widget(id, handles, config)?;
        let restored = pending.load().await;
        self.apply_restored(restored)
    }

    /// Apply a resolved restore read.
    ///
    /// Out-of-range positions are clamped and unknown tiers fall back to the
    /// default tier, silently. Nothing is written back.
    pub fn apply_restored(&mut self, restored: Restored) -> ChromeResult<()> {
        let dragging = self.dragging_widget() == Some(restored.id.as_str());
        let entry = self
            .widgets
            .get_mut(&restored.id)
            .ok_or_else(|| ChromeError::UnknownWidget(restored.id.clone()))?;

        let Some(saved) = restored.state else {
            return Ok(());
        };

        let tier = if saved.size_tier < entry.presets.len() {
            saved.size_tier
        } else {
            log::debug!(
                "Stored tier {} out of range for {}; using {}",
                saved.size_tier,
                restored.id,
                entry.default_tier
            );
            entry.default_tier
        };
        if tier != entry.state.size_tier {
            let previous = entry.state.size_tier;
            entry.state.size_tier = tier;
            entry.apply_size(Some(previous));
        }

        // A drag that started during the restore read wins
        if !dragging {
            entry.state.position = saved.position;
        }
        entry.clamp_into(self.viewport);

        if entry.handles.supports(Capability::Lock) {
            entry.state.locked = saved.locked;
            entry.apply_lock();
        }

        if entry.handles.supports(Capability::Minimize) && saved.minimized != entry.state.minimized {
            if saved.minimized && dragging {
                self.drag = None;
                entry.handles.root.remove_style("z-index");
            }
            entry.apply_minimized(&mut self.tray, saved.minimized);
        }

        log::debug!("Restored widget {}", restored.id);
        Ok(())
    }

    /// Remove a widget, its tray proxy and any drag it owns.
    pub fn unregister_widget(&mut self, id: &str) -> ChromeResult<WidgetState> {
        let entry = self
            .widgets
            .remove(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;
        self.order.retain(|other| other != id);

        if entry.state.minimized {
            self.tray.remove_proxy(id);
        }
        if self.dragging_widget() == Some(id) {
            self.drag = None;
            entry.handles.root.remove_style("z-index");
        }

        Ok(entry.state)
    }

    /// Begin dragging `id` from a pointer-down at `pointer`.
    ///
    /// Refused (returns `false`) when the widget is locked, minimized, has no
    /// drag handle, or another drag is in flight.
    pub fn start_drag(&mut self, id: &str, pointer: Point) -> ChromeResult<bool> {
        let entry = self
            .widgets
            .get(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;

        if let Some(active) = &self.drag {
            log::debug!("Ignoring drag of {}: {} is already dragging", id, active.id);
            return Ok(false);
        }
        if !entry.handles.supports(Capability::Drag) || !entry.state.is_movable() {
            return Ok(false);
        }

        let offset = pointer - entry.state.position;
        entry.handles.root.set_style("z-index", DRAG_Z_INDEX);
        self.drag = Some(ActiveDrag {
            id: id.to_string(),
            offset,
        });
        Ok(true)
    }

    /// Follow a pointer-move during a drag. Returns whether the widget moved.
    ///
    /// The new corner is derived from the raw pointer position and the
    /// offset captured at drag start, so no error accumulates.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(active) = &self.drag else {
            return false;
        };
        let Some(entry) = self.widgets.get_mut(&active.id) else {
            return false;
        };

        let target = pointer - active.offset;
        let clamped = clamp_position(target, entry.extent(), self.viewport);
        if clamped == entry.state.position {
            return false;
        }
        entry.state.position = clamped;
        entry.apply_position();
        true
    }

    /// Finish the drag on pointer-up and commit the final position.
    pub fn end_drag(&mut self) -> Option<PersistWrite<S>> {
        let active = self.drag.take()?;
        let entry = self.widgets.get(&active.id)?;
        entry.handles.root.remove_style("z-index");
        Some(self.store.write(&active.id, entry.state.persisted()))
    }

    /// Handle a key press on the drag handle.
    ///
    /// Non-arrow keys are ignored. Returns a write whenever the key was
    /// consumed, so the caller knows to suppress the default action.
    pub fn handle_key(&mut self, id: &str, key: &str, shift: bool) -> ChromeResult<Option<PersistWrite<S>>> {
        match MoveKey::from_key(key) {
            Some(direction) => self.move_by_key(id, direction, shift),
            None => {
                if !self.widgets.contains_key(id) {
                    return Err(ChromeError::UnknownWidget(id.to_string()));
                }
                Ok(None)
            }
        }
    }

    /// Nudge a widget one step. Shift uses the accelerated step.
    pub fn move_by_key(&mut self, id: &str, direction: MoveKey, shift: bool) -> ChromeResult<Option<PersistWrite<S>>> {
        let step = if shift {
            self.config.accelerated_step
        } else {
            self.config.base_step
        };
        let entry = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;

        if !entry.handles.supports(Capability::Drag) || !entry.state.is_movable() {
            return Ok(None);
        }

        entry.state.position += direction.delta(step);
        entry.clamp_into(self.viewport);
        Ok(Some(self.store.write(id, entry.state.persisted())))
    }

    /// Advance to the next size tier, wrapping after the last.
    ///
    /// Allowed while locked. The widget is re-clamped if it grew past the
    /// viewport edge.
    pub fn cycle_resize(&mut self, id: &str) -> ChromeResult<Option<PersistWrite<S>>> {
        let entry = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;

        if !entry.handles.supports(Capability::Resize) {
            return Ok(None);
        }

        let previous = entry.state.size_tier;
        entry.state.size_tier = entry.presets.next_tier(previous);
        entry.apply_size(Some(previous));
        entry.clamp_into(self.viewport);
        Ok(Some(self.store.write(id, entry.state.persisted())))
    }

    /// Minimize if visible, restore if minimized.
    pub fn toggle_minimize(&mut self, id: &str) -> ChromeResult<Option<PersistWrite<S>>> {
        let minimized = self
            .widget(id)
            .map(|s| s.minimized)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;
        self.set_minimized(id, !minimized)
    }

    /// Minimize a widget. No-op if it already is.
    pub fn minimize(&mut self, id: &str) -> ChromeResult<Option<PersistWrite<S>>> {
        self.set_minimized(id, true)
    }

    /// Restore a minimized widget. No-op if it isn't minimized.
    pub fn restore(&mut self, id: &str) -> ChromeResult<Option<PersistWrite<S>>> {
        self.set_minimized(id, false)
    }

    fn set_minimized(&mut self, id: &str, minimized: bool) -> ChromeResult<Option<PersistWrite<S>>> {
        let dragging = self.dragging_widget() == Some(id);
        let entry = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;

        if !entry.handles.supports(Capability::Minimize) {
            return Ok(None);
        }
        // Guard on the stored flag so a proxy is never created twice
        if entry.state.minimized == minimized {
            return Ok(None);
        }

        if minimized && dragging {
            // A hidden widget cannot keep dragging; the write below commits it
            self.drag = None;
            entry.handles.root.remove_style("z-index");
        }

        entry.apply_minimized(&mut self.tray, minimized);
        if !minimized {
            entry.clamp_into(self.viewport);
        }
        Ok(Some(self.store.write(id, entry.state.persisted())))
    }

    /// Flip the lock flag.
    ///
    /// Locking mid-drag lets the current drag finish; only later drag starts
    /// are refused.
    pub fn toggle_lock(&mut self, id: &str) -> ChromeResult<Option<PersistWrite<S>>> {
        let dragging = self.dragging_widget() == Some(id);
        let entry = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| ChromeError::UnknownWidget(id.to_string()))?;

        if !entry.handles.supports(Capability::Lock) {
            return Ok(None);
        }

        entry.state.locked = !entry.state.locked;
        entry.apply_lock();
        if entry.state.locked && dragging {
            log::debug!("{} locked mid-drag; lock applies after release", id);
        }
        Ok(Some(self.store.write(id, entry.state.persisted())))
    }

    /// Re-fit every widget to a new viewport.
    ///
    /// Widgets that now stick out past the far edge are pulled back and
    /// produce exactly one write each; the rest are untouched.
    pub fn on_viewport_resize(&mut self, viewport: Size) -> Vec<PersistWrite<S>> {
        self.viewport = viewport;

        let mut writes = Vec::new();
        for id in &self.order {
            let Some(entry) = self.widgets.get_mut(id) else {
                continue;
            };
            let max = max_position(entry.extent(), viewport);
            let position = entry.state.position;
            if position.x <= max.x && position.y <= max.y {
                continue;
            }
            entry.state.position = Point::new(position.x.min(max.x), position.y.min(max.y));
            entry.apply_position();
            writes.push(self.store.write(id, entry.state.persisted()));
        }

        if !writes.is_empty() {
            log::debug!(
                "Viewport {}x{}: re-fitted {} widget(s)",
                viewport.width,
                viewport.height,
                writes.len()
            );
        }
        writes
    }

    /// Record a raw viewport resize event. Bursts coalesce until
    /// [`flush_viewport`](Self::flush_viewport) finds them settled.
    pub fn viewport_resized(&mut self, viewport: Size, now: Instant) {
        self.resize_debouncer.push(viewport, now);
    }

    /// Apply the latest viewport size once it has settled.
    pub fn flush_viewport(&mut self, now: Instant) -> Vec<PersistWrite<S>> {
        match self.resize_debouncer.take_ready(now) {
            Some(viewport) => self.on_viewport_resize(viewport),
            None => Vec::new(),
        }
    }

    /// Time left until a pending viewport resize settles, or `None` when
    /// nothing is pending. A timer that fired early re-arms for this long.
    pub fn viewport_settles_in(&self, now: Instant) -> Option<Duration> {
        self.resize_debouncer
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
