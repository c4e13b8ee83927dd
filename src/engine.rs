//! Editor engine: the single owner of the live design and every interaction state.
//!
//! ARCHITECTURE
//! ============
//! `EngineCore` holds the design (elements plus background), the viewport, the
//! gesture state machine, history, layer sets, and the replace session. Every
//! change to the design goes through one entry point (`try_mutate`), which
//! decides whether the change becomes a history snapshot: discrete edits are
//! recorded immediately, edits made during a drag/resize/rotate are coalesced
//! into one snapshot when the gesture ends, and writes made while applying
//! undo/redo are never recorded.
//!
//! `Engine` wraps the core with the DOM container element so the host can
//! forward raw browser events; all logic lives in the core and is tested
//! without a browser.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::convert::Infallible;

use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::config::EditorConfig;
use crate::consts::NEW_IMAGE_FILL;
use crate::doc::{DesignElement, DesignState, ElementId, ElementPatch, PrintArea};
use crate::error::EditorError;
use crate::history::History;
use crate::hit::{self, HandleMetrics, HitPart};
use crate::input::{Button, Command, Gesture, Key, Modifiers, UiState, WheelDelta, is_manipulation_button};
use crate::layers::{self, LayerMove, LayerSets};
use crate::manipulate::{self, Corner, ResizeOrigin};
use crate::render::{Scene, SceneInputs, build_scene};
use crate::replace::{self, ReplaceMode};
use crate::transform::{ContainerRect, Point, Transform};
use crate::viewport::Viewport;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed and should be repainted.
    RenderNeeded,
    /// CSS cursor name for the container.
    SetCursor(String),
    SelectionChanged(Option<ElementId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    ElementAdded(ElementId),
    ElementRemoved(ElementId),
    ReplaceModeChanged { active: bool },
}

/// Core engine state: all logic that doesn't depend on the DOM.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    config: EditorConfig,
    transform: Transform,
    state: DesignState,
    pub viewport: Viewport,
    pub ui: UiState,
    gesture: Gesture,
    /// Pre-gesture design, kept only while no history exists yet.
    gesture_baseline: Option<DesignState>,
    history: History,
    layers: LayerSets,
    replace: ReplaceMode,
    print_area: PrintArea,
    container: ContainerRect,
    last_pointer: Option<Point>,
    clipboard: Option<DesignElement>,
    cursor: &'static str,
    dirty: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::build(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a core with a host-supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Config`] when the configuration is invalid.
    pub fn with_config(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EditorConfig) -> Self {
        Self {
            transform: Transform::new(config.logical_size),
            history: History::new(config.history_cap),
            print_area: PrintArea {
                x: 0.0,
                y: 0.0,
                width: config.logical_size,
                height: config.logical_size,
            },
            config,
            state: DesignState::default(),
            viewport: Viewport::new(),
            ui: UiState::default(),
            gesture: Gesture::Idle,
            gesture_baseline: None,
            layers: LayerSets::new(),
            replace: ReplaceMode::default(),
            container: ContainerRect::default(),
            last_pointer: None,
            clipboard: None,
            cursor: "default",
            dirty: false,
        }
    }

    // --- Collaborator inputs ---

    /// Update the container's client rect. Call on resize and scroll.
    pub fn set_container(&mut self, rect: ContainerRect) {
        if rect.is_degenerate() {
            tracing::debug!(?rect, "degenerate container rect");
        }
        self.container = rect;
    }

    /// Set the print area supplied by the product collaborator.
    ///
    /// Returns `false` and keeps the previous area when any field is non-finite.
    pub fn set_print_area(&mut self, area: PrintArea) -> bool {
        if ![area.x, area.y, area.width, area.height].iter().all(|v| v.is_finite()) {
            tracing::warn!(?area, "rejected non-finite print area");
            return false;
        }
        self.print_area = area;
        true
    }

    /// Replace the live design with one supplied by the persistence collaborator.
    ///
    /// Resets history (the next mutation takes this design as its baseline),
    /// selection, hidden/locked sets, replace mode, and the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns the first invalid element; the live design is left untouched.
    pub fn load_design(&mut self, state: DesignState) -> Result<(), EditorError> {
        if let Err(err) = state.validate() {
            tracing::warn!(%err, "rejected design load");
            return Err(err);
        }
        self.cancel_gesture();
        self.viewport.end_pan();
        self.state = state;
        self.history.clear();
        self.layers.clear();
        self.replace.exit();
        self.ui.selected_id = None;
        self.clipboard = None;
        self.dirty = false;
        tracing::debug!(elements = self.state.elements.len(), "design loaded");
        Ok(())
    }

    /// Parse and load a design from JSON.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first invalid element.
    pub fn load_json(&mut self, raw: &str) -> Result<(), EditorError> {
        let state = DesignState::from_json(raw).inspect_err(|err| tracing::warn!(%err, "rejected design json"))?;
        self.load_design(state)
    }

    /// Deep copy of the design for saving.
    #[must_use]
    pub fn export_design(&self) -> DesignState {
        self.state.clone()
    }

    /// Serialized design for saving.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Deserialize`] if serialization fails.
    pub fn export_json(&self) -> Result<String, EditorError> {
        self.state.to_json()
    }

    /// Clear the dirty flag once the persistence collaborator has saved.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // --- Mutation entry point ---

    /// Apply a change to the design and decide whether it is recorded.
    ///
    /// `f` returns whether it changed anything. Writes are refused while a
    /// history snapshot is being applied.
    fn try_mutate<E>(&mut self, f: impl FnOnce(&mut DesignState) -> Result<bool, E>) -> Result<bool, E> {
        if self.gesture == Gesture::ApplyingHistory {
            return Ok(false);
        }
        let coalescing = self.gesture.is_manipulating();
        let pre = (!coalescing && self.history.is_empty()).then(|| self.state.clone());
        if !f(&mut self.state)? {
            return Ok(false);
        }
        self.dirty = true;
        if coalescing {
            return Ok(true);
        }
        if let Some(pre) = pre {
            self.history.ensure_baseline(&pre);
        }
        self.history.record(&self.state);
        Ok(true)
    }

    fn mutate(&mut self, f: impl FnOnce(&mut DesignState) -> bool) -> bool {
        let Ok(changed) = self.try_mutate(|s| Ok::<bool, Infallible>(f(s)));
        changed
    }

    // --- Element editing ---

    /// Add a text element at the print-area center and select it.
    pub fn add_text(&mut self, content: impl Into<String>) -> ElementId {
        let element = DesignElement::text(content, self.print_area.center());
        self.insert_new(element)
    }

    /// Add an image at the print-area center, sized to fit half the print
    /// area with the given width/height ratio, and select it.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidSize`] for a non-positive or non-finite ratio.
    pub fn add_image(&mut self, url: impl Into<String>, aspect_ratio: f64) -> Result<ElementId, EditorError> {
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(EditorError::InvalidSize { field: "aspectRatio", value: aspect_ratio });
        }
        let (width, height) = self.initial_image_size(aspect_ratio);
        let element = DesignElement::image(url, width, height, self.print_area.center());
        Ok(self.insert_new(element))
    }

    fn initial_image_size(&self, aspect: f64) -> (f64, f64) {
        let min = self.config.min_element_size;
        let mut width = self.print_area.width * NEW_IMAGE_FILL;
        let mut height = width / aspect;
        let max_height = self.print_area.height * NEW_IMAGE_FILL;
        if height > max_height {
            height = max_height;
            width = height * aspect;
        }
        let smaller = width.min(height);
        if !(smaller.is_finite() && smaller >= min) {
            // Degenerate print area or extreme ratio: fall back to the floor.
            return if aspect >= 1.0 { (min * aspect, min) } else { (min, min / aspect) };
        }
        (width, height)
    }

    fn insert_new(&mut self, element: DesignElement) -> ElementId {
        let id = element.id;
        self.mutate(|s| {
            s.elements.push(element);
            true
        });
        self.ui.selected_id = Some(id);
        tracing::debug!(%id, "element added");
        id
    }

    /// Apply a sparse property patch to an element.
    ///
    /// Locked elements accept style changes but not geometry changes.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`], [`EditorError::Locked`], or the
    /// patch's validation error (in which case nothing changes).
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<bool, EditorError> {
        let min = self.config.min_element_size;
        let locked = self.layers.is_locked(&id);
        self.try_mutate(|s| {
            if locked && patch.touches_geometry() {
                return Err(EditorError::Locked(id));
            }
            let element = s.get_mut(&id).ok_or(EditorError::ElementNotFound(id))?;
            patch.apply(element, min)
        })
        .inspect_err(|err| tracing::warn!(%id, %err, "rejected element patch"))
    }

    /// Set the product background color.
    pub fn set_background_color(&mut self, color: impl Into<String>) -> bool {
        let color = color.into();
        self.mutate(|s| {
            if s.background_color == color {
                return false;
            }
            s.background_color = color;
            true
        })
    }

    /// Remove an element and forget it everywhere it is referenced.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        if self.gesture.element_id() == Some(id) {
            self.end_gesture();
        }
        if !self.mutate(|s| s.remove(&id).is_some()) {
            return false;
        }
        self.layers.evict(&id);
        if self.ui.selected_id == Some(id) {
            self.ui.selected_id = None;
        }
        if self.replace.target() == Some(id) {
            self.replace.exit();
        }
        tracing::debug!(%id, "element deleted");
        true
    }

    /// Keep a deep copy of the selected element for pasting.
    pub fn copy_selected(&mut self) -> bool {
        let Some(element) = self.ui.selected_id.and_then(|id| self.state.get(&id)) else {
            return false;
        };
        self.clipboard = Some(element.clone());
        true
    }

    /// Insert a copy of the clipboard element, offset from the last copy, on top of the stack.
    pub fn paste(&mut self) -> Option<ElementId> {
        let copy = self.clipboard.as_ref()?.duplicate(self.config.paste_offset);
        self.clipboard = Some(copy.clone());
        Some(self.insert_new(copy))
    }

    // --- Selection and layers ---

    /// Select an element (or clear the selection). Hidden elements cannot be selected.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        let id = id.filter(|id| self.state.get(id).is_some() && !self.layers.is_hidden(id));
        if self.ui.selected_id == id {
            return false;
        }
        self.ui.selected_id = id;
        true
    }

    /// Swap an element with its neighbor in paint order.
    pub fn move_layer(&mut self, id: ElementId, dir: LayerMove) -> bool {
        self.mutate(|s| layers::move_layer(&mut s.elements, &id, dir))
    }

    /// Show or hide an element. Hiding the selected element clears the selection.
    ///
    /// Returns `false` for an unknown id.
    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) -> bool {
        if self.state.get(&id).is_none() {
            return false;
        }
        if hidden && self.gesture.element_id() == Some(id) {
            self.end_gesture();
        }
        self.layers.set_hidden(id, hidden);
        if hidden && self.ui.selected_id == Some(id) {
            self.ui.selected_id = None;
        }
        true
    }

    /// Lock or unlock an element against manipulation.
    ///
    /// Returns `false` for an unknown id.
    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> bool {
        if self.state.get(&id).is_none() {
            return false;
        }
        if locked && self.gesture.element_id() == Some(id) {
            self.end_gesture();
        }
        self.layers.set_locked(id, locked);
        true
    }

    /// Flip visibility. Returns the new hidden state, or `None` for an unknown id.
    pub fn toggle_hidden(&mut self, id: ElementId) -> Option<bool> {
        let hidden = !self.layers.is_hidden(&id);
        self.set_hidden(id, hidden).then_some(hidden)
    }

    /// Flip the manipulation lock. Returns the new locked state, or `None` for an unknown id.
    pub fn toggle_locked(&mut self, id: ElementId) -> Option<bool> {
        let locked = !self.layers.is_locked(&id);
        self.set_locked(id, locked).then_some(locked)
    }

    // --- Gestures ---

    fn manipulable(&self, id: &ElementId) -> Option<&DesignElement> {
        if self.gesture == Gesture::ApplyingHistory || self.layers.is_locked(id) || self.layers.is_hidden(id) {
            return None;
        }
        self.state.get(id)
    }

    fn enter_gesture(&mut self, gesture: Gesture) {
        if self.gesture.is_manipulating() {
            self.end_gesture();
        }
        self.gesture_baseline = self.history.is_empty().then(|| self.state.clone());
        self.gesture = gesture;
        tracing::debug!(gesture = gesture.label(), "gesture started");
    }

    /// Start moving an element grabbed at logical point `at`.
    ///
    /// Locked elements are selected but not dragged. Returns whether a drag started.
    pub fn begin_drag(&mut self, id: ElementId, at: Point) -> bool {
        if self.state.get(&id).is_some() && !self.layers.is_hidden(&id) {
            self.ui.selected_id = Some(id);
        }
        let Some(element) = self.manipulable(&id) else {
            return false;
        };
        let offset = manipulate::drag_offset(at, element.center());
        if !offset.is_finite() {
            return false;
        }
        self.enter_gesture(Gesture::Dragging { id, offset });
        true
    }

    /// Start resizing an image from a corner handle. No-op for text, locked, or unknown elements.
    pub fn begin_resize(&mut self, id: ElementId, corner: Corner) -> bool {
        let Some(element) = self.manipulable(&id) else {
            return false;
        };
        let Some(img) = element.as_image() else {
            return false;
        };
        let origin = ResizeOrigin { center: element.center(), width: img.width, height: img.height };
        self.ui.selected_id = Some(id);
        self.enter_gesture(Gesture::Resizing { id, corner, origin });
        true
    }

    /// Start rotating an element around its center. No-op for locked or unknown elements.
    pub fn begin_rotate(&mut self, id: ElementId) -> bool {
        let Some(element) = self.manipulable(&id) else {
            return false;
        };
        let center = element.center();
        self.ui.selected_id = Some(id);
        self.enter_gesture(Gesture::Rotating { id, center });
        true
    }

    /// Apply one frame of the active gesture for a logical pointer position.
    pub fn update_gesture(&mut self, at: Point) -> bool {
        if !at.is_finite() {
            return false;
        }
        match self.gesture {
            Gesture::Dragging { id, offset } => {
                let area = self.config.clamp_to_print_area.then_some(self.print_area);
                let c = manipulate::drag_center_clamped(at, offset, area.as_ref());
                if !c.is_finite() {
                    return false;
                }
                self.mutate(|s| {
                    let Some(el) = s.get_mut(&id) else {
                        return false;
                    };
                    let changed = el.center() != c;
                    el.x = c.x;
                    el.y = c.y;
                    changed
                })
            }
            Gesture::Resizing { id, corner, origin } => {
                let min = self.config.min_element_size;
                let Some((w, h)) = manipulate::resize_from_center(corner, at, &origin, min) else {
                    return false;
                };
                self.mutate(|s| {
                    let Some(img) = s.get_mut(&id).and_then(DesignElement::as_image_mut) else {
                        return false;
                    };
                    let changed = img.width != w || img.height != h;
                    img.width = w;
                    img.height = h;
                    changed
                })
            }
            Gesture::Rotating { id, center } => {
                let Some(deg) = manipulate::rotation_from_pointer(at, center) else {
                    return false;
                };
                self.mutate(|s| {
                    let Some(el) = s.get_mut(&id) else {
                        return false;
                    };
                    let changed = el.rotation != deg;
                    el.rotation = deg;
                    changed
                })
            }
            Gesture::Idle | Gesture::ApplyingHistory => false,
        }
    }

    /// Finish the active gesture, recording its result as one history snapshot.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn end_gesture(&mut self) -> bool {
        if !self.gesture.is_manipulating() {
            return false;
        }
        let label = self.gesture.label();
        self.gesture = Gesture::Idle;
        let recorded = match self.gesture_baseline.take() {
            Some(pre) if pre == self.state => false,
            Some(pre) => {
                self.history.ensure_baseline(&pre);
                self.history.record(&self.state)
            }
            None => self.history.record(&self.state),
        };
        tracing::debug!(gesture = label, recorded, "gesture ended");
        recorded
    }

    /// Drop the gesture state without recording (used when the design is replaced wholesale).
    fn cancel_gesture(&mut self) {
        if self.gesture.is_manipulating() {
            self.gesture = Gesture::Idle;
        }
        self.gesture_baseline = None;
    }

    // --- History ---

    /// Step back one snapshot. No-op at the baseline or during a gesture.
    pub fn undo(&mut self) -> bool {
        if self.gesture != Gesture::Idle {
            return false;
        }
        let Some(state) = self.history.undo().map(|s| s.state().clone()) else {
            return false;
        };
        self.apply_history(state);
        true
    }

    /// Step forward one snapshot. No-op at the newest snapshot or during a gesture.
    pub fn redo(&mut self) -> bool {
        if self.gesture != Gesture::Idle {
            return false;
        }
        let Some(state) = self.history.redo().map(|s| s.state().clone()) else {
            return false;
        };
        self.apply_history(state);
        true
    }

    /// Write a snapshot's deep copy back into the live design.
    fn apply_history(&mut self, state: DesignState) {
        self.gesture = Gesture::ApplyingHistory;
        self.state = state;
        self.layers.retain_existing(&self.state.elements);
        if let Some(id) = self.ui.selected_id {
            if self.state.get(&id).is_none() {
                self.ui.selected_id = None;
            }
        }
        if let Some(target) = self.replace.target() {
            if self.state.get(&target).is_none() {
                self.replace.exit();
            }
        }
        self.dirty = true;
        self.gesture = Gesture::Idle;
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.gesture == Gesture::Idle && self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.gesture == Gesture::Idle && self.history.can_redo()
    }

    // --- Image replace ---

    /// Enter replace mode for an image.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::NotAnImage`].
    pub fn start_replace(&mut self, id: ElementId) -> Result<(), EditorError> {
        self.end_gesture();
        self.replace.start(&self.state, id)
    }

    /// Show a candidate URL on an image without changing it.
    pub fn set_replace_preview(&mut self, id: ElementId, url: impl Into<String>) -> bool {
        self.replace.set_preview(&self.state, id, url)
    }

    /// Remove the candidate overlay, staying in replace mode.
    pub fn clear_replace_preview(&mut self) -> bool {
        self.replace.clear_preview()
    }

    /// Commit `url` onto `target`, changing only its URL, then leave replace mode.
    ///
    /// # Errors
    ///
    /// [`EditorError::NoReplaceSession`] with no active session, or the
    /// target errors of [`ReplaceMode::start`]. Replace mode stays active on
    /// a bad target.
    pub fn execute_replace(&mut self, url: &str, target: ElementId) -> Result<(), EditorError> {
        self.replace.validate_commit(&self.state, target)?;
        self.try_mutate(|s| replace::apply_url(s, target, url))?;
        self.replace.exit();
        tracing::debug!(%target, "replace committed");
        Ok(())
    }

    /// Leave replace mode without touching the design.
    pub fn cancel_replace(&mut self) -> bool {
        self.replace.exit()
    }

    // --- Viewport ---

    /// Set zoom (clamped to the configured limits) pivoting at the container center.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let zoom = self.config.clamp_zoom(zoom);
        self.viewport.set_zoom(zoom)
    }

    /// Restore `zoom = 1` and `pan = (0, 0)`.
    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    // --- Input events ---

    fn logical(&mut self, client: Point) -> Option<Point> {
        let p = self
            .transform
            .screen_to_logical(client, &self.container, Some(self.viewport.view_transform()))?;
        self.last_pointer = Some(p);
        Some(p)
    }

    fn handle_metrics(&self) -> HandleMetrics {
        let slop = self
            .transform
            .screen_dist_to_logical(self.config.handle_radius_px, &self.container, self.viewport.zoom())
            .unwrap_or(0.0);
        HandleMetrics { slop, rotate_offset: self.config.rotate_handle_offset }
    }

    fn history_action(&self) -> Action {
        Action::HistoryChanged { can_undo: self.can_undo(), can_redo: self.can_redo() }
    }

    fn set_cursor(&mut self, cursor: &'static str, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }

    fn cursor_for(&self, hit: Option<hit::Hit>) -> &'static str {
        match hit {
            None => "default",
            Some(h) if self.layers.is_locked(&h.element_id) => "default",
            Some(h) => match h.part {
                HitPart::Body => "move",
                HitPart::ResizeHandle(Corner::Nw | Corner::Se) => "nwse-resize",
                HitPart::ResizeHandle(Corner::Ne | Corner::Sw) => "nesw-resize",
                HitPart::RotateHandle => "grab",
            },
        }
    }

    pub fn on_pointer_down(&mut self, client: Point, button: Option<Button>, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.gesture == Gesture::ApplyingHistory || self.replace.is_active() {
            return actions;
        }

        if button == Some(Button::Middle) {
            if self.gesture.is_manipulating() || !self.viewport.begin_pan(client) {
                return actions;
            }
            self.set_cursor("grabbing", &mut actions);
            return actions;
        }
        if !is_manipulation_button(button) || self.viewport.is_panning() {
            return actions;
        }
        if self.gesture.is_manipulating() && self.end_gesture() {
            actions.push(self.history_action());
        }

        let Some(p) = self.logical(client) else {
            return actions;
        };
        let before = self.ui.selected_id;
        let hit = hit::hit_test(&self.state, &self.layers, self.ui.selected_id, p, self.handle_metrics());
        match hit {
            None => self.ui.selected_id = None,
            Some(h) => match h.part {
                HitPart::Body => {
                    self.begin_drag(h.element_id, p);
                }
                HitPart::ResizeHandle(corner) => {
                    self.begin_resize(h.element_id, corner);
                }
                HitPart::RotateHandle => {
                    self.begin_rotate(h.element_id);
                }
            },
        }
        if self.ui.selected_id != before {
            actions.push(Action::SelectionChanged(self.ui.selected_id));
        }
        if self.gesture.is_manipulating() {
            let cursor = if matches!(self.gesture, Gesture::Dragging { .. } | Gesture::Rotating { .. }) {
                "grabbing"
            } else {
                self.cursor_for(hit)
            };
            self.set_cursor(cursor, &mut actions);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, client: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.viewport.is_panning() {
            if self.viewport.pan_to(client) {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }

        // A degenerate frame reuses the last known position, which moves nothing.
        let Some(p) = self.logical(client).or(self.last_pointer) else {
            return actions;
        };

        if self.replace.is_active() {
            let before = self.replace.hover();
            if self.replace.update_hover(&self.state, self.layers.hidden(), p) != before {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }

        if self.gesture.is_manipulating() {
            if self.update_gesture(p) {
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }

        let hit = hit::hit_test(&self.state, &self.layers, self.ui.selected_id, p, self.handle_metrics());
        let cursor = self.cursor_for(hit);
        self.set_cursor(cursor, &mut actions);
        actions
    }

    pub fn on_pointer_up(&mut self, _client: Point, _button: Option<Button>, _modifiers: Modifiers) -> Vec<Action> {
        self.release_pointer()
    }

    /// The pointer left the canvas: terminate any pan or gesture exactly as pointer-up would.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.release_pointer()
    }

    fn release_pointer(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let was_panning = self.viewport.end_pan();
        let was_manipulating = self.gesture.is_manipulating();
        if self.end_gesture() {
            actions.push(self.history_action());
        }
        if was_panning || was_manipulating {
            self.set_cursor("default", &mut actions);
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_wheel(&mut self, client: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 || !delta.dy.is_finite() {
            return Vec::new();
        }
        let step = self.config.wheel_zoom_step;
        let factor = if delta.dy < 0.0 { step } else { 1.0 / step };
        let zoom = self.config.clamp_zoom(self.viewport.zoom() * factor);
        if zoom == self.viewport.zoom() {
            return Vec::new();
        }
        if self.viewport.zoom_at(zoom, client, &self.container, self.config.zoom_anchor) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let Some(command) = Command::from_key(key, modifiers) else {
            return Vec::new();
        };
        self.run_command(command)
    }

    /// Execute a keyboard command.
    pub fn run_command(&mut self, command: Command) -> Vec<Action> {
        let mut actions = Vec::new();
        match command {
            Command::Cancel => {
                if self.cancel_replace() {
                    actions.push(Action::ReplaceModeChanged { active: false });
                    actions.push(Action::RenderNeeded);
                } else if self.select(None) {
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
            }
            Command::Undo | Command::Redo => {
                let applied = if command == Command::Undo { self.undo() } else { self.redo() };
                if applied {
                    actions.push(self.history_action());
                    actions.push(Action::SelectionChanged(self.ui.selected_id));
                    actions.push(Action::RenderNeeded);
                }
            }
            Command::Copy => {
                self.copy_selected();
            }
            Command::Paste => {
                if let Some(id) = self.paste() {
                    actions.push(Action::ElementAdded(id));
                    actions.push(Action::SelectionChanged(Some(id)));
                    actions.push(self.history_action());
                    actions.push(Action::RenderNeeded);
                }
            }
            Command::Delete => {
                if let Some(id) = self.ui.selected_id {
                    if self.delete_element(id) {
                        actions.push(Action::ElementRemoved(id));
                        actions.push(Action::SelectionChanged(None));
                        actions.push(self.history_action());
                        actions.push(Action::RenderNeeded);
                    }
                }
            }
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live design. Read-only: all writes go through the engine.
    #[must_use]
    pub fn state(&self) -> &DesignState {
        &self.state
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&DesignElement> {
        self.state.get(id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn layers(&self) -> &LayerSets {
        &self.layers
    }

    #[must_use]
    pub fn replace_mode(&self) -> &ReplaceMode {
        &self.replace
    }

    #[must_use]
    pub fn print_area(&self) -> PrintArea {
        self.print_area
    }

    #[must_use]
    pub fn container(&self) -> ContainerRect {
        self.container
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read-only view for the rendering collaborator.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        build_scene(&SceneInputs {
            state: &self.state,
            layers: &self.layers,
            replace: &self.replace,
            viewport: &self.viewport,
            print_area: self.print_area,
            selected: self.ui.selected_id,
            rotate_handle_offset: self.config.rotate_handle_offset,
        })
    }
}

/// The full editor engine. Wraps `EngineCore` and owns the DOM container element.
pub struct Engine {
    container: HtmlElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given container element.
    #[must_use]
    pub fn new(container: HtmlElement) -> Self {
        Self { container, core: EngineCore::new() }
    }

    /// Create an engine with a configuration supplied as JSON by the host.
    ///
    /// # Errors
    ///
    /// Returns the parse or validation error as a JS string.
    pub fn with_config_json(container: HtmlElement, raw: &str) -> Result<Self, JsValue> {
        let config = EditorConfig::from_json(raw).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let core = EngineCore::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { container, core })
    }

    /// Refresh the container rect from layout; the page may have scrolled or resized.
    fn sync_container(&mut self) {
        let r = self.container.get_bounding_client_rect();
        self.core.set_container(ContainerRect::new(r.x(), r.y(), r.width(), r.height()));
    }

    /// `button` is the DOM `MouseEvent.button` code; touch pointers report no button.
    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64, button: i16, is_touch: bool, modifiers: Modifiers) -> Vec<Action> {
        self.sync_container();
        let button = if is_touch { None } else { Button::from_dom(button) };
        if !is_touch && button.is_none() {
            return Vec::new();
        }
        self.core.on_pointer_down(Point::new(client_x, client_y), button, modifiers)
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64, modifiers: Modifiers) -> Vec<Action> {
        self.sync_container();
        self.core.on_pointer_move(Point::new(client_x, client_y), modifiers)
    }

    pub fn on_pointer_up(&mut self, client_x: f64, client_y: f64, button: i16, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(Point::new(client_x, client_y), Button::from_dom(button), modifiers)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_wheel(&mut self, client_x: f64, client_y: f64, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.sync_container();
        self.core.on_wheel(Point::new(client_x, client_y), delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &str, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(&Key::new(key), modifiers)
    }

    /// Serialized design for the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns the serialization error as a JS string.
    pub fn export_design(&self) -> Result<JsValue, JsValue> {
        self.core
            .export_json()
            .map(|json| JsValue::from_str(&json))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Load a design string supplied by the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns a JS string describing why the design was rejected.
    pub fn load_design(&mut self, raw: &JsValue) -> Result<(), JsValue> {
        let Some(json) = raw.as_string() else {
            return Err(JsValue::from_str("design must be a JSON string"));
        };
        self.core.load_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
