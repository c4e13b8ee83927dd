#![allow(clippy::float_cmp)]

use super::*;
use crate::config::ZoomAnchor;
use crate::doc::ElementKind;
use crate::viewport::PanState;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

/// Core whose 400px container sits at the page origin, so client pixels equal
/// logical units at zoom 1.
fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_container(ContainerRect::new(0.0, 0.0, 400.0, 400.0));
    core
}

fn core_with(elements: Vec<DesignElement>) -> EngineCore {
    let mut core = core();
    core.load_design(DesignState { elements, ..Default::default() }).unwrap();
    core
}

/// One 100x100 image centered at (200, 200).
fn core_with_image() -> (EngineCore, ElementId) {
    let img = DesignElement::image("a.png", 100.0, 100.0, pt(200.0, 200.0));
    let id = img.id;
    (core_with(vec![img]), id)
}

fn down(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Some(Button::Primary), no_modifiers())
}

fn move_to(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_move(pt(x, y), no_modifiers())
}

fn up(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_up(pt(x, y), Some(Button::Primary), no_modifiers())
}

fn key(core: &mut EngineCore, name: &str, modifiers: Modifiers) -> Vec<Action> {
    core.on_key_down(&Key::new(name), modifiers)
}

fn image_size(core: &EngineCore, id: ElementId) -> (f64, f64) {
    let img = core.element(&id).unwrap().as_image().unwrap();
    (img.width, img.height)
}

fn center(core: &EngineCore, id: ElementId) -> Point {
    core.element(&id).unwrap().center()
}

/// Pointer-derived positions pass through the screen transform, so compare
/// them with a tolerance.
fn assert_near(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

// =============================================================
// Construction and configuration
// =============================================================

#[test]
fn new_core_is_empty_and_clean() {
    let core = EngineCore::new();
    assert!(core.state().elements.is_empty());
    assert_eq!(core.state().background_color, "#ffffff");
    assert!(core.history().is_empty());
    assert!(!core.can_undo());
    assert!(!core.can_redo());
    assert!(!core.is_dirty());
    assert_eq!(core.gesture(), Gesture::Idle);
    assert_eq!(core.selection(), None);
}

#[test]
fn with_config_rejects_inverted_zoom_range() {
    let config = EditorConfig { zoom_min: 5.0, zoom_max: 2.0, ..Default::default() };
    assert!(matches!(EngineCore::with_config(config), Err(EditorError::Config(_))));
}

#[test]
fn with_config_applies_history_cap() {
    let config = EditorConfig { history_cap: 3, ..Default::default() };
    let core = EngineCore::with_config(config).unwrap();
    assert_eq!(core.history().cap(), 3);
}

#[test]
fn default_print_area_covers_logical_space() {
    let core = EngineCore::new();
    assert_eq!(core.print_area(), PrintArea::default());
}

#[test]
fn set_print_area_rejects_non_finite() {
    let mut core = core();
    let good = PrintArea { x: 50.0, y: 50.0, width: 300.0, height: 200.0 };
    assert!(core.set_print_area(good));
    assert!(!core.set_print_area(PrintArea { width: f64::NAN, ..good }));
    assert_eq!(core.print_area(), good);
}

// =============================================================
// Element creation and editing
// =============================================================

#[test]
fn add_text_centers_on_print_area_and_selects() {
    let mut core = core();
    core.set_print_area(PrintArea { x: 100.0, y: 40.0, width: 200.0, height: 100.0 });
    let id = core.add_text("Hello");
    let el = core.element(&id).unwrap();
    assert_eq!(el.center(), pt(200.0, 90.0));
    assert_eq!(el.as_text().unwrap().font_size, 24.0);
    assert_eq!(core.selection(), Some(id));
    assert!(core.is_dirty());
}

#[test]
fn add_image_fits_half_print_area() {
    let mut core = core();
    let wide = core.add_image("wide.png", 2.0).unwrap();
    assert_eq!(image_size(&core, wide), (200.0, 100.0));

    let tall = core.add_image("tall.png", 0.25).unwrap();
    assert_eq!(image_size(&core, tall), (50.0, 200.0));
    assert_eq!(center(&core, tall), pt(200.0, 200.0));
}

#[test]
fn add_image_rejects_bad_ratio() {
    let mut core = core();
    assert!(matches!(core.add_image("x.png", 0.0), Err(EditorError::InvalidSize { .. })));
    assert!(matches!(core.add_image("x.png", f64::NAN), Err(EditorError::InvalidSize { .. })));
    assert!(core.state().elements.is_empty());
}

#[test]
fn first_mutation_records_lazy_baseline() {
    let mut core = core();
    assert!(core.history().is_empty());
    core.add_text("a");
    // Baseline (empty design) plus the added element.
    assert_eq!(core.history().len(), 2);
    assert!(core.history().snapshots().next().unwrap().elements().is_empty());
    assert!(core.can_undo());
}

#[test]
fn update_element_patches_and_records() {
    let (mut core, id) = core_with_image();
    let patch = ElementPatch { opacity: Some(0.5), rotation: Some(-90.0), ..Default::default() };
    assert!(core.update_element(id, &patch).unwrap());
    let el = core.element(&id).unwrap();
    assert_eq!(el.as_image().unwrap().opacity, 0.5);
    assert_eq!(el.rotation, 270.0);
    assert_eq!(core.history().len(), 2);
}

#[test]
fn update_element_unknown_id_errors() {
    let mut core = core();
    let id = uuid::Uuid::new_v4();
    let err = core.update_element(id, &ElementPatch::default()).unwrap_err();
    assert!(matches!(err, EditorError::ElementNotFound(e) if e == id));
}

#[test]
fn update_element_invalid_patch_changes_nothing() {
    let (mut core, id) = core_with_image();
    let before = core.state().clone();
    let patch = ElementPatch { x: Some(10.0), width: Some(f64::INFINITY), ..Default::default() };
    assert!(core.update_element(id, &patch).is_err());
    assert_eq!(core.state(), &before);
    assert!(core.history().is_empty());
}

#[test]
fn locked_element_accepts_style_but_not_geometry() {
    let (mut core, id) = core_with_image();
    core.toggle_locked(id);
    let moved = ElementPatch { x: Some(10.0), ..Default::default() };
    assert!(matches!(core.update_element(id, &moved), Err(EditorError::Locked(_))));
    assert_eq!(center(&core, id), pt(200.0, 200.0));
    let faded = ElementPatch { opacity: Some(0.25), ..Default::default() };
    assert!(core.update_element(id, &faded).unwrap());
}

#[test]
fn move_layer_down_then_up_restores_order() {
    let a = DesignElement::image("a", 10.0, 10.0, pt(10.0, 10.0));
    let b = DesignElement::image("b", 10.0, 10.0, pt(30.0, 30.0));
    let (ida, idb) = (a.id, b.id);
    let mut core = core_with(vec![a, b]);
    assert!(!core.move_layer(idb, LayerMove::Up));
    assert!(core.move_layer(idb, LayerMove::Down));
    assert!(core.move_layer(idb, LayerMove::Up));
    let order: Vec<_> = core.state().elements.iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ida, idb]);
}

#[test]
fn set_background_color_skips_identical_value() {
    let mut core = core();
    assert!(core.set_background_color("#ff0000"));
    assert!(!core.set_background_color("#ff0000"));
    assert_eq!(core.state().background_color, "#ff0000");
    assert_eq!(core.history().len(), 2);
}

#[test]
fn delete_element_forgets_it_everywhere() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    core.toggle_locked(id);
    core.start_replace(id).unwrap();
    assert!(core.delete_element(id));
    assert!(core.element(&id).is_none());
    assert_eq!(core.selection(), None);
    assert!(!core.layers().is_locked(&id));
    assert!(!core.replace_mode().is_active());
    assert!(!core.delete_element(id));
}

#[test]
fn copy_paste_cascades_offset() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    assert!(core.copy_selected());
    let first = core.paste().unwrap();
    let second = core.paste().unwrap();
    assert_ne!(first, id);
    assert_ne!(second, first);
    assert_eq!(center(&core, first), pt(220.0, 220.0));
    assert_eq!(center(&core, second), pt(240.0, 240.0));
    assert_eq!(core.state().elements.last().unwrap().id, second);
    assert_eq!(core.selection(), Some(second));
}

#[test]
fn paste_without_copy_is_noop() {
    let mut core = core();
    assert!(core.paste().is_none());
    assert!(!core.copy_selected());
}

// =============================================================
// Layers
// =============================================================

#[test]
fn move_layer_swaps_and_records() {
    let a = DesignElement::image("a", 10.0, 10.0, pt(10.0, 10.0));
    let b = DesignElement::image("b", 10.0, 10.0, pt(30.0, 30.0));
    let (ida, idb) = (a.id, b.id);
    let mut core = core_with(vec![a, b]);
    assert!(core.move_layer(ida, LayerMove::Up));
    let order: Vec<_> = core.state().elements.iter().map(|e| e.id).collect();
    assert_eq!(order, vec![idb, ida]);
    assert!(!core.move_layer(ida, LayerMove::Up));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn hiding_selected_element_deselects() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    assert_eq!(core.toggle_hidden(id), Some(true));
    assert_eq!(core.selection(), None);
    assert!(!core.select(Some(id)));
    assert_eq!(core.toggle_hidden(id), Some(false));
    assert!(core.select(Some(id)));
}

#[test]
fn toggles_do_not_touch_history() {
    let (mut core, id) = core_with_image();
    core.toggle_hidden(id);
    core.toggle_locked(id);
    assert!(core.history().is_empty());
    assert_eq!(core.toggle_locked(uuid::Uuid::new_v4()), None);
}

#[test]
fn set_hidden_and_set_locked_are_explicit() {
    let (mut core, id) = core_with_image();
    assert!(core.set_hidden(id, true));
    assert!(core.set_hidden(id, true));
    assert!(core.layers().is_hidden(&id));
    assert!(core.set_locked(id, true));
    assert!(core.layers().is_locked(&id));
    assert!(core.set_locked(id, false));
    assert!(!core.layers().is_locked(&id));
    assert!(!core.set_hidden(uuid::Uuid::new_v4(), true));
    assert!(!core.set_locked(uuid::Uuid::new_v4(), true));
}

#[test]
fn undo_prunes_layer_flags_of_removed_element() {
    let mut core = core();
    let id = core.add_image("a.png", 1.0).unwrap();
    core.set_hidden(id, true);
    core.set_locked(id, true);
    assert!(core.undo());
    assert!(core.element(&id).is_none());
    assert!(!core.layers().is_hidden(&id));
    assert!(!core.layers().is_locked(&id));
}

#[test]
fn locking_mid_drag_ends_the_gesture() {
    let (mut core, id) = core_with_image();
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 220.0, 200.0);
    assert!(core.set_locked(id, true));
    assert_eq!(core.gesture(), Gesture::Idle);
    let held = center(&core, id);
    move_to(&mut core, 300.0, 300.0);
    assert_eq!(center(&core, id), held);
}

#[test]
fn hidden_element_is_not_hit() {
    let (mut core, id) = core_with_image();
    core.toggle_hidden(id);
    down(&mut core, 200.0, 200.0);
    assert_eq!(core.selection(), None);
    assert_eq!(core.gesture(), Gesture::Idle);
}

// =============================================================
// Pointer gestures
// =============================================================

#[test]
fn click_selects_and_starts_drag() {
    let (mut core, id) = core_with_image();
    let actions = down(&mut core, 210.0, 210.0);
    assert_eq!(core.selection(), Some(id));
    assert!(matches!(core.gesture(), Gesture::Dragging { .. }));
    assert!(actions.contains(&Action::SelectionChanged(Some(id))));
    assert!(actions.contains(&Action::SetCursor("grabbing".into())));
}

#[test]
fn drag_keeps_grab_offset() {
    let (mut core, id) = core_with_image();
    down(&mut core, 210.0, 210.0);
    move_to(&mut core, 260.0, 230.0);
    assert_near(center(&core, id), pt(250.0, 220.0));
    up(&mut core, 260.0, 230.0);
    assert_eq!(core.gesture(), Gesture::Idle);
}

#[test]
fn drag_is_one_history_entry() {
    let (mut core, id) = core_with_image();
    down(&mut core, 200.0, 200.0);
    for i in 1..=20 {
        move_to(&mut core, 200.0 + f64::from(i), 200.0);
    }
    assert!(core.history().is_empty());
    let actions = up(&mut core, 220.0, 200.0);
    assert_eq!(core.history().len(), 2);
    assert!(actions.contains(&Action::HistoryChanged { can_undo: true, can_redo: false }));

    assert!(core.undo());
    assert_eq!(center(&core, id), pt(200.0, 200.0));
    assert!(core.redo());
    assert_near(center(&core, id), pt(220.0, 200.0));
}

#[test]
fn click_without_move_records_nothing() {
    let (mut core, _) = core_with_image();
    down(&mut core, 200.0, 200.0);
    up(&mut core, 200.0, 200.0);
    assert!(core.history().is_empty());
    assert!(!core.is_dirty());
}

#[test]
fn drag_clamps_to_print_area_when_configured() {
    let config = EditorConfig { clamp_to_print_area: true, ..Default::default() };
    let mut core = EngineCore::with_config(config).unwrap();
    core.set_container(ContainerRect::new(0.0, 0.0, 400.0, 400.0));
    let img = DesignElement::image("a", 100.0, 100.0, pt(200.0, 200.0));
    let id = img.id;
    core.load_design(DesignState { elements: vec![img], ..Default::default() }).unwrap();
    core.set_print_area(PrintArea { x: 100.0, y: 100.0, width: 200.0, height: 200.0 });
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 390.0, 10.0);
    assert_near(center(&core, id), pt(300.0, 100.0));
}

#[test]
fn drag_is_unbounded_by_default() {
    let (mut core, id) = core_with_image();
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 500.0, -50.0);
    assert_near(center(&core, id), pt(500.0, -50.0));
}

#[test]
fn resize_from_corner_handle_keeps_center() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    down(&mut core, 250.0, 250.0);
    assert!(matches!(core.gesture(), Gesture::Resizing { corner: Corner::Se, .. }));
    move_to(&mut core, 300.0, 300.0);
    up(&mut core, 300.0, 300.0);
    assert_eq!(image_size(&core, id), (200.0, 200.0));
    assert_eq!(center(&core, id), pt(200.0, 200.0));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn resize_preserves_aspect_and_floor() {
    let img = DesignElement::image("a", 100.0, 50.0, pt(200.0, 200.0));
    let id = img.id;
    let mut core = core_with(vec![img]);
    assert!(core.begin_resize(id, Corner::Ne));
    core.update_gesture(pt(300.0, 150.0));
    assert_eq!(image_size(&core, id), (200.0, 100.0));
    core.update_gesture(pt(200.0, 200.0));
    assert_eq!(image_size(&core, id), (20.0, 10.0));
    core.end_gesture();
}

#[test]
fn resize_is_refused_for_text() {
    let text = DesignElement::text("hi", pt(200.0, 200.0));
    let id = text.id;
    let mut core = core_with(vec![text]);
    assert!(!core.begin_resize(id, Corner::Se));
    assert_eq!(core.gesture(), Gesture::Idle);
}

#[test]
fn rotate_handle_sets_rotation() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    down(&mut core, 200.0, 130.0);
    assert!(matches!(core.gesture(), Gesture::Rotating { .. }));
    move_to(&mut core, 300.0, 200.0);
    up(&mut core, 300.0, 200.0);
    assert!((core.element(&id).unwrap().rotation - 90.0).abs() < 1e-9);
    assert_eq!(center(&core, id), pt(200.0, 200.0));
}

#[test]
fn locked_element_selects_but_does_not_move() {
    let (mut core, id) = core_with_image();
    core.toggle_locked(id);
    down(&mut core, 200.0, 200.0);
    assert_eq!(core.selection(), Some(id));
    assert_eq!(core.gesture(), Gesture::Idle);
    move_to(&mut core, 300.0, 300.0);
    assert_eq!(center(&core, id), pt(200.0, 200.0));
    assert!(!core.begin_rotate(id));
    assert!(!core.begin_resize(id, Corner::Se));
}

#[test]
fn locked_selection_exposes_no_resize_handle() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    core.set_locked(id, true);
    down(&mut core, 253.0, 253.0);
    assert!(!matches!(core.gesture(), Gesture::Resizing { .. }));
    move_to(&mut core, 300.0, 300.0);
    up(&mut core, 300.0, 300.0);
    assert_eq!(image_size(&core, id), (100.0, 100.0));
    assert!(core.history().is_empty());
}

#[test]
fn empty_click_deselects() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    let actions = down(&mut core, 20.0, 20.0);
    assert_eq!(core.selection(), None);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn secondary_button_is_ignored() {
    let (mut core, _) = core_with_image();
    let actions = core.on_pointer_down(pt(200.0, 200.0), Some(Button::Secondary), no_modifiers());
    assert!(actions.is_empty());
    assert_eq!(core.selection(), None);
    assert_eq!(core.gesture(), Gesture::Idle);
}

#[test]
fn touch_pointer_manipulates() {
    let (mut core, id) = core_with_image();
    core.on_pointer_down(pt(200.0, 200.0), None, no_modifiers());
    assert_eq!(core.selection(), Some(id));
    assert!(core.gesture().is_manipulating());
}

#[test]
fn pointer_leave_ends_gesture_like_pointer_up() {
    let (mut core, id) = core_with_image();
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 240.0, 200.0);
    core.on_pointer_leave();
    assert_eq!(core.gesture(), Gesture::Idle);
    assert_eq!(core.history().len(), 2);
    move_to(&mut core, 300.0, 300.0);
    assert_near(center(&core, id), pt(240.0, 200.0));
}

#[test]
fn degenerate_container_never_writes_nan() {
    let (mut core, id) = core_with_image();
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 220.0, 200.0);
    core.set_container(ContainerRect::new(0.0, 0.0, 0.0, 0.0));
    move_to(&mut core, 400.0, 400.0);
    let c = center(&core, id);
    assert!(c.is_finite());
    assert_near(c, pt(220.0, 200.0));
}

#[test]
fn hover_sets_cursor_once() {
    let (mut core, _) = core_with_image();
    let first = move_to(&mut core, 200.0, 200.0);
    assert_eq!(first, vec![Action::SetCursor("move".into())]);
    assert!(move_to(&mut core, 201.0, 200.0).is_empty());
    assert_eq!(move_to(&mut core, 10.0, 10.0), vec![Action::SetCursor("default".into())]);
}

#[test]
fn zoomed_view_maps_pointer_through_view() {
    let (mut core, id) = core_with_image();
    core.set_zoom(2.0);
    // At zoom 2 around the container center, logical (200, 200) stays at the
    // center and (210, 200) sits 20px to the right of it.
    down(&mut core, 200.0, 200.0);
    move_to(&mut core, 220.0, 200.0);
    up(&mut core, 220.0, 200.0);
    assert_near(center(&core, id), pt(210.0, 200.0));
}

// =============================================================
// History
// =============================================================

#[test]
fn undo_redo_at_bounds_are_noops() {
    let mut core = core();
    assert!(!core.undo());
    assert!(!core.redo());
    core.add_text("a");
    assert!(core.undo());
    assert!(!core.undo());
    assert!(core.state().elements.is_empty());
    assert!(core.redo());
    assert!(!core.redo());
    assert_eq!(core.state().elements.len(), 1);
}

#[test]
fn undo_refused_mid_gesture() {
    let (mut core, _) = core_with_image();
    core.set_background_color("#000000");
    down(&mut core, 200.0, 200.0);
    assert!(!core.can_undo());
    assert!(!core.undo());
    up(&mut core, 200.0, 200.0);
    assert!(core.can_undo());
}

#[test]
fn new_mutation_truncates_redo_branch() {
    let mut core = core();
    core.set_background_color("#111111");
    core.set_background_color("#222222");
    core.undo();
    assert!(core.can_redo());
    core.set_background_color("#333333");
    assert!(!core.can_redo());
    assert_eq!(core.history().len(), 3);
}

#[test]
fn history_is_capped() {
    let mut core = core();
    for i in 0..60 {
        core.set_background_color(format!("#{i:06x}"));
    }
    assert_eq!(core.history().len(), 50);
    let mut undos = 0;
    while core.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    assert_eq!(core.state().background_color, format!("#{:06x}", 10));
}

#[test]
fn undo_clears_selection_of_removed_element() {
    let mut core = core();
    let id = core.add_text("a");
    assert_eq!(core.selection(), Some(id));
    core.undo();
    assert_eq!(core.selection(), None);
}

#[test]
fn undo_exits_replace_when_target_disappears() {
    let mut core = core();
    let id = core.add_image("a.png", 1.0).unwrap();
    core.start_replace(id).unwrap();
    core.undo();
    assert!(!core.replace_mode().is_active());
}

#[test]
fn applying_history_is_never_recorded() {
    let mut core = core();
    core.set_background_color("#111111");
    let len = core.history().len();
    core.undo();
    core.redo();
    core.undo();
    assert_eq!(core.history().len(), len);
}

// =============================================================
// Image replace
// =============================================================

#[test]
fn preview_never_mutates_design() {
    let (mut core, id) = core_with_image();
    core.start_replace(id).unwrap();
    assert!(core.set_replace_preview(id, "b.png"));
    assert_eq!(core.element(&id).unwrap().as_image().unwrap().url, "a.png");
    assert_eq!(core.scene().items[0].display_url, Some("b.png"));
    assert!(core.history().is_empty());
    assert!(core.clear_replace_preview());
    assert_eq!(core.scene().items[0].display_url, Some("a.png"));
}

#[test]
fn execute_replace_changes_only_url() {
    let (mut core, id) = core_with_image();
    core.update_element(id, &ElementPatch { rotation: Some(30.0), ..Default::default() })
        .unwrap();
    let before = core.element(&id).unwrap().clone();
    core.start_replace(id).unwrap();
    core.execute_replace("b.png", id).unwrap();
    let after = core.element(&id).unwrap();
    assert_eq!(after.as_image().unwrap().url, "b.png");
    assert_eq!(after.center(), before.center());
    assert_eq!(after.rotation, before.rotation);
    assert_eq!(after.as_image().unwrap().width, before.as_image().unwrap().width);
    assert!(!core.replace_mode().is_active());
    assert!(core.undo());
    assert_eq!(core.element(&id).unwrap().as_image().unwrap().url, "a.png");
}

#[test]
fn execute_replace_requires_session() {
    let (mut core, id) = core_with_image();
    assert!(matches!(core.execute_replace("b.png", id), Err(EditorError::NoReplaceSession)));
}

#[test]
fn execute_replace_on_text_keeps_session() {
    let text = DesignElement::text("t", pt(50.0, 50.0));
    let img = DesignElement::image("a.png", 10.0, 10.0, pt(200.0, 200.0));
    let (tid, iid) = (text.id, img.id);
    let mut core = core_with(vec![text, img]);
    core.start_replace(iid).unwrap();
    assert!(matches!(core.execute_replace("b.png", tid), Err(EditorError::NotAnImage(_))));
    assert!(core.replace_mode().is_active());
}

#[test]
fn start_replace_rejects_text() {
    let text = DesignElement::text("t", pt(50.0, 50.0));
    let id = text.id;
    let mut core = core_with(vec![text]);
    assert!(matches!(core.start_replace(id), Err(EditorError::NotAnImage(_))));
}

#[test]
fn replace_mode_blocks_manipulation_and_tracks_hover() {
    let (mut core, id) = core_with_image();
    core.start_replace(id).unwrap();
    assert!(down(&mut core, 200.0, 200.0).is_empty());
    assert_eq!(core.gesture(), Gesture::Idle);
    assert_eq!(move_to(&mut core, 200.0, 200.0), vec![Action::RenderNeeded]);
    assert_eq!(core.replace_mode().hover(), Some(id));
    assert_eq!(move_to(&mut core, 10.0, 10.0), vec![Action::RenderNeeded]);
    assert_eq!(core.replace_mode().hover(), None);
}

// =============================================================
// Viewport input
// =============================================================

#[test]
fn middle_button_pans() {
    let mut core = core();
    core.on_pointer_down(pt(100.0, 100.0), Some(Button::Middle), no_modifiers());
    assert!(matches!(core.viewport.pan_state(), PanState::Panning { .. }));
    move_to(&mut core, 130.0, 90.0);
    assert_eq!(core.viewport.pan(), pt(30.0, -10.0));
    core.on_pointer_up(pt(130.0, 90.0), Some(Button::Middle), no_modifiers());
    assert!(!core.viewport.is_panning());
    assert!(core.history().is_empty());
}

#[test]
fn wheel_zooms_toward_cursor_within_limits() {
    let mut core = core();
    let actions = core.on_wheel(pt(300.0, 300.0), WheelDelta { dx: 0.0, dy: -100.0 }, no_modifiers());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!((core.viewport.zoom() - 1.1).abs() < 1e-12);
    // The logical point under the cursor stays put.
    let p = core
        .transform()
        .screen_to_logical(pt(300.0, 300.0), &core.container(), Some(core.viewport.view_transform()))
        .unwrap();
    assert!((p.x - 300.0).abs() < 1e-9 && (p.y - 300.0).abs() < 1e-9);

    for _ in 0..100 {
        core.on_wheel(pt(300.0, 300.0), WheelDelta { dx: 0.0, dy: -100.0 }, no_modifiers());
    }
    assert_eq!(core.viewport.zoom(), 10.0);
    assert!(core.on_wheel(pt(300.0, 300.0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers()).is_empty());
}

#[test]
fn center_anchor_keeps_pan() {
    let config = EditorConfig { zoom_anchor: ZoomAnchor::Center, ..Default::default() };
    let mut core = EngineCore::with_config(config).unwrap();
    core.set_container(ContainerRect::new(0.0, 0.0, 400.0, 400.0));
    core.on_wheel(pt(350.0, 20.0), WheelDelta { dx: 0.0, dy: 50.0 }, no_modifiers());
    assert!((core.viewport.zoom() - 1.0 / 1.1).abs() < 1e-12);
    assert_eq!(core.viewport.pan(), pt(0.0, 0.0));
}

#[test]
fn set_zoom_clamps_and_reset_restores() {
    let mut core = core();
    core.set_zoom(50.0);
    assert_eq!(core.viewport.zoom(), 10.0);
    core.viewport.set_pan(pt(5.0, 5.0));
    core.reset_view();
    assert_eq!(core.viewport.zoom(), 1.0);
    assert_eq!(core.viewport.pan(), pt(0.0, 0.0));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn escape_cancels_replace_before_deselecting() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    core.start_replace(id).unwrap();
    let actions = key(&mut core, "Escape", no_modifiers());
    assert!(actions.contains(&Action::ReplaceModeChanged { active: false }));
    assert_eq!(core.selection(), Some(id));
    key(&mut core, "Escape", no_modifiers());
    assert_eq!(core.selection(), None);
}

#[test]
fn ctrl_z_and_ctrl_y_drive_history() {
    let mut core = core();
    core.set_background_color("#123456");
    key(&mut core, "z", ctrl_modifier());
    assert_eq!(core.state().background_color, "#ffffff");
    key(&mut core, "y", ctrl_modifier());
    assert_eq!(core.state().background_color, "#123456");
    key(&mut core, "Z", Modifiers { meta: true, ..Default::default() });
    let redo = Modifiers { meta: true, shift: true, ..Default::default() };
    key(&mut core, "Z", redo);
    assert_eq!(core.state().background_color, "#123456");
}

#[test]
fn keyboard_copy_paste_delete() {
    let (mut core, id) = core_with_image();
    core.select(Some(id));
    assert!(key(&mut core, "c", ctrl_modifier()).is_empty());
    let actions = key(&mut core, "v", ctrl_modifier());
    let pasted = core.selection().unwrap();
    assert!(actions.contains(&Action::ElementAdded(pasted)));
    assert_eq!(core.state().elements.len(), 2);

    let actions = key(&mut core, "Delete", no_modifiers());
    assert!(actions.contains(&Action::ElementRemoved(pasted)));
    assert_eq!(core.state().elements.len(), 1);
    assert_eq!(core.selection(), None);
}

#[test]
fn plain_letters_are_not_commands() {
    let mut core = core();
    core.set_background_color("#123456");
    assert!(key(&mut core, "z", no_modifiers()).is_empty());
    assert_eq!(core.state().background_color, "#123456");
}

// =============================================================
// Persistence
// =============================================================

#[test]
fn export_then_load_restores_design() {
    let mut core = core();
    let id = core.add_image("a.png", 1.0).unwrap();
    core.add_text("hello");
    core.set_background_color("#abcdef");
    let json = core.export_json().unwrap();

    let mut other = self::core();
    other.load_json(&json).unwrap();
    assert_eq!(other.state(), core.state());
    assert!(matches!(other.element(&id).unwrap().kind, ElementKind::Image(_)));
}

#[test]
fn load_resets_session_state() {
    let mut core = core();
    let id = core.add_image("a.png", 1.0).unwrap();
    core.toggle_hidden(id);
    core.start_replace(id).unwrap();
    let saved = core.export_design();
    core.load_design(saved).unwrap();
    assert!(core.history().is_empty());
    assert!(!core.layers().is_hidden(&id));
    assert!(!core.replace_mode().is_active());
    assert_eq!(core.selection(), None);
    assert!(!core.is_dirty());
}

#[test]
fn load_rejects_invalid_design_and_keeps_current() {
    let mut core = core();
    core.add_text("keep");
    let before = core.state().clone();
    let bad = r##"{"elements":[{"id":"4f8e1c52-3b1a-4c8e-9a43-0c7f2b1d9e10","type":"image","x":0,"y":0,"rotation":0,"width":-5,"height":10,"url":"x","opacity":1}],"backgroundColor":"#fff"}"##;
    assert!(core.load_json(bad).is_err());
    assert!(core.load_json("not json").is_err());
    assert_eq!(core.state(), &before);
}

#[test]
fn load_rejects_duplicate_ids_and_keeps_current() {
    let mut core = core();
    core.add_text("keep");
    let before = core.state().clone();
    let dup = r##"{"elements":[
        {"id":"4f8e1c52-3b1a-4c8e-9a43-0c7f2b1d9e10","type":"image","x":0,"y":0,"rotation":0,"width":5,"height":10,"url":"x","opacity":1},
        {"id":"4f8e1c52-3b1a-4c8e-9a43-0c7f2b1d9e10","type":"image","x":9,"y":9,"rotation":0,"width":5,"height":10,"url":"y","opacity":1}
    ],"backgroundColor":"#fff"}"##;
    assert!(matches!(core.load_json(dup), Err(EditorError::DuplicateId(_))));
    assert_eq!(core.state(), &before);
}

#[test]
fn load_rejects_out_of_range_opacity() {
    let mut core = core();
    let before = core.state().clone();
    let bright = r##"{"elements":[{"id":"4f8e1c52-3b1a-4c8e-9a43-0c7f2b1d9e10","type":"image","x":0,"y":0,"rotation":0,"width":5,"height":10,"url":"x","opacity":7.5}],"backgroundColor":"#fff"}"##;
    assert!(matches!(core.load_json(bright), Err(EditorError::OutOfRange { field: "opacity", .. })));
    assert_eq!(core.state(), &before);
}

#[test]
fn mark_saved_clears_dirty() {
    let mut core = core();
    core.add_text("a");
    assert!(core.is_dirty());
    core.mark_saved();
    assert!(!core.is_dirty());
    core.undo();
    assert!(core.is_dirty());
}

#[test]
fn scene_reflects_selection_handles() {
    let (mut core, id) = core_with_image();
    assert!(core.scene().handles.is_none());
    core.select(Some(id));
    let scene = core.scene();
    let handles = scene.handles.unwrap();
    assert_eq!(handles.element_id, id);
    assert_eq!(handles.corners.len(), 4);
    assert_eq!(scene.css_transform, "translate(0px, 0px) scale(1)");
}
