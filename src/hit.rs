#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::HashSet;

use crate::doc::{DesignElement, DesignState, ElementId};
use crate::layers::LayerSets;
use crate::manipulate::{Corner, rotate_point};
use crate::transform::Point;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Corner),
    RotateHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Handle geometry in logical units, already adjusted for the current zoom.
#[derive(Debug, Clone, Copy)]
pub struct HandleMetrics {
    /// Hit radius around each handle.
    pub slop: f64,
    /// Distance of the rotate handle above the element's top edge.
    pub rotate_offset: f64,
}

/// Whether `p` lies inside the element's rotated box.
///
/// The pointer is inverse-rotated into the element's local frame and compared
/// against the half extents.
#[must_use]
pub fn contains(element: &DesignElement, p: Point) -> bool {
    let local = rotate_point(p, element.center(), -element.rotation);
    let (w, h) = element.size();
    (local.x - element.x).abs() <= w * 0.5 && (local.y - element.y).abs() <= h * 0.5
}

/// Logical position of a corner handle, rotated with the element.
#[must_use]
pub fn corner_position(element: &DesignElement, corner: Corner) -> Point {
    let (w, h) = element.size();
    let (sx, sy) = corner.signs();
    let unrotated = Point::new(element.x + sx * w * 0.5, element.y + sy * h * 0.5);
    rotate_point(unrotated, element.center(), element.rotation)
}

/// Logical position of the rotate handle, `offset` above the top edge, rotated with the element.
#[must_use]
pub fn rotate_handle_position(element: &DesignElement, offset: f64) -> Point {
    let (_, h) = element.size();
    let unrotated = Point::new(element.x, element.y - h * 0.5 - offset);
    rotate_point(unrotated, element.center(), element.rotation)
}

fn within(a: Point, b: Point, radius: f64) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy <= radius * radius
}

/// Test which handle of `element` (if any) is under `p`.
///
/// Corner handles exist only on images; text is sized through its font.
#[must_use]
pub fn hit_handle(element: &DesignElement, p: Point, metrics: HandleMetrics) -> Option<HitPart> {
    if within(p, rotate_handle_position(element, metrics.rotate_offset), metrics.slop) {
        return Some(HitPart::RotateHandle);
    }
    if element.is_image() {
        for corner in Corner::ALL {
            if within(p, corner_position(element, corner), metrics.slop) {
                return Some(HitPart::ResizeHandle(corner));
            }
        }
    }
    None
}

/// Test which element (if any) is under `p`, checking the selected element's handles first.
///
/// Bodies are tested top-most first. Hidden elements are skipped entirely, and
/// a locked selection shows no handles, so its handle area is not hit either.
#[must_use]
pub fn hit_test(
    state: &DesignState,
    layers: &LayerSets,
    selected: Option<ElementId>,
    p: Point,
    metrics: HandleMetrics,
) -> Option<Hit> {
    if let Some(sel) = selected.filter(|id| !layers.is_hidden(id) && !layers.is_locked(id)) {
        if let Some(element) = state.get(&sel) {
            if let Some(part) = hit_handle(element, p, metrics) {
                return Some(Hit { element_id: sel, part });
            }
        }
    }
    state
        .elements
        .iter()
        .rev()
        .filter(|e| !layers.is_hidden(&e.id))
        .find(|e| contains(e, p))
        .map(|e| Hit { element_id: e.id, part: HitPart::Body })
}

/// Top-most visible image whose rotated box contains `p`.
#[must_use]
pub fn image_at(state: &DesignState, hidden: &HashSet<ElementId>, p: Point) -> Option<ElementId> {
    state
        .elements
        .iter()
        .rev()
        .filter(|e| e.is_image() && !hidden.contains(&e.id))
        .find(|e| contains(e, p))
        .map(|e| e.id)
}
