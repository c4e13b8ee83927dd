//! Coordinate transform between pointer (screen) space and the logical design space.
//!
//! The container element is displayed with a CSS-style `translate(pan) scale(zoom)`
//! pivoted at its own center. Pointer input arrives in client pixels; elements
//! are stored in a square logical space of `logical_size` units regardless of
//! how many pixels the container occupies. Both directions are pure functions
//! and exact algebraic inverses of each other.
//!
//! Degenerate input (a zero-area container, a non-positive zoom, non-finite
//! coordinates) yields `None` instead of a point, so `NaN` never reaches
//! stored element geometry.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The container's bounding rectangle in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// True when the rect cannot be used to map coordinates.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    /// Pixel center of the container, relative to its own top-left corner.
    #[must_use]
    pub fn local_center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Zoom and pan applied on top of the logical space for display.
///
/// `pan` is in screen pixels and applied after scaling, both pivoted at the
/// container center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::default() }
    }
}

impl ViewTransform {
    fn is_usable(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.pan.is_finite()
    }
}

/// Maps between client pixels and logical units for a fixed logical space size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    logical_size: f64,
}

impl Transform {
    /// Create a transform for a square logical space of `logical_size` units.
    #[must_use]
    pub fn new(logical_size: f64) -> Self {
        Self { logical_size }
    }

    #[must_use]
    pub fn logical_size(&self) -> f64 {
        self.logical_size
    }

    /// Convert a client-space pointer position to logical design coordinates.
    ///
    /// Returns `None` when the container rect, view, or input point is degenerate.
    #[must_use]
    pub fn screen_to_logical(&self, client: Point, rect: &ContainerRect, view: Option<ViewTransform>) -> Option<Point> {
        if rect.is_degenerate() || !client.is_finite() || !self.is_usable() {
            return None;
        }
        let mut rel = Point::new(client.x - rect.left, client.y - rect.top);
        if let Some(view) = view {
            if !view.is_usable() {
                return None;
            }
            let c = rect.local_center();
            rel.x = (rel.x - c.x - view.pan.x) / view.zoom + c.x;
            rel.y = (rel.y - c.y - view.pan.y) / view.zoom + c.y;
        }
        let logical = Point::new(
            rel.x * self.logical_size / rect.width,
            rel.y * self.logical_size / rect.height,
        );
        logical.is_finite().then_some(logical)
    }

    /// Convert logical design coordinates to a client-space position.
    ///
    /// Exact inverse of [`Transform::screen_to_logical`]. Returns `None` under
    /// the same degenerate conditions.
    #[must_use]
    pub fn logical_to_screen(&self, logical: Point, rect: &ContainerRect, view: Option<ViewTransform>) -> Option<Point> {
        if rect.is_degenerate() || !logical.is_finite() || !self.is_usable() {
            return None;
        }
        let mut rel = Point::new(
            logical.x * rect.width / self.logical_size,
            logical.y * rect.height / self.logical_size,
        );
        if let Some(view) = view {
            if !view.is_usable() {
                return None;
            }
            let c = rect.local_center();
            rel.x = (rel.x - c.x) * view.zoom + c.x + view.pan.x;
            rel.y = (rel.y - c.y) * view.zoom + c.y + view.pan.y;
        }
        let client = Point::new(rel.x + rect.left, rel.y + rect.top);
        client.is_finite().then_some(client)
    }

    /// Convert a horizontal screen distance in pixels to logical units.
    #[must_use]
    pub fn screen_dist_to_logical(&self, pixels: f64, rect: &ContainerRect, zoom: f64) -> Option<f64> {
        if rect.is_degenerate() || !(zoom.is_finite() && zoom > 0.0) || !self.is_usable() {
            return None;
        }
        let dist = pixels * self.logical_size / rect.width / zoom;
        dist.is_finite().then_some(dist)
    }

    fn is_usable(&self) -> bool {
        self.logical_size.is_finite() && self.logical_size > 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(crate::consts::LOGICAL_SIZE)
    }
}
