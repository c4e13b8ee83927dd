//! Viewport controller: zoom level, pan offset, and the panning interaction mode.
//!
//! The controller enforces no zoom bounds; callers clamp requested levels
//! (the engine's wheel handler uses [`EditorConfig::clamp_zoom`](crate::config::EditorConfig::clamp_zoom)).
//! Non-positive or non-finite zoom requests are ignored since they would make
//! the transform non-invertible.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::config::ZoomAnchor;
use crate::transform::{ContainerRect, Point, ViewTransform};

/// Whether a pan gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    /// No pan in progress.
    #[default]
    Idle,
    /// The user is dragging the view.
    Panning {
        /// Client-space position of the previous pointer event, used to compute the pan delta.
        last_screen: Point,
    },
}

/// Zoom/pan state for the design canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    pan_state: PanState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::default(), pan_state: PanState::Idle }
    }
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pan offset in screen pixels.
    #[must_use]
    pub fn pan(&self) -> Point {
        self.pan
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self.pan_state, PanState::Panning { .. })
    }

    #[must_use]
    pub fn pan_state(&self) -> PanState {
        self.pan_state
    }

    /// Parameters for [`crate::transform::Transform`].
    #[must_use]
    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform { zoom: self.zoom, pan: self.pan }
    }

    /// CSS transform for the container, to be applied with `transform-origin: center`.
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.pan.x, self.pan.y, self.zoom)
    }

    /// Set the zoom level without moving the pan offset (pivot at the container center).
    ///
    /// Returns `false` and leaves the zoom unchanged for non-positive or non-finite input.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Change zoom so that the content under `client` stays under `client`.
    ///
    /// With [`ZoomAnchor::Center`] this is [`Viewport::set_zoom`]. With
    /// [`ZoomAnchor::Cursor`] the pan is recomputed from the pre-zoom point.
    pub fn zoom_at(&mut self, zoom: f64, client: Point, rect: &ContainerRect, anchor: ZoomAnchor) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            return false;
        }
        if anchor == ZoomAnchor::Center || rect.is_degenerate() || !client.is_finite() {
            return self.set_zoom(zoom);
        }
        let c = rect.local_center();
        let rx = client.x - rect.left;
        let ry = client.y - rect.top;
        // Unscaled container-relative point under the pointer.
        let qx = (rx - c.x - self.pan.x) / self.zoom + c.x;
        let qy = (ry - c.y - self.pan.y) / self.zoom + c.y;
        let pan = Point::new(rx - c.x - (qx - c.x) * zoom, ry - c.y - (qy - c.y) * zoom);
        if !pan.is_finite() {
            return false;
        }
        self.zoom = zoom;
        self.pan = pan;
        true
    }

    /// Set the pan offset directly.
    pub fn set_pan(&mut self, pan: Point) -> bool {
        if !pan.is_finite() {
            return false;
        }
        self.pan = pan;
        true
    }

    /// Enter panning mode at `client`.
    pub fn begin_pan(&mut self, client: Point) -> bool {
        if !client.is_finite() {
            return false;
        }
        self.pan_state = PanState::Panning { last_screen: client };
        true
    }

    /// Apply the pointer delta since the previous event. No-op when not panning.
    pub fn pan_to(&mut self, client: Point) -> bool {
        let PanState::Panning { last_screen } = self.pan_state else {
            return false;
        };
        if !client.is_finite() {
            return false;
        }
        self.pan.x += client.x - last_screen.x;
        self.pan.y += client.y - last_screen.y;
        self.pan_state = PanState::Panning { last_screen: client };
        true
    }

    /// Leave panning mode. Returns whether a pan was in progress.
    pub fn end_pan(&mut self) -> bool {
        let was_panning = self.is_panning();
        self.pan_state = PanState::Idle;
        was_panning
    }

    /// Restore `zoom = 1` and `pan = (0, 0)`, ending any pan in progress.
    pub fn reset_view(&mut self) {
        *self = Self::default();
    }
}
