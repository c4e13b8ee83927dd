//! Element manipulation math: move, aspect-preserving resize, and rotate.
//!
//! Everything here works in logical design coordinates produced by
//! [`crate::transform`]. The functions are pure; the engine owns the gesture
//! state and writes the results back into the design.

#[cfg(test)]
#[path = "manipulate_test.rs"]
mod manipulate_test;

use crate::consts::ROTATE_HANDLE_REST_DEG;
use crate::doc::PrintArea;
use crate::transform::Point;

/// Corner handle used for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// Unit direction of this corner from the element center, in the unrotated frame.
    #[must_use]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Self::Nw => (-1.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::Sw => (-1.0, 1.0),
            Self::Se => (1.0, 1.0),
        }
    }

    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];
}

/// Geometry captured when a resize begins. The resize always derives from
/// this, never from the previous pointer-move, so errors do not accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOrigin {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl ResizeOrigin {
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Offset from the element center to the grab point, recorded at drag start.
#[must_use]
pub fn drag_offset(pointer: Point, center: Point) -> Point {
    Point::new(pointer.x - center.x, pointer.y - center.y)
}

/// New element center for a drag: pointer minus the grab offset.
#[must_use]
pub fn drag_center(pointer: Point, offset: Point) -> Point {
    Point::new(pointer.x - offset.x, pointer.y - offset.y)
}

/// Drag center, optionally kept inside the print area.
#[must_use]
pub fn drag_center_clamped(pointer: Point, offset: Point, area: Option<&PrintArea>) -> Point {
    let center = drag_center(pointer, offset);
    match area {
        Some(area) => area.clamp(center),
        None => center,
    }
}

/// Aspect-preserving resize about the original center.
///
/// The pointer's distance from the original center, sign-adjusted toward the
/// dragged corner, picks a dominant axis: horizontal when
/// `|dx| > |dy| * aspect`, vertical otherwise. The dominant size is twice that
/// distance and the other dimension follows from the aspect ratio. If either
/// dimension would fall below `min_size` both are scaled up together, so the
/// ratio survives the floor.
///
/// Returns `None` for a degenerate origin (non-positive or non-finite size).
#[must_use]
pub fn resize_from_center(corner: Corner, pointer: Point, origin: &ResizeOrigin, min_size: f64) -> Option<(f64, f64)> {
    if !(origin.width.is_finite() && origin.height.is_finite() && origin.width > 0.0 && origin.height > 0.0) {
        return None;
    }
    if !pointer.is_finite() {
        return None;
    }
    let aspect = origin.aspect_ratio();
    let (sx, sy) = corner.signs();
    let dx = (pointer.x - origin.center.x) * sx;
    let dy = (pointer.y - origin.center.y) * sy;

    let (mut width, mut height) = if dx.abs() > dy.abs() * aspect {
        let w = (dx.abs() * 2.0).max(min_size);
        (w, w / aspect)
    } else {
        let h = (dy.abs() * 2.0).max(min_size);
        (h * aspect, h)
    };

    let smaller = width.min(height);
    if smaller < min_size {
        let scale = min_size / smaller;
        width *= scale;
        height *= scale;
    }
    Some((width, height))
}

/// Rotation in degrees for a pointer around `center`.
///
/// `atan2` angle plus a fixed offset so a pointer straight above the center
/// reads as 0°. The result is normalized to `[0, 360)`.
#[must_use]
pub fn rotation_from_pointer(pointer: Point, center: Point) -> Option<f64> {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    let angle = dy.atan2(dx).to_degrees() + ROTATE_HANDLE_REST_DEG;
    angle.is_finite().then(|| normalize_degrees(angle))
}

/// Normalize an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// Rotate `p` around `center` by `deg` degrees (clockwise in screen space).
#[must_use]
pub fn rotate_point(p: Point, center: Point, deg: f64) -> Point {
    let (sin, cos) = deg.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}
