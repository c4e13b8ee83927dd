//! Shared numeric constants for the editor crate.

// ── Design space ────────────────────────────────────────────────

/// Side length of the square logical design space, in logical units.
pub const LOGICAL_SIZE: f64 = 400.0;

/// Smallest width or height an image element may be resized to.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots kept by the history engine.
pub const HISTORY_CAP: usize = 50;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize and rotate handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the element's top edge to the rotate handle, in logical units.
pub const ROTATE_HANDLE_OFFSET: f64 = 20.0;

/// Rotation offset so the rotate handle's rest position (above the element) reads as 0°.
pub const ROTATE_HANDLE_REST_DEG: f64 = 90.0;

// ── Viewport ────────────────────────────────────────────────────

/// Minimum zoom the engine's wheel handler will request.
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom the engine's wheel handler will request.
pub const ZOOM_MAX: f64 = 10.0;

/// Multiplicative zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Editing ─────────────────────────────────────────────────────

/// Offset applied on both axes to a pasted copy, in logical units.
pub const PASTE_OFFSET: f64 = 20.0;

/// Default font size for new text elements.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Approximate glyph advance as a fraction of font size, for text extents.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

/// Line height as a multiple of font size, for text extents.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

/// Fraction of the print area a newly added image occupies along its larger side.
pub const NEW_IMAGE_FILL: f64 = 0.5;
