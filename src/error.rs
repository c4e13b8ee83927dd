//! Error types for editor operations that report failure to the caller.
//!
//! Most interactive operations are silent no-ops when they do not apply (an
//! undo at the start of history, a drag on a locked element). The variants
//! here cover the operations that must tell the host why they did nothing.

use crate::doc::ElementId;

/// Error returned by fallible editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// No element with this id is in the design.
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    /// The operation only applies to image elements.
    #[error("element is not an image: {0}")]
    NotAnImage(ElementId),
    /// `execute_replace` was called with no replace session active.
    #[error("no image replace session is active")]
    NoReplaceSession,
    /// A numeric input was NaN or infinite.
    #[error("non-finite value for {field}")]
    NonFinite { field: &'static str },
    /// A size input was zero, negative, or below the configured minimum.
    #[error("invalid size for {field}: {value}")]
    InvalidSize { field: &'static str, value: f64 },
    /// A numeric input lies outside its allowed range.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    /// Two elements in one design share an id.
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    /// The element is locked against manipulation.
    #[error("element is locked: {0}")]
    Locked(ElementId),
    /// A persisted design could not be parsed.
    #[error("failed to parse design: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// The editor configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error returned when validating an [`EditorConfig`](crate::config::EditorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A numeric field must be positive and finite.
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    /// `zoom_min` exceeds `zoom_max`.
    #[error("zoom_min ({min}) must not exceed zoom_max ({max})")]
    ZoomRange { min: f64, max: f64 },
    /// The wheel zoom step must grow the zoom.
    #[error("wheel_zoom_step must be greater than 1, got {0}")]
    WheelStep(f64),
    /// History must keep at least one snapshot.
    #[error("history_cap must be at least 1")]
    HistoryCap,
}
