//! Editor configuration supplied by the host.
//!
//! The host passes a JSON object; missing keys fall back to the defaults in
//! [`crate::consts`]. [`EditorConfig::validate`] rejects values that would let
//! the coordinate math divide by zero or produce degenerate elements.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    HANDLE_RADIUS_PX, HISTORY_CAP, LOGICAL_SIZE, MIN_ELEMENT_SIZE, PASTE_OFFSET, ROTATE_HANDLE_OFFSET,
    WHEEL_ZOOM_STEP, ZOOM_MAX, ZOOM_MIN,
};
use crate::error::ConfigError;

/// Which point stays fixed on screen when the zoom level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAnchor {
    /// Keep the logical point under the pointer fixed.
    #[default]
    Cursor,
    /// Scale around the container center, leaving pan untouched.
    Center,
}

/// Tunable parameters for an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Side length of the square logical design space.
    pub logical_size: f64,
    /// Floor for image width and height, in logical units.
    pub min_element_size: f64,
    /// Maximum number of history snapshots.
    pub history_cap: usize,
    /// Offset applied to pasted copies, in logical units.
    pub paste_offset: f64,
    /// Handle hit slop, in screen pixels.
    pub handle_radius_px: f64,
    /// Distance of the rotate handle above the element, in logical units.
    pub rotate_handle_offset: f64,
    /// Lowest zoom the wheel handler requests.
    pub zoom_min: f64,
    /// Highest zoom the wheel handler requests.
    pub zoom_max: f64,
    /// Zoom factor per wheel notch.
    pub wheel_zoom_step: f64,
    /// Pivot for wheel zoom.
    pub zoom_anchor: ZoomAnchor,
    /// Keep dragged element centers inside the print area.
    pub clamp_to_print_area: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            logical_size: LOGICAL_SIZE,
            min_element_size: MIN_ELEMENT_SIZE,
            history_cap: HISTORY_CAP,
            paste_offset: PASTE_OFFSET,
            handle_radius_px: HANDLE_RADIUS_PX,
            rotate_handle_offset: ROTATE_HANDLE_OFFSET,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            wheel_zoom_step: WHEEL_ZOOM_STEP,
            zoom_anchor: ZoomAnchor::default(),
            clamp_to_print_area: false,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration from host-supplied JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first
    /// validation failure reported by [`EditorConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable by the coordinate and resize math.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("logical_size", self.logical_size)?;
        require_positive("min_element_size", self.min_element_size)?;
        require_positive("handle_radius_px", self.handle_radius_px)?;
        require_positive("zoom_min", self.zoom_min)?;
        require_positive("zoom_max", self.zoom_max)?;
        if !self.paste_offset.is_finite() {
            return Err(ConfigError::NotPositive { field: "paste_offset", value: self.paste_offset });
        }
        if !self.rotate_handle_offset.is_finite() || self.rotate_handle_offset < 0.0 {
            return Err(ConfigError::NotPositive { field: "rotate_handle_offset", value: self.rotate_handle_offset });
        }
        if self.zoom_min > self.zoom_max {
            return Err(ConfigError::ZoomRange { min: self.zoom_min, max: self.zoom_max });
        }
        if !self.wheel_zoom_step.is_finite() || self.wheel_zoom_step <= 1.0 {
            return Err(ConfigError::WheelStep(self.wheel_zoom_step));
        }
        if self.history_cap == 0 {
            return Err(ConfigError::HistoryCap);
        }
        Ok(())
    }

    /// Clamp a requested zoom level to the configured limits.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.zoom_min, self.zoom_max)
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
