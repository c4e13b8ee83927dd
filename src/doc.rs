//! Document model: design elements, their properties, and the persisted design state.
//!
//! This module defines what is placed on the product (`DesignElement`,
//! `ElementKind`), a sparse-update type for property edits (`ElementPatch`),
//! the externally supplied `PrintArea`, and the shared mutable resource of an
//! editor session (`DesignState`). `DesignState` is also the shape exchanged
//! with the persistence collaborator.
//!
//! All positions and sizes are in the logical design space. `x`/`y` are the
//! element center.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_FONT_SIZE, LOGICAL_SIZE, TEXT_ADVANCE_RATIO, TEXT_LINE_HEIGHT};
use crate::error::EditorError;
use crate::manipulate::normalize_degrees;
use crate::transform::Point;

/// Unique identifier for a design element. Assigned at creation, never reused.
pub type ElementId = Uuid;

/// Properties of an image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
    /// Opaque image reference; replaced by the image-swap workflow.
    pub url: String,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Properties of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub content: String,
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            color: "#000000".into(),
            font_family: "Arial".into(),
            font_weight: "normal".into(),
            font_style: "normal".into(),
        }
    }
}

/// Variant data for a design element, tagged as `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
}

/// A unit placed in the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub id: ElementId,
    /// Center x in logical units.
    pub x: f64,
    /// Center y in logical units.
    pub y: f64,
    /// Clockwise rotation in degrees. May be stored unnormalized; read through
    /// [`DesignElement::rotation_deg`].
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl DesignElement {
    /// Create a text element centered at `at`.
    #[must_use]
    pub fn text(content: impl Into<String>, at: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            rotation: 0.0,
            kind: ElementKind::Text(TextProps { content: content.into(), ..TextProps::default() }),
        }
    }

    /// Create a fully opaque image element centered at `at`.
    #[must_use]
    pub fn image(url: impl Into<String>, width: f64, height: f64, at: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            rotation: 0.0,
            kind: ElementKind::Image(ImageProps { width, height, url: url.into(), opacity: 1.0 }),
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Rotation normalized to `[0, 360)`.
    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        normalize_degrees(self.rotation)
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image(_))
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&ImageProps> {
        match &self.kind {
            ElementKind::Image(img) => Some(img),
            ElementKind::Text(_) => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageProps> {
        match &mut self.kind {
            ElementKind::Image(img) => Some(img),
            ElementKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            ElementKind::Image(_) => None,
        }
    }

    /// Unrotated `(width, height)` of the element's box.
    ///
    /// Text boxes are estimated from font size and the longest line, since
    /// text is sized through its font rather than handles.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        match &self.kind {
            ElementKind::Image(img) => (img.width, img.height),
            ElementKind::Text(text) => {
                let lines = text.content.lines().count().max(1);
                let longest = text.content.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
                #[allow(clippy::cast_precision_loss)]
                let (cols, rows) = (longest as f64, lines as f64);
                (cols * text.font_size * TEXT_ADVANCE_RATIO, rows * text.font_size * TEXT_LINE_HEIGHT)
            }
        }
    }

    /// Deep copy with a fresh id, shifted by `offset` on both axes.
    #[must_use]
    pub fn duplicate(&self, offset: f64) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.x += offset;
        copy.y += offset;
        copy
    }

    /// Check the structural invariants a stored element must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NonFinite`] for NaN or infinite numbers,
    /// [`EditorError::InvalidSize`] for non-positive image sizes or font sizes,
    /// and [`EditorError::OutOfRange`] for opacity outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), EditorError> {
        require_finite("x", self.x)?;
        require_finite("y", self.y)?;
        require_finite("rotation", self.rotation)?;
        match &self.kind {
            ElementKind::Image(img) => {
                require_positive("width", img.width)?;
                require_positive("height", img.height)?;
                require_finite("opacity", img.opacity)?;
                if !(0.0..=1.0).contains(&img.opacity) {
                    return Err(EditorError::OutOfRange { field: "opacity", value: img.opacity });
                }
            }
            ElementKind::Text(text) => require_positive("fontSize", text.font_size)?,
        }
        Ok(())
    }
}

/// Sparse update for a design element. Only present fields are applied;
/// fields that do not apply to the element's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
}

impl ElementPatch {
    /// Validate then apply the patch. Returns whether the element changed.
    ///
    /// Nothing is applied when any field is invalid.
    ///
    /// # Errors
    ///
    /// [`EditorError::NonFinite`] for NaN or infinite numbers,
    /// [`EditorError::InvalidSize`] for sizes below `min_size` or a
    /// non-positive font size.
    pub fn apply(&self, element: &mut DesignElement, min_size: f64) -> Result<bool, EditorError> {
        self.validate(min_size)?;
        let before = element.clone();
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(r) = self.rotation {
            element.rotation = normalize_degrees(r);
        }
        match &mut element.kind {
            ElementKind::Image(img) => {
                if let Some(w) = self.width {
                    img.width = w;
                }
                if let Some(h) = self.height {
                    img.height = h;
                }
                if let Some(o) = self.opacity {
                    img.opacity = o.clamp(0.0, 1.0);
                }
            }
            ElementKind::Text(text) => {
                if let Some(ref content) = self.content {
                    text.content.clone_from(content);
                }
                if let Some(size) = self.font_size {
                    text.font_size = size;
                }
                if let Some(ref color) = self.color {
                    text.color.clone_from(color);
                }
                if let Some(ref family) = self.font_family {
                    text.font_family.clone_from(family);
                }
                if let Some(ref weight) = self.font_weight {
                    text.font_weight.clone_from(weight);
                }
                if let Some(ref style) = self.font_style {
                    text.font_style.clone_from(style);
                }
            }
        }
        Ok(*element != before)
    }

    /// Whether the patch moves, rotates, or resizes the element.
    #[must_use]
    pub fn touches_geometry(&self) -> bool {
        [self.x, self.y, self.rotation, self.width, self.height].iter().any(Option::is_some)
    }

    fn validate(&self, min_size: f64) -> Result<(), EditorError> {
        for (field, value) in [("x", self.x), ("y", self.y), ("rotation", self.rotation), ("opacity", self.opacity)] {
            if let Some(v) = value {
                require_finite(field, v)?;
            }
        }
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                require_finite(field, v)?;
                if v < min_size {
                    return Err(EditorError::InvalidSize { field, value: v });
                }
            }
        }
        if let Some(size) = self.font_size {
            require_positive("fontSize", size)?;
        }
        Ok(())
    }
}

/// Externally supplied rectangle that elements are visually clipped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    /// Left edge in logical units.
    pub x: f64,
    /// Top edge in logical units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for PrintArea {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: LOGICAL_SIZE, height: LOGICAL_SIZE }
    }
}

impl PrintArea {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Clamp `p` into the rectangle.
    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        let right = self.x + self.width.max(0.0);
        let bottom = self.y + self.height.max(0.0);
        Point::new(p.x.clamp(self.x, right), p.y.clamp(self.y, bottom))
    }
}

/// The full editable design: element list in paint order plus background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignState {
    /// Elements bottom to top.
    pub elements: Vec<DesignElement>,
    /// Product background color as a CSS color string.
    pub background_color: String,
}

impl Default for DesignState {
    fn default() -> Self {
        Self { elements: Vec::new(), background_color: "#ffffff".into() }
    }
}

impl DesignState {
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&DesignElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Paint-order index of an element.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Remove an element, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<DesignElement> {
        let idx = self.index_of(id)?;
        Some(self.elements.remove(idx))
    }

    /// Validate every element and check that ids are unique.
    ///
    /// # Errors
    ///
    /// Returns the first element failure found, or
    /// [`EditorError::DuplicateId`] for a repeated id.
    pub fn validate(&self) -> Result<(), EditorError> {
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            element.validate()?;
            if !seen.insert(element.id) {
                return Err(EditorError::DuplicateId(element.id));
            }
        }
        Ok(())
    }

    /// Serialize for the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Deserialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a design supplied by the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first invalid element.
    pub fn from_json(raw: &str) -> Result<Self, EditorError> {
        let state: Self = serde_json::from_str(raw)?;
        state.validate()?;
        Ok(state)
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), EditorError> {
    if value.is_finite() { Ok(()) } else { Err(EditorError::NonFinite { field }) }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), EditorError> {
    require_finite(field, value)?;
    if value > 0.0 { Ok(()) } else { Err(EditorError::InvalidSize { field, value }) }
}
