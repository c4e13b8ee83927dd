//! Image replace protocol: non-destructive preview, explicit commit.
//!
//! While a session is active the host may show a candidate URL on any image
//! element. The preview lives here, not in the design: it is a read-time
//! overlay consulted through [`ReplaceMode::display_url`], so cancelling leaves
//! every element untouched. Committing writes only the target's `url`.

#[cfg(test)]
#[path = "replace_test.rs"]
mod replace_test;

use std::collections::HashSet;

use crate::doc::{DesignElement, DesignState, ElementId};
use crate::error::EditorError;
use crate::hit;
use crate::transform::Point;

/// A candidate URL shown in place of an element's stored URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub element_id: ElementId,
    pub url: String,
}

/// Modal image-replace state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplaceMode {
    #[default]
    Inactive,
    Replacing {
        /// Image the session was started on.
        target: ElementId,
        /// Image currently under a drag-over, if any.
        hover: Option<ElementId>,
        /// Read-time URL overlay.
        preview: Option<Preview>,
    },
}

impl ReplaceMode {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Replacing { .. })
    }

    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Replacing { target, .. } => Some(*target),
            Self::Inactive => None,
        }
    }

    #[must_use]
    pub fn hover(&self) -> Option<ElementId> {
        match self {
            Self::Replacing { hover, .. } => *hover,
            Self::Inactive => None,
        }
    }

    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        match self {
            Self::Replacing { preview, .. } => preview.as_ref(),
            Self::Inactive => None,
        }
    }

    /// Enter replace mode for an image element. Restarting on another image
    /// drops the previous preview.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::NotAnImage`].
    pub fn start(&mut self, state: &DesignState, id: ElementId) -> Result<(), EditorError> {
        require_image(state, id)?;
        *self = Self::Replacing { target: id, hover: None, preview: None };
        tracing::debug!(%id, "replace: started");
        Ok(())
    }

    /// Recompute the drag-over target from a logical pointer position.
    ///
    /// Tests every visible image's rotated box, top-most first. Returns the
    /// new hover target; always `None` when inactive.
    pub fn update_hover(&mut self, state: &DesignState, hidden: &HashSet<ElementId>, p: Point) -> Option<ElementId> {
        let Self::Replacing { hover, .. } = self else {
            return None;
        };
        *hover = hit::image_at(state, hidden, p);
        *hover
    }

    /// Show `url` in place of an image's stored URL without mutating it.
    ///
    /// Returns `false` when inactive or when `id` is not an image.
    pub fn set_preview(&mut self, state: &DesignState, id: ElementId, url: impl Into<String>) -> bool {
        if require_image(state, id).is_err() {
            return false;
        }
        let Self::Replacing { preview, .. } = self else {
            return false;
        };
        *preview = Some(Preview { element_id: id, url: url.into() });
        true
    }

    /// Remove the preview overlay, staying in replace mode.
    pub fn clear_preview(&mut self) -> bool {
        match self {
            Self::Replacing { preview, hover, .. } => {
                *hover = None;
                preview.take().is_some()
            }
            Self::Inactive => false,
        }
    }

    /// URL the renderer should show for `element`: the preview if one targets
    /// it, else the stored URL. `None` for text.
    #[must_use]
    pub fn display_url<'a>(&'a self, element: &'a DesignElement) -> Option<&'a str> {
        let stored = element.as_image()?;
        match self.preview() {
            Some(p) if p.element_id == element.id => Some(p.url.as_str()),
            _ => Some(stored.url.as_str()),
        }
    }

    /// Check that a commit onto `target` may proceed.
    ///
    /// # Errors
    ///
    /// [`EditorError::NoReplaceSession`] when inactive, otherwise the
    /// target checks of [`ReplaceMode::start`].
    pub fn validate_commit(&self, state: &DesignState, target: ElementId) -> Result<(), EditorError> {
        if !self.is_active() {
            return Err(EditorError::NoReplaceSession);
        }
        require_image(state, target)
    }

    /// Leave replace mode, dropping any preview. Returns whether a session was active.
    pub fn exit(&mut self) -> bool {
        let was_active = self.is_active();
        *self = Self::Inactive;
        was_active
    }
}

/// Write `url` into the target image, leaving every other property as is.
/// Returns whether the stored URL changed.
///
/// # Errors
///
/// [`EditorError::ElementNotFound`] or [`EditorError::NotAnImage`].
pub fn apply_url(state: &mut DesignState, target: ElementId, url: &str) -> Result<bool, EditorError> {
    let element = state.get_mut(&target).ok_or(EditorError::ElementNotFound(target))?;
    let img = element.as_image_mut().ok_or(EditorError::NotAnImage(target))?;
    if img.url == url {
        return Ok(false);
    }
    url.clone_into(&mut img.url);
    Ok(true)
}

fn require_image(state: &DesignState, id: ElementId) -> Result<(), EditorError> {
    let element = state.get(&id).ok_or(EditorError::ElementNotFound(id))?;
    if element.is_image() { Ok(()) } else { Err(EditorError::NotAnImage(id)) }
}
