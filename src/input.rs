//! Input model: pointer buttons, modifier keys, and the gesture state machine.
//!
//! `Button` and `Modifiers` capture the user's intent at the time of a pointer
//! or key event. `Gesture` is the active manipulation tracked between
//! pointer-down and pointer-up, carrying the context needed to compute each
//! frame from the gesture's starting geometry. Only one variant can be active,
//! so a drag can never overlap a resize, and history application is a state of
//! its own rather than an ambient flag.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ElementId;
use crate::manipulate::{Corner, ResizeOrigin};
use crate::transform::Point;

/// Mouse button identifier. Touch input reports no button (`None` at call sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button.
    Primary,
    /// Middle mouse button (scroll wheel click); starts a viewport pan.
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Whether a pointer-down with this button may start a manipulation.
///
/// The primary button does, and so does touch (no button reported).
#[must_use]
pub fn is_manipulation_button(button: Option<Button>) -> bool {
    matches!(button, None | Some(Button::Primary))
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison for single-character keys.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Keyboard command derived from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Copy,
    Paste,
    Undo,
    Redo,
    Delete,
    Cancel,
}

impl Command {
    /// Map a key press to an editor command, if it is one.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        if key.is("Escape") {
            return Some(Self::Cancel);
        }
        if key.is("Delete") || key.is("Backspace") {
            return Some(Self::Delete);
        }
        if !modifiers.command() {
            return None;
        }
        if key.is("z") {
            return Some(if modifiers.shift { Self::Redo } else { Self::Undo });
        }
        if key.is("y") {
            return Some(Self::Redo);
        }
        if key.is("c") {
            return Some(Self::Copy);
        }
        if key.is("v") {
            return Some(Self::Paste);
        }
        None
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
}

/// State of the manipulation state machine.
///
/// Each active variant carries the gesture context needed to compute the next
/// frame and the history entry on release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element.
    Dragging {
        /// Id of the element being dragged.
        id: ElementId,
        /// Pointer minus element center at grab time, in logical units.
        offset: Point,
    },
    /// The user is resizing an image by one of its corner handles.
    Resizing {
        /// Id of the element being resized.
        id: ElementId,
        /// Which corner handle is being dragged.
        corner: Corner,
        /// Geometry at the start of the resize.
        origin: ResizeOrigin,
    },
    /// The user is rotating an element by its rotate handle.
    Rotating {
        /// Id of the element being rotated.
        id: ElementId,
        /// Element center; the rotation pivot.
        center: Point,
    },
    /// The history engine is writing a snapshot back into the design.
    ApplyingHistory,
}

impl Gesture {
    /// Element being manipulated, if any.
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::Rotating { id, .. } => Some(*id),
            Self::Idle | Self::ApplyingHistory => None,
        }
    }

    /// A drag, resize, or rotate is in progress.
    #[must_use]
    pub fn is_manipulating(&self) -> bool {
        self.element_id().is_some()
    }

    /// Short label for logs and cursor selection.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
            Self::Rotating { .. } => "rotating",
            Self::ApplyingHistory => "applying-history",
        }
    }
}
