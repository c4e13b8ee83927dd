//! Read-only scene view for the rendering collaborator.
//!
//! The host paints from a [`Scene`]: visible elements in paint order, each
//! with the URL it should display (honoring a replace preview), plus the
//! background, print-area clip and viewport transform. Building a scene never
//! mutates application state, and the scene only borrows from it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::doc::{DesignElement, DesignState, ElementId, PrintArea};
use crate::hit;
use crate::layers::LayerSets;
use crate::manipulate::Corner;
use crate::replace::ReplaceMode;
use crate::transform::{Point, ViewTransform};
use crate::viewport::Viewport;

/// One element to paint.
#[derive(Debug, Clone)]
pub struct RenderItem<'a> {
    pub element: &'a DesignElement,
    /// URL to display; differs from the stored URL while a replace preview targets this image.
    pub display_url: Option<&'a str>,
    pub selected: bool,
    pub locked: bool,
    /// The element is the drag-over target of an active replace session.
    pub replace_hover: bool,
}

/// Handle positions for the selected element, in logical units.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionHandles {
    pub element_id: ElementId,
    /// Corner handles; empty for text.
    pub corners: Vec<(Corner, Point)>,
    pub rotate: Point,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub background_color: &'a str,
    pub print_area: PrintArea,
    pub view: ViewTransform,
    /// CSS transform for the design container.
    pub css_transform: String,
    /// Visible elements, bottom to top.
    pub items: Vec<RenderItem<'a>>,
    /// Handles for the selected element, when it is visible and not locked.
    pub handles: Option<SelectionHandles>,
    pub replacing: bool,
}

/// Borrowed inputs for [`build_scene`].
pub struct SceneInputs<'a> {
    pub state: &'a DesignState,
    pub layers: &'a LayerSets,
    pub replace: &'a ReplaceMode,
    pub viewport: &'a Viewport,
    pub print_area: PrintArea,
    pub selected: Option<ElementId>,
    pub rotate_handle_offset: f64,
}

/// Assemble the scene for the current frame.
#[must_use]
pub fn build_scene<'a>(inputs: &SceneInputs<'a>) -> Scene<'a> {
    let hover = inputs.replace.hover();
    let items = inputs
        .state
        .elements
        .iter()
        .filter(|e| !inputs.layers.is_hidden(&e.id))
        .map(|e| RenderItem {
            element: e,
            display_url: inputs.replace.display_url(e),
            selected: inputs.selected == Some(e.id),
            locked: inputs.layers.is_locked(&e.id),
            replace_hover: hover == Some(e.id),
        })
        .collect();

    let handles = inputs
        .selected
        .filter(|id| !inputs.layers.is_hidden(id) && !inputs.layers.is_locked(id))
        .and_then(|id| inputs.state.get(&id))
        .map(|e| selection_handles(e, inputs.rotate_handle_offset));

    Scene {
        background_color: &inputs.state.background_color,
        print_area: inputs.print_area,
        view: inputs.viewport.view_transform(),
        css_transform: inputs.viewport.css_transform(),
        items,
        handles,
        replacing: inputs.replace.is_active(),
    }
}

fn selection_handles(element: &DesignElement, rotate_offset: f64) -> SelectionHandles {
    let corners = if element.is_image() {
        Corner::ALL.iter().map(|&c| (c, hit::corner_position(element, c))).collect()
    } else {
        Vec::new()
    };
    SelectionHandles {
        element_id: element.id,
        corners,
        rotate: hit::rotate_handle_position(element, rotate_offset),
    }
}
