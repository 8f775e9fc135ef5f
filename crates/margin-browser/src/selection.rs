//! DOM implementation of the selection provider.
//!
//! Offsets are measured the way the rendered text is: a range from the start
//! of the container to the boundary, stringified, counted in UTF-16 units.
//! Markup inside the container (highlight `<mark>`s, note indicators) does
//! not affect the count.

use margin_core::{
    BoundaryPoint, ContainerText, PlatformError, RawSelection, Rect, SelectionProvider,
};
use wasm_bindgen::JsValue;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// Reads the window selection relative to one container element.
pub struct DomSelectionProvider {
    container: web_sys::Element,
}

impl DomSelectionProvider {
    pub fn new(container: web_sys::Element) -> Self {
        Self { container }
    }

    /// Look up the container by element id.
    pub fn by_id(id: &str) -> Result<Self, PlatformError> {
        let document = document()?;
        let container = document
            .get_element_by_id(id)
            .ok_or_else(|| PlatformError(format!("no element with id {id:?}")))?;
        Ok(Self::new(container))
    }

    pub fn container(&self) -> &web_sys::Element {
        &self.container
    }

    fn text_runs(&self, document: &web_sys::Document) -> Result<Vec<String>, PlatformError> {
        let walker = document
            .create_tree_walker_with_what_to_show(&self.container, SHOW_TEXT)
            .map_err(js_err)?;
        let mut runs = Vec::new();
        while let Some(node) = walker.next_node().map_err(js_err)? {
            runs.push(node.node_value().unwrap_or_default());
        }
        Ok(runs)
    }

    /// UTF-16 offset of a DOM boundary from the start of the container, or
    /// `None` if the boundary lies outside it.
    fn boundary_offset(
        &self,
        document: &web_sys::Document,
        node: &web_sys::Node,
        offset: u32,
    ) -> Option<usize> {
        if !self.container.contains(Some(node)) {
            return None;
        }
        let range = document.create_range().ok()?;
        range.select_node_contents(&self.container).ok()?;
        range.set_end(node, offset).ok()?;
        Some(range.to_string().length() as usize)
    }
}

impl SelectionProvider for DomSelectionProvider {
    fn container_text(&self) -> Result<ContainerText, PlatformError> {
        let document = document()?;
        Ok(ContainerText::from_runs(self.text_runs(&document)?))
    }

    fn read_selection(&self, container: &ContainerText) -> Option<RawSelection> {
        let selection = web_sys::window()?.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let document = document().ok()?;

        let point = |node: Option<web_sys::Node>, offset: u32| -> Option<BoundaryPoint> {
            let absolute = self.boundary_offset(&document, &node?, offset)?;
            container.point_at(absolute)
        };
        let anchor = point(selection.anchor_node(), selection.anchor_offset());
        let focus = point(selection.focus_node(), selection.focus_offset());

        let bounding_rect = selection.get_range_at(0).ok().map(|range| {
            let r = range.get_bounding_client_rect();
            Rect::new(r.x(), r.y(), r.width(), r.height())
        });

        tracing::trace!(?anchor, ?focus, "selection read");
        Some(RawSelection {
            anchor,
            focus,
            bounding_rect,
        })
    }

    fn clear_selection(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Ok(Some(selection)) = window.get_selection() {
            if let Err(e) = selection.remove_all_ranges() {
                tracing::warn!("failed to clear selection: {:?}", e);
            }
        }
    }
}

fn document() -> Result<web_sys::Document, PlatformError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PlatformError::from("no document"))
}

fn js_err(e: JsValue) -> PlatformError {
    PlatformError(format!("{e:?}"))
}
