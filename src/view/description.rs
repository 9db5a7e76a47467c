use crate::{
    Position, Result,
    dom::{Document, Element, ElementId},
};

pub fn description_dom_id(window_id: u64) -> String {
    format!("description{}", window_id)
}

/// Text bubble shown above a pipe and connected to it.
pub struct DescriptionView {
    offset_y: f64,
}

impl DescriptionView {
    pub fn new(offset_y: f64) -> Self {
        Self {
            offset_y,
        }
    }

    /// Add the bubble of pipe `window_id` to `parent`.
    pub fn attach(
        &self,
        document: &Document,
        parent: ElementId,
        window_id: u64,
        text: &str,
        position: Position,
    ) -> Result<ElementId> {
        let bubble = Element::div()
            .with_id(description_dom_id(window_id))
            .with_class("description")
            .with_style("left", format!("{}px", position.x))
            .with_style("top", format!("{}px", position.y - self.offset_y))
            .with_text(text);
        document.create_in(parent, bubble)
    }
}
