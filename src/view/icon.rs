use std::sync::Arc;

use crate::{TypeDictionary, dom::Element};

/// Class of the container holding a pipe's icon.
pub const TYPE_WINDOW_CLASS: &str = "typeWindow";
/// Class of icon images.
pub const TYPE_IMAGE_CLASS: &str = "typeImage";

/// Turns types and activity identifiers into icon elements.
#[derive(Debug, Clone)]
pub struct IconRenderer {
    icons: Arc<TypeDictionary>,
    activity_template: String,
}

impl IconRenderer {
    pub fn new(
        icons: Arc<TypeDictionary>,
        activity_template: impl Into<String>,
    ) -> Self {
        Self {
            icons,
            activity_template: activity_template.into(),
        }
    }

    /// Icon registered for `pipe_type` in the diagram dictionary.
    pub fn type_icon(
        &self,
        pipe_type: Option<&str>,
    ) -> Option<Element> {
        let pipe_type = pipe_type?;
        let src = self.icons.get(pipe_type)?;
        Some(Element::new("img").with_class(TYPE_IMAGE_CLASS).with_attr("src", src.as_str()).with_attr("alt", pipe_type))
    }

    pub fn activity_icon(
        &self,
        activity: &str,
    ) -> Element {
        Element::new("img")
            .with_class(TYPE_IMAGE_CLASS)
            .with_attr("src", self.activity_template.replace("{}", activity))
            .with_attr("alt", activity)
    }
}
