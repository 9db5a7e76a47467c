use indexmap::IndexMap;

/// A detached element description: tag, attributes, classes, inline style
/// and text. Inserted into a [`Document`](super::Document) to become part of
/// the rendered tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub classes: Vec<String>,
    pub style: IndexMap<String, String>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn with_id(
        self,
        id: impl Into<String>,
    ) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_attr(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_class(
        mut self,
        class: impl Into<String>,
    ) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_style(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_text(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn add_class(
        &mut self,
        class: impl Into<String>,
    ) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(
        &self,
        class: &str,
    ) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }

    pub fn attr(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub(crate) fn is_void(&self) -> bool {
        matches!(self.tag.as_str(), "hr" | "img" | "br" | "input")
    }
}
