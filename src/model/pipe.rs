use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type tag of terminal nodes.
pub const EXIT_TYPE: &str = "Exit";
/// Type tag of nodes following the receiver naming convention.
pub const RECEIVER_TYPE: &str = "Receiver";

/// Placement of a node on the canvas, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x,
            y,
        }
    }
}

/// Caller supplied inputs of a pipe view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeSpec {
    pub name: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub is_exit: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl PipeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn position(
        mut self,
        x: f64,
        y: f64,
    ) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    pub fn extra(
        mut self,
        extra: impl Into<String>,
    ) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn exit(
        mut self,
        is_exit: bool,
    ) -> Self {
        self.is_exit = is_exit;
        self
    }

    pub fn description(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Identity and classification of one diagram node.
///
/// `pipe_type` is seeded from the diagram's name to type dictionary, written
/// by classification and possibly rewritten once by async resolution.
/// `attributes` belongs to whoever fills it (usually a `GetPipeAttributes`
/// listener); views only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub extra: String,
    pub is_exit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub pipe_type: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// activity identifier chosen by the last icon patch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl PipeModel {
    pub fn new(
        spec: PipeSpec,
        pipe_type: Option<String>,
    ) -> Self {
        Self {
            name: spec.name,
            position: spec.position,
            extra: spec.extra,
            is_exit: spec.is_exit,
            description: spec.description,
            pipe_type,
            attributes: IndexMap::new(),
            activity: None,
        }
    }

    /// Description text, if there is any to show.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = PipeSpec::new("Logger").position(10.0, 20.0).extra("file").description("writes lines");
        assert_eq!(spec.name, "Logger");
        assert_eq!(spec.position, Some(Position::new(10.0, 20.0)));
        assert_eq!(spec.extra, "file");
        assert!(!spec.is_exit);
        assert_eq!(spec.description.as_deref(), Some("writes lines"));
    }

    #[test]
    fn test_model_from_pipe_spec() {
        let model = PipeModel::new(PipeSpec::new("Logger").exit(true), Some("FileWrite".to_string()));
        assert!(model.is_exit);
        assert_eq!(model.pipe_type.as_deref(), Some("FileWrite"));
        assert!(model.attributes.is_empty());
        assert!(model.activity.is_none());
    }

    #[test]
    fn test_empty_description_is_hidden() {
        let model = PipeModel::new(PipeSpec::new("a").description(""), None);
        assert_eq!(model.description_text(), None);
    }

    #[test]
    fn test_model_serialize_uses_type_key() {
        let model = PipeModel::new(PipeSpec::new("Logger"), Some("FileWrite".to_string()));
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["type"], json!("FileWrite"));
        assert!(value.get("position").is_none());
    }

    #[test]
    fn test_spec_deserialize_defaults() {
        let spec: PipeSpec = serde_json::from_value(json!({"name": "Echo"})).unwrap();
        assert_eq!(spec, PipeSpec::new("Echo"));
    }
}
