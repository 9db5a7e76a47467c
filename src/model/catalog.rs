use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::{PipeflowError, Result, model::PipeModel};

/// One type definition of the activity catalog.
///
/// Every key besides `name` is a keyword mapping to an activity identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(flatten)]
    pub keywords: IndexMap<String, Value>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: IndexMap::new(),
        }
    }

    pub fn keyword(
        mut self,
        keyword: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.keywords.insert(keyword.into(), value.into());
        self
    }

    /// Activity identifier defined for `keyword`. Non-string values are
    /// stringified, `null` counts as undefined.
    pub fn get(
        &self,
        keyword: &str,
    ) -> Option<String> {
        match self.keywords.get(keyword)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            v => Some(v.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    List(Vec<CatalogEntry>),
    Envelope { pipe: Vec<CatalogEntry> },
}

/// Ordered list of catalog entries, as returned by a catalog service.
///
/// Accepts either a bare JSON list or the `{"pipe": [...]}` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogPayload")]
pub struct Catalog {
    pipe: Vec<CatalogEntry>,
}

impl From<CatalogPayload> for Catalog {
    fn from(payload: CatalogPayload) -> Self {
        match payload {
            CatalogPayload::List(pipe) | CatalogPayload::Envelope { pipe } => Self { pipe },
        }
    }
}

impl From<Vec<CatalogEntry>> for Catalog {
    fn from(pipe: Vec<CatalogEntry>) -> Self {
        Self { pipe }
    }
}

impl Catalog {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<Catalog>(s).map_err(|e| PipeflowError::Catalog(format!("invalid catalog: {}", e)))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.pipe
    }

    pub fn is_empty(&self) -> bool {
        self.pipe.is_empty()
    }

    /// First entry whose name equals `name`.
    pub fn entry(
        &self,
        name: &str,
    ) -> Option<&CatalogEntry> {
        self.pipe.iter().find(|entry| entry.name == name)
    }

    /// Two-level lookup of the activity identifier of `model`.
    ///
    /// Picks the first entry named after the model's type, then walks the
    /// model's own attribute keys in order and returns the entry's value for
    /// the first key the entry defines.
    pub fn resolve_activity(
        &self,
        model: &PipeModel,
    ) -> Option<String> {
        let pipe_type = model.pipe_type.as_deref()?;
        let Some(entry) = self.entry(pipe_type) else {
            trace!(pipe = %model.name, pipe_type, "no catalog entry for type");
            return None;
        };

        let activity = model.attributes.keys().find_map(|keyword| entry.get(keyword));
        if activity.is_none() {
            trace!(pipe = %model.name, pipe_type, "no attribute keyword matched the catalog entry");
        }
        activity
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::PipeSpec;

    fn model(
        pipe_type: &str,
        attributes: &[(&str, &str)],
    ) -> PipeModel {
        let mut model = PipeModel::new(PipeSpec::new("Logger"), Some(pipe_type.to_string()));
        for (k, v) in attributes {
            model.attributes.insert(k.to_string(), v.to_string());
        }
        model
    }

    #[test]
    fn test_parse_bare_list() {
        let catalog = Catalog::from_json(r#"[{"name": "FileWrite", "write": "disk-icon", "append": "log-icon"}]"#).unwrap();
        let entry = catalog.entry("FileWrite").unwrap();
        assert_eq!(entry.keywords.keys().collect::<Vec<_>>(), vec!["write", "append"]);
        assert_eq!(entry.get("write").as_deref(), Some("disk-icon"));
    }

    #[test]
    fn test_parse_envelope() {
        let catalog = Catalog::from_json(r#"{"pipe": [{"name": "Echo", "mode": 3}]}"#).unwrap();
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.entry("Echo").unwrap().get("mode").as_deref(), Some("3"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Catalog::from_json(r#"{"items": 1}"#).is_err());
    }

    #[test]
    fn test_resolve_activity_match() {
        let catalog = Catalog::from(vec![CatalogEntry::new("FileWrite").keyword("write", "disk-icon")]);
        let model = model("FileWrite", &[("write", "disk-icon")]);
        assert_eq!(catalog.resolve_activity(&model).as_deref(), Some("disk-icon"));
    }

    #[test]
    fn test_resolve_activity_missing_entry() {
        let catalog = Catalog::from(vec![CatalogEntry::new("FileRead").keyword("write", "disk-icon")]);
        let model = model("FileWrite", &[("write", "disk-icon")]);
        assert_eq!(catalog.resolve_activity(&model), None);
    }

    #[test]
    fn test_resolve_activity_missing_keyword() {
        let catalog = Catalog::from(vec![CatalogEntry::new("FileWrite").keyword("read", "eye-icon")]);
        let model = model("FileWrite", &[("write", "disk-icon")]);
        assert_eq!(catalog.resolve_activity(&model), None);
    }

    #[test]
    fn test_resolve_activity_first_attribute_key_wins() {
        let catalog = Catalog::from(vec![
            CatalogEntry::new("FileWrite").keyword("append", "log-icon").keyword("write", "disk-icon"),
        ]);
        let model = model("FileWrite", &[("write", "x"), ("append", "y")]);
        assert_eq!(catalog.resolve_activity(&model).as_deref(), Some("disk-icon"));
    }

    #[test]
    fn test_resolve_activity_first_entry_wins() {
        let catalog = Catalog::from(vec![
            CatalogEntry::new("FileWrite").keyword("other", "a"),
            CatalogEntry::new("FileWrite").keyword("write", "b"),
        ]);
        let model = model("FileWrite", &[("write", "x")]);
        assert_eq!(catalog.resolve_activity(&model), None);
    }

    #[test]
    fn test_resolve_activity_untyped_model() {
        let catalog = Catalog::from(vec![CatalogEntry::new("FileWrite").keyword("write", json!("disk-icon"))]);
        let mut model = model("FileWrite", &[("write", "x")]);
        model.pipe_type = None;
        assert_eq!(catalog.resolve_activity(&model), None);
    }

    #[test]
    fn test_null_keyword_is_undefined() {
        let entry = CatalogEntry::new("a").keyword("k", Value::Null);
        assert_eq!(entry.get("k"), None);
    }
}
