use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    PipeflowError, Result,
    canvas::{Anchor, ConnectorType, default_source_anchors},
    model::Position,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// number of async worker threads for a runtime owned by the diagram, defaults to 4
    pub async_worker_thread_number: u16,
    /// canvas config
    pub canvas: CanvasConfig,
    /// catalog config
    pub catalog: CatalogConfig,
    /// icon config
    pub icons: IconConfig,
    /// description bubble config
    pub description: DescriptionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// connector drawn from source endpoints
    pub connector_type: ConnectorType,
    /// anchors offered by source endpoints
    pub source_anchors: Vec<Anchor>,
    /// position used by palette adds without coordinates
    pub default_position: Position,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// catalog endpoint, no remote catalog when absent
    pub url: Option<String>,
    /// request timeout in milliseconds
    pub timeout_ms: u64,
    /// how long a fetched catalog is reused, in seconds
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// activity icon path, `{}` is replaced by the activity identifier
    pub activity_template: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    /// vertical distance between a node and its description bubble
    pub offset_y: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            async_worker_thread_number: 4,
            canvas: CanvasConfig::default(),
            catalog: CatalogConfig::default(),
            icons: IconConfig::default(),
            description: DescriptionConfig::default(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            connector_type: ConnectorType::default(),
            source_anchors: default_source_anchors(),
            default_position: Position::new(100.0, 100.0),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 5000,
            cache_ttl_secs: 60,
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            activity_template: "media/activities/{}.png".to_string(),
        }
    }
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            offset_y: 80.0,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| PipeflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the diagram cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.async_worker_thread_number == 0 {
            return Err(PipeflowError::Config("async_worker_thread_number must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use crate::{
        Config,
        canvas::{Anchor, AnchorPoint, ConnectorType},
    };

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        async_worker_thread_number = 2
        [canvas]
        connector_type = "state_machine"
        source_anchors = ["Top", [0.5, 1, 0, 1]]
        default_position = { x = 40, y = 60 }

        [catalog]
        url = "http://localhost:8080/api/pipes"
        cache_ttl_secs = 5

        [icons]
        activity_template = "icons/{}.svg"
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.async_worker_thread_number, 2);
        assert_eq!(config.canvas.connector_type, ConnectorType::StateMachine);
        assert_eq!(
            config.canvas.source_anchors,
            vec![Anchor::Named(AnchorPoint::Top), Anchor::Position([0.5, 1.0, 0.0, 1.0])]
        );
        assert_eq!(config.canvas.default_position.x, 40.0);
        assert_eq!(config.catalog.url.as_deref(), Some("http://localhost:8080/api/pipes"));
        assert_eq!(config.catalog.timeout_ms, 5000);
        assert_eq!(config.catalog.cache_ttl_secs, 5);
        assert_eq!(config.icons.activity_template, "icons/{}.svg");
        assert_eq!(config.description.offset_y, 80.0);
    }

    #[test]
    fn test_config_defaults_from_empty() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.async_worker_thread_number, 4);
        assert_eq!(config.canvas.connector_type, ConnectorType::Flowchart);
        assert_eq!(config.canvas.source_anchors.len(), 7);
        assert!(config.catalog.url.is_none());
    }

    #[test]
    fn test_config_rejects_zero_workers() {
        assert!(Config::load_from_str("async_worker_thread_number = 0").is_err());
    }

    #[test]
    fn test_config_create_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[description]\noffset_y = 120.0").unwrap();

        let config = Config::create(file.path()).unwrap();
        assert_eq!(config.description.offset_y, 120.0);
        assert!(Config::create("/definitely/not/here.toml").is_err());
    }
}
