//! Connection canvas collaborator.
//!
//! The canvas makes elements draggable connection endpoints and draws
//! connections between them. Pipeflow only issues the three capability calls
//! below; how they are drawn is up to the implementation.

mod recording;

use serde::{Deserialize, Serialize};

use crate::{Result, dom::ElementId};

pub use recording::{CanvasCall, RecordingCanvas};

/// Named anchor sides of an element.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
pub enum AnchorPoint {
    Top,
    Right,
    Bottom,
    Left,
}

/// Where a connection may attach: a named side or `[x, y, dx, dy]` relative
/// to the element box.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Anchor {
    Named(AnchorPoint),
    Position([f64; 4]),
}

/// Routing style of drawn connections.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectorType {
    #[default]
    Flowchart,
    StateMachine,
    Bezier,
    Straight,
}

/// Anchors offered by source endpoints unless configured otherwise.
pub fn default_source_anchors() -> Vec<Anchor> {
    vec![
        Anchor::Named(AnchorPoint::Top),
        Anchor::Named(AnchorPoint::Right),
        Anchor::Named(AnchorPoint::Left),
        Anchor::Position([0.25, 1.0, 0.0, 1.0]),
        Anchor::Position([0.5, 1.0, 0.0, 1.0]),
        Anchor::Position([0.75, 1.0, 0.0, 1.0]),
        Anchor::Position([1.0, 1.0, 0.0, 1.0]),
    ]
}

/// Dot shaped endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub radius: u32,
    pub css_class: String,
}

impl Endpoint {
    pub fn dot(
        radius: u32,
        css_class: impl Into<String>,
    ) -> Self {
        Self {
            radius,
            css_class: css_class.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Connector {
    pub kind: ConnectorType,
    pub stub: [u32; 2],
    pub gap: u32,
    pub corner_radius: u32,
    pub midpoint: f64,
}

impl Connector {
    pub fn new(kind: ConnectorType) -> Self {
        Self {
            kind,
            stub: [40, 60],
            gap: 10,
            corner_radius: 5,
            midpoint: 0.0001,
        }
    }
}

/// Options for elements that accept incoming connections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TargetOptions {
    pub hover_class: String,
    pub anchors: Vec<Anchor>,
    pub endpoint: Endpoint,
}

impl Default for TargetOptions {
    fn default() -> Self {
        Self {
            hover_class: "hover".to_string(),
            anchors: vec![
                Anchor::Named(AnchorPoint::Left),
                Anchor::Named(AnchorPoint::Top),
                Anchor::Named(AnchorPoint::Right),
            ],
            endpoint: Endpoint::dot(11, "large-green"),
        }
    }
}

/// Options for elements that originate connections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SourceOptions {
    /// selector of children that must not start a drag
    pub filter: String,
    pub filter_exclude: bool,
    /// `None` means unlimited
    pub max_connections: Option<u32>,
    pub endpoint: Endpoint,
    pub anchors: Vec<Anchor>,
    pub connector: Connector,
}

impl SourceOptions {
    pub fn new(
        anchors: Vec<Anchor>,
        connector_type: ConnectorType,
    ) -> Self {
        Self {
            filter: ".enableDisableSource".to_string(),
            filter_exclude: true,
            max_connections: None,
            endpoint: Endpoint::dot(7, "small-blue"),
            anchors,
            connector: Connector::new(connector_type),
        }
    }
}

/// A connection between two elements, by their `id` attribute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Drag-and-drop connection surface.
///
/// The canvas borrows elements to attach behaviour; it never removes or
/// reparents them.
pub trait Canvas: Send + Sync {
    /// Let connections be dragged out of `element`.
    fn make_source(
        &self,
        element: ElementId,
        options: &SourceOptions,
    ) -> Result<()>;

    /// Let connections be dropped onto `element`.
    fn make_target(
        &self,
        element: ElementId,
        options: &TargetOptions,
    ) -> Result<()>;

    /// Draw a connection.
    fn connect(
        &self,
        connection: &Connection,
    ) -> Result<()>;
}
