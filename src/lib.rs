//! # Pipeflow
//!
//! Pipeflow builds the pipe nodes of a flow diagram editor without a browser.
//! It owns the node construction and type-resolution pipeline and talks to the
//! drawing surface through small collaborator traits.
//!
//! ## Core Features
//!
//! - **Synchronous scaffold**: a node is classified (Exit, Receiver or generic
//!   activity) and rendered into an element tree the moment it is constructed
//! - **Async resolution**: activity nodes fetch a type catalog and patch their
//!   icon in place once it arrives, on a `tokio` runtime
//! - **Pluggable collaborators**: canvas, catalog service and listeners are
//!   traits or closures supplied by the host
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipeflow::{DiagramBuilder, Flavor, PipeSpec};
//!
//! let diagram = DiagramBuilder::new().types(types).build()?;
//! let view = diagram.add_pipe(PipeSpec::new("Logger").position(120.0, 80.0), Flavor::Activity)?;
//! let activity = view.resolve().await;
//! ```

mod builder;
pub mod canvas;
pub mod catalog;
mod common;
mod config;
mod diagram;
pub mod dom;
mod error;
mod events;
mod model;
mod utils;
pub mod view;

use std::sync::{Arc, RwLock};

pub use builder::DiagramBuilder;
pub use config::{CanvasConfig, CatalogConfig, Config, DescriptionConfig, IconConfig};
pub use diagram::{Channel, ChannelEvent, ChannelOptions, Diagram, Flavor, IdSequence, TypeDictionary};
pub use error::PipeflowError;
pub use events::{DiagramEvent, Event, PipeEvent};
pub use model::*;

/// Result type alias for Pipeflow operations.
pub type Result<T> = std::result::Result<T, PipeflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub type ShareLock<T> = Arc<RwLock<T>>;
