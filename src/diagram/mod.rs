//! The host diagram.
//!
//! A [`Diagram`] owns everything pipe views share: the element tree, the
//! canvas, the catalog service, the listener channel, the name to type and
//! name to icon dictionaries and the window id sequence. Views hold it
//! weakly, so dropping the diagram turns every pending resolution into a
//! no-op.

mod channel;

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info};

use crate::{
    Config, PipeSpec, PipeflowError, Position, Result,
    canvas::{Canvas, Connection},
    catalog::CatalogService,
    dom::{Document, Element, ElementId},
    events::DiagramEvent,
    utils,
    view::{IconRenderer, PipeView},
};

pub use channel::{Channel, ChannelEvent, ChannelOptions};

/// Name to type (or type to icon path) lookup shared by a diagram's views.
pub type TypeDictionary = HashMap<String, String>;

/// Which kind of view a pipe is built as.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Flavor {
    /// Appearance settled at construction.
    #[default]
    Plain,
    /// Icon refined from the activity catalog after construction.
    Activity,
}

/// Source of window ids; the first id handed out is 1.
#[derive(Debug, Default)]
pub struct IdSequence {
    current: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last id handed out, 0 before the first.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
    }
}

pub struct Diagram {
    id: String,
    config: Config,
    sequence: IdSequence,

    types: RwLock<Arc<TypeDictionary>>,
    icons: RwLock<Arc<TypeDictionary>>,

    channel: Arc<Channel>,
    canvas: Arc<dyn Canvas>,
    catalog: Arc<dyn CatalogService>,

    document: Document,
    /// container every pipe and description bubble is inserted into
    canvas_element: ElementId,
    pipes: RwLock<IndexMap<String, Arc<PipeView>>>,

    handle: Handle,
    /// set when the diagram owns its runtime
    runtime: Option<Arc<Runtime>>,
}

impl Diagram {
    pub(crate) fn new(
        config: Config,
        types: TypeDictionary,
        icons: TypeDictionary,
        canvas: Arc<dyn Canvas>,
        catalog: Arc<dyn CatalogService>,
        handle: Handle,
        runtime: Option<Arc<Runtime>>,
    ) -> Result<Self> {
        let document = Document::new();
        let canvas_element = document.create_in(document.root(), Element::div().with_id("canvas"))?;

        Ok(Self {
            id: utils::shortid(),
            config,
            sequence: IdSequence::new(),
            types: RwLock::new(Arc::new(types)),
            icons: RwLock::new(Arc::new(icons)),
            channel: Arc::new(Channel::new(handle.clone())),
            canvas,
            catalog,
            document,
            canvas_element,
            pipes: RwLock::new(IndexMap::new()),
            handle,
            runtime,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn canvas_element(&self) -> ElementId {
        self.canvas_element
    }

    pub fn canvas(&self) -> &Arc<dyn Canvas> {
        &self.canvas
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Current name to type dictionary.
    pub fn types(&self) -> Arc<TypeDictionary> {
        self.types.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the name to type dictionary; existing pipes keep theirs.
    pub fn set_types(
        &self,
        types: TypeDictionary,
    ) {
        *self.types.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(types);
    }

    /// Current type to icon path dictionary.
    pub fn icons(&self) -> Arc<TypeDictionary> {
        self.icons.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_icons(
        &self,
        icons: TypeDictionary,
    ) {
        *self.icons.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(icons);
    }

    pub fn icon_renderer(&self) -> IconRenderer {
        IconRenderer::new(self.icons(), self.config.icons.activity_template.as_str())
    }

    pub fn next_window_id(&self) -> u64 {
        self.sequence.next()
    }

    /// Number of windows handed out since the last reset.
    pub fn windows(&self) -> u64 {
        self.sequence.current()
    }

    pub fn reset_windows(&self) {
        self.sequence.reset();
    }

    /// Broadcast `event` to the diagram listeners.
    pub fn notify(
        &self,
        event: DiagramEvent,
    ) {
        self.channel.notify(event);
    }

    /// Build a pipe and register it under its name.
    pub fn add_pipe(
        self: &Arc<Self>,
        spec: PipeSpec,
        flavor: Flavor,
    ) -> Result<Arc<PipeView>> {
        let name = spec.name.clone();
        if self.pipes.read().unwrap_or_else(PoisonError::into_inner).contains_key(&name) {
            return Err(PipeflowError::Diagram(format!("pipe '{}' is already on the diagram", name)));
        }

        let view = match flavor {
            Flavor::Plain => PipeView::plain(self, spec)?,
            Flavor::Activity => PipeView::activity(self, spec)?,
        };

        let mut pipes = self.pipes.write().unwrap_or_else(PoisonError::into_inner);
        if pipes.contains_key(&name) {
            drop(pipes);
            view.remove_elements();
            return Err(PipeflowError::Diagram(format!("pipe '{}' is already on the diagram", name)));
        }
        pipes.insert(name.clone(), view.clone());
        drop(pipes);

        info!(diagram = %self.id, pipe = %name, flavor = flavor.as_ref(), "pipe added");
        Ok(view)
    }

    /// Palette add: a pipe without extra text, placed at `position` or at
    /// the configured default.
    pub fn add_custom_pipe(
        self: &Arc<Self>,
        name: impl Into<String>,
        position: Option<Position>,
        flavor: Flavor,
    ) -> Result<Arc<PipeView>> {
        let position = position.unwrap_or(self.config.canvas.default_position);
        self.add_pipe(PipeSpec::new(name).position(position.x, position.y), flavor)
    }

    /// Take a pipe off the diagram. Its pending resolution, if any, will
    /// find it detached and do nothing.
    pub fn remove_pipe(
        &self,
        name: &str,
    ) -> Result<Arc<PipeView>> {
        let view = self
            .pipes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(name)
            .ok_or_else(|| PipeflowError::Diagram(format!("pipe '{}' is not on the diagram", name)))?;

        view.remove_elements();
        self.notify(DiagramEvent::PipeRemoved {
            name: name.to_string(),
        });
        info!(diagram = %self.id, pipe = %name, "pipe removed");
        Ok(view)
    }

    pub fn pipe(
        &self,
        name: &str,
    ) -> Option<Arc<PipeView>> {
        self.pipes.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    /// Registered pipes in insertion order.
    pub fn pipes(&self) -> Vec<Arc<PipeView>> {
        self.pipes.read().unwrap_or_else(PoisonError::into_inner).values().cloned().collect()
    }

    /// Draw a connection between two registered pipes.
    pub fn connect(
        &self,
        source: &str,
        target: &str,
    ) -> Result<()> {
        let dom_id = |name: &str| {
            self.pipe(name)
                .and_then(|view| view.dom_id())
                .ok_or_else(|| PipeflowError::Diagram(format!("pipe '{}' is not on the diagram", name)))
        };
        let connection = Connection::new(dom_id(source)?, dom_id(target)?);
        debug!(diagram = %self.id, source, target, "connect pipes");
        self.canvas.connect(&connection)
    }

    /// HTML-like rendering of the whole canvas.
    pub fn render(&self) -> String {
        self.document.render(self.canvas_element)
    }
}

impl Drop for Diagram {
    fn drop(&mut self) {
        // an owned runtime may be dropped from one of its own tasks
        if let Some(runtime) = self.runtime.take().and_then(|rt| Arc::try_unwrap(rt).ok()) {
            runtime.shutdown_background();
        }
    }
}
