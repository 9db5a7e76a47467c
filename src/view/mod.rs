//! Pipe views.
//!
//! A [`PipeView`] is built in two steps. [`PipeView::new`] classifies the
//! pipe and renders its scaffold synchronously; the view is usable as soon
//! as it returns. [`PipeView::resolve`] is the optional async step: the
//! view's [`NodeClassifier`] may come up with an activity identifier, and
//! the view then swaps its icon in place. Resolving is idempotent and a
//! no-op once the pipe has left the diagram.

mod activity;
mod classifier;
mod description;
mod icon;
mod scaffold;

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    Diagram, PipeModel, PipeSpec, Result, ShareLock, TypeDictionary,
    canvas::{Connection, SourceOptions, TargetOptions},
    dom::{Element, ElementId},
    events::{DiagramEvent, PipeEvent},
};

pub use activity::ActivityClassifier;
pub use classifier::{NodeClassifier, PipeKind, PlainClassifier, RECEIVER_MARKER, ResolveContext, ScaffoldStyle, classify, is_receiver};
pub use description::{DescriptionView, description_dom_id};
pub use icon::{IconRenderer, TYPE_IMAGE_CLASS, TYPE_WINDOW_CLASS};
pub use scaffold::window_dom_id;

/// One pipe node of a diagram.
pub struct PipeView {
    diagram: Weak<Diagram>,
    classifier: Arc<dyn NodeClassifier>,
    model: ShareLock<PipeModel>,
    /// dictionary snapshot taken at construction
    types: Arc<TypeDictionary>,
    kind: PipeKind,
    window_id: Option<u64>,
    element: Option<ElementId>,
    description: Option<ElementId>,

    patching: Mutex<()>,
    task: Mutex<Option<JoinHandle<Option<String>>>>,
}

impl PipeView {
    /// A pipe whose look is final once constructed.
    pub fn plain(
        diagram: &Arc<Diagram>,
        spec: PipeSpec,
    ) -> Result<Arc<Self>> {
        Self::new(diagram, spec, Arc::new(PlainClassifier))
    }

    /// A pipe that starts resolving its activity icon right away.
    pub fn activity(
        diagram: &Arc<Diagram>,
        spec: PipeSpec,
    ) -> Result<Arc<Self>> {
        let view = Self::new(diagram, spec, Arc::new(ActivityClassifier))?;
        view.spawn_resolve();
        Ok(view)
    }

    /// Build the model, classify the pipe, attach its scaffold to the
    /// diagram canvas and announce the model to listeners.
    ///
    /// When the canvas or document refuses the scaffold nothing is announced
    /// and nothing stays on the canvas, but the window id taken for it is
    /// not handed out again.
    pub fn new(
        diagram: &Arc<Diagram>,
        spec: PipeSpec,
        classifier: Arc<dyn NodeClassifier>,
    ) -> Result<Arc<Self>> {
        let types = diagram.types();
        let name = spec.name.clone();
        let pipe_type = types.get(&name).cloned();
        let model = Arc::new(RwLock::new(PipeModel::new(spec, pipe_type)));

        let window_id = diagram.next_window_id();
        let (kind, snapshot) = {
            let mut model = model.write().unwrap_or_else(PoisonError::into_inner);
            let kind = classifier.classify(&model, &types);
            if let Some(tag) = kind.type_tag() {
                model.pipe_type = Some(tag.to_string());
            }
            (kind, model.clone())
        };

        let element = scaffold::build(diagram.document(), window_id, &snapshot, kind, classifier.scaffold_style(), &diagram.icon_renderer())?;
        let description = match Self::assemble(diagram, window_id, element, kind, &snapshot) {
            Ok(description) => description,
            Err(e) => {
                let _ = diagram.document().remove(element);
                return Err(e);
            }
        };

        debug!(diagram = diagram.id(), pipe = %name, window_id, kind = kind.as_ref(), pipe_type = ?snapshot.pipe_type, "pipe constructed");
        diagram.notify(DiagramEvent::GetPipeAttributes(PipeEvent {
            name,
            pipe_model: model.clone(),
        }));

        Ok(Arc::new(Self {
            diagram: Arc::downgrade(diagram),
            classifier,
            model,
            types,
            kind,
            window_id: Some(window_id),
            element: Some(element),
            description,
            patching: Mutex::new(()),
            task: Mutex::new(None),
        }))
    }

    /// A view without a host diagram: the model is classified but nothing is
    /// rendered and resolution does nothing.
    pub fn detached(
        spec: PipeSpec,
        classifier: Arc<dyn NodeClassifier>,
    ) -> Arc<Self> {
        let types = Arc::new(TypeDictionary::new());
        let mut model = PipeModel::new(spec, None);
        let kind = classifier.classify(&model, &types);
        if let Some(tag) = kind.type_tag() {
            model.pipe_type = Some(tag.to_string());
        }

        Arc::new(Self {
            diagram: Weak::new(),
            classifier,
            model: Arc::new(RwLock::new(model)),
            types,
            kind,
            window_id: None,
            element: None,
            description: None,
            patching: Mutex::new(()),
            task: Mutex::new(None),
        })
    }

    /// Position, description bubble, canvas wiring and insertion.
    fn assemble(
        diagram: &Diagram,
        window_id: u64,
        element: ElementId,
        kind: PipeKind,
        model: &PipeModel,
    ) -> Result<Option<ElementId>> {
        let document = diagram.document();

        let mut description = None;
        if let Some(position) = model.position {
            document.set_style(element, "left", &format!("{}px", position.x))?;
            document.set_style(element, "top", &format!("{}px", position.y))?;
            if let Some(text) = model.description_text() {
                let bubble = DescriptionView::new(diagram.config().description.offset_y).attach(document, diagram.canvas_element(), window_id, text, position)?;
                description = Some(bubble);
            }
        }

        let result = Self::make_interactive(diagram, element, kind).and_then(|_| document.append(diagram.canvas_element(), element)).and_then(|_| match description {
            Some(_) => diagram.canvas().connect(&Connection::new(window_dom_id(window_id), description_dom_id(window_id))),
            None => Ok(()),
        });

        if let Err(e) = result {
            if let Some(bubble) = description {
                let _ = document.remove(bubble);
            }
            return Err(e);
        }
        Ok(description)
    }

    fn make_interactive(
        diagram: &Diagram,
        element: ElementId,
        kind: PipeKind,
    ) -> Result<()> {
        let canvas = diagram.canvas();
        canvas.make_target(element, &TargetOptions::default())?;

        if kind.is_source() {
            let config = &diagram.config().canvas;
            canvas.make_source(element, &SourceOptions::new(config.source_anchors.clone(), config.connector_type))
        } else {
            diagram.document().add_class(element, "exit")
        }
    }

    /// Run the classifier's resolution and patch the icon.
    ///
    /// Returns the resolved activity identifier. Failures are logged and
    /// leave the pipe as it was. Each call goes back to the diagram's
    /// catalog service; wrap it in a
    /// [`CachedCatalog`](crate::catalog::CachedCatalog) to share one fetch.
    pub async fn resolve(&self) -> Option<String> {
        let Some(diagram) = self.diagram.upgrade() else {
            debug!(pipe = %self.name(), "no host diagram, nothing to resolve");
            return None;
        };

        let ctx = ResolveContext {
            diagram: &diagram,
            model: &self.model,
            types: &self.types,
        };
        let activity = match self.classifier.resolve(&ctx).await {
            Ok(Some(activity)) => activity,
            Ok(None) => return None,
            Err(e) => {
                warn!(diagram = diagram.id(), pipe = %self.name(), error = %e, "activity resolution failed");
                return None;
            }
        };

        self.model.write().unwrap_or_else(PoisonError::into_inner).activity = Some(activity.clone());

        match self.patch_icon(&diagram, &activity) {
            Ok(true) => diagram.notify(DiagramEvent::PipeResolved {
                name: self.name(),
                activity: activity.clone(),
            }),
            Ok(false) => debug!(pipe = %self.name(), "pipe is no longer on the canvas, icon patch skipped"),
            Err(e) => debug!(pipe = %self.name(), error = %e, "icon patch skipped"),
        }
        Some(activity)
    }

    /// Replace every icon container of the pipe with one showing `activity`.
    fn patch_icon(
        &self,
        diagram: &Diagram,
        activity: &str,
    ) -> Result<bool> {
        let Some(element) = self.element else {
            return Ok(false);
        };
        let _patching = self.patching.lock().unwrap_or_else(PoisonError::into_inner);

        let document = diagram.document();
        if !document.is_attached(element) {
            return Ok(false);
        }

        for child in document.children(element) {
            if document.get(child).is_some_and(|el| el.has_class(TYPE_WINDOW_CLASS)) {
                document.remove(child)?;
            }
        }

        let type_window = document.create(Element::div().with_class(TYPE_WINDOW_CLASS));
        let inserted = document.create_in(type_window, diagram.icon_renderer().activity_icon(activity)).and_then(|_| document.prepend(element, type_window));
        if let Err(e) = inserted {
            let _ = document.remove(type_window);
            return Err(e);
        }
        Ok(true)
    }

    /// Start [`resolve`](Self::resolve) on the diagram runtime.
    pub fn spawn_resolve(self: &Arc<Self>) {
        let Some(diagram) = self.diagram.upgrade() else {
            return;
        };
        let view = self.clone();
        let task = diagram.handle().spawn(async move { view.resolve().await });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    /// Wait for the resolution started by [`spawn_resolve`](Self::spawn_resolve).
    pub async fn resolved(&self) -> Option<String> {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        match task.await {
            Ok(activity) => activity,
            Err(e) => {
                warn!(pipe = %self.name(), error = %e, "resolution task failed");
                None
            }
        }
    }

    /// Take the scaffold and description bubble off the document.
    pub(crate) fn remove_elements(&self) {
        let Some(diagram) = self.diagram.upgrade() else {
            return;
        };
        for element in [self.element, self.description].into_iter().flatten() {
            let _ = diagram.document().remove(element);
        }
    }

    pub fn name(&self) -> String {
        self.model.read().unwrap_or_else(PoisonError::into_inner).name.clone()
    }

    /// Snapshot of the model.
    pub fn model(&self) -> PipeModel {
        self.model.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn pipe_model(&self) -> ShareLock<PipeModel> {
        self.model.clone()
    }

    pub fn kind(&self) -> PipeKind {
        self.kind
    }

    pub fn window_id(&self) -> Option<u64> {
        self.window_id
    }

    /// `id` attribute of the scaffold root.
    pub fn dom_id(&self) -> Option<String> {
        self.window_id.map(window_dom_id)
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn description(&self) -> Option<ElementId> {
        self.description
    }

    pub fn is_attached(&self) -> bool {
        match (self.diagram.upgrade(), self.element) {
            (Some(diagram), Some(element)) => diagram.document().is_attached(element),
            _ => false,
        }
    }
}
