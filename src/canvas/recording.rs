use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::{Result, ShareLock, dom::ElementId};

use super::{Canvas, Connection, SourceOptions, TargetOptions};

/// A capability call received by a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    Source(ElementId, SourceOptions),
    Target(ElementId, TargetOptions),
    Connect(Connection),
}

/// Headless canvas that keeps every call it receives, in order.
///
/// Used when no drawing surface is attached, and to inspect which elements
/// were made sources or targets.
#[derive(Clone, Default)]
pub struct RecordingCanvas {
    calls: ShareLock<Vec<CanvasCall>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<CanvasCall> {
        self.calls.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_source(
        &self,
        element: ElementId,
    ) -> bool {
        self.calls().iter().any(|call| matches!(call, CanvasCall::Source(el, _) if *el == element))
    }

    pub fn is_target(
        &self,
        element: ElementId,
    ) -> bool {
        self.calls().iter().any(|call| matches!(call, CanvasCall::Target(el, _) if *el == element))
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CanvasCall::Connect(connection) => Some(connection),
                _ => None,
            })
            .collect()
    }

    fn record(
        &self,
        call: CanvasCall,
    ) {
        trace!(?call, "canvas call");
        self.calls.write().unwrap_or_else(PoisonError::into_inner).push(call);
    }
}

impl Canvas for RecordingCanvas {
    fn make_source(
        &self,
        element: ElementId,
        options: &SourceOptions,
    ) -> Result<()> {
        self.record(CanvasCall::Source(element, options.clone()));
        Ok(())
    }

    fn make_target(
        &self,
        element: ElementId,
        options: &TargetOptions,
    ) -> Result<()> {
        self.record(CanvasCall::Target(element, options.clone()));
        Ok(())
    }

    fn connect(
        &self,
        connection: &Connection,
    ) -> Result<()> {
        self.record(CanvasCall::Connect(connection.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};

    #[test]
    fn test_records_calls_in_order() {
        let doc = Document::new();
        let a = doc.create_in(doc.root(), Element::div()).unwrap();
        let b = doc.create_in(doc.root(), Element::div()).unwrap();
        let canvas = RecordingCanvas::new();

        canvas.make_target(a, &TargetOptions::default()).unwrap();
        canvas.connect(&Connection::new("a", "b")).unwrap();

        assert!(canvas.is_target(a));
        assert!(!canvas.is_source(a));
        assert!(!canvas.is_target(b));
        assert_eq!(canvas.connections(), vec![Connection::new("a", "b")]);
        assert_eq!(canvas.calls().len(), 2);
    }
}
