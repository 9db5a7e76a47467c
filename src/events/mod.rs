//! Events broadcast by a diagram to its listeners.
//!
//! Listeners use them to supply data just in time (`GetPipeAttributes`) or
//! to follow what happened to a node.

use crate::{PipeModel, ShareLock, utils};

/// Generic event wrapper stamped with its creation time.
#[derive(Debug, Clone)]
pub struct Event<T> {
    inner: T,
    timestamp: i64,
}

/// A pipe together with its shared model.
#[derive(Debug, Clone)]
pub struct PipeEvent {
    /// Name of the pipe.
    pub name: String,
    /// The model; listeners may write `attributes` through it.
    pub pipe_model: ShareLock<PipeModel>,
}

#[derive(Debug, Clone)]
pub enum DiagramEvent {
    /// A model exists, or its attributes are about to be consulted.
    GetPipeAttributes(PipeEvent),
    /// An icon patch was applied.
    PipeResolved {
        name: String,
        activity: String,
    },
    /// A pipe left the diagram.
    PipeRemoved {
        name: String,
    },
}

impl DiagramEvent {
    pub fn str(&self) -> &str {
        match self {
            DiagramEvent::GetPipeAttributes(_) => "getPipeAttributes",
            DiagramEvent::PipeResolved {
                ..
            } => "pipeResolved",
            DiagramEvent::PipeRemoved {
                ..
            } => "pipeRemoved",
        }
    }

    /// Name of the pipe the event is about.
    pub fn name(&self) -> &str {
        match self {
            DiagramEvent::GetPipeAttributes(e) => &e.name,
            DiagramEvent::PipeResolved {
                name,
                ..
            }
            | DiagramEvent::PipeRemoved {
                name,
            } => name,
        }
    }
}

impl<T> std::ops::Deref for Event<T>
where
    T: std::fmt::Debug + Clone,
{
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Event<T>
where
    T: std::fmt::Debug + Clone,
{
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            timestamp: utils::time::time_millis(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Creation time in milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
