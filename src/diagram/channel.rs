use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use tokio::{runtime::Handle, sync::broadcast};

use crate::{
    PipeflowError, Result, ShareLock,
    common::BroadcastQueue,
    events::{DiagramEvent, Event, PipeEvent},
};

macro_rules! dispatch_event {
    ($handles:expr, $item:expr) => {
        let handlers = $handles.read().unwrap_or_else(PoisonError::into_inner).clone();
        for handle in handlers.iter() {
            (handle)($item);
        }
    };
}

macro_rules! dispatch_event_async {
    ($runtime:expr, $handles:expr, $item:expr) => {
        let handlers = $handles.read().unwrap_or_else(PoisonError::into_inner).clone();
        if !handlers.is_empty() {
            let item = $item.clone();
            $runtime.spawn(async move {
                for handle in handlers.iter() {
                    (handle)(&item).await;
                }
            });
        }
    };
}

const EVENT_QUEUE_SIZE: usize = 1024;

pub type DiagramEventHandle = Arc<dyn Fn(&Event<DiagramEvent>) + Send + Sync>;
pub type DiagramEventHandleAsync = Arc<dyn Fn(&Event<DiagramEvent>) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the pipe name
    /// eg. Logger*
    pub name: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            name: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

/// Listener hub of a diagram.
///
/// Synchronous handlers run on the notifying thread before `notify` returns,
/// which is what lets a `GetPipeAttributes` listener fill a model in time.
/// Async handlers are spawned on the diagram runtime; `subscribe` hands out
/// a broadcast receiver of every event.
#[derive(Clone)]
pub struct Channel {
    event_queue: Arc<BroadcastQueue<Event<DiagramEvent>>>,

    events: ShareLock<Vec<DiagramEventHandle>>,
    events_async: ShareLock<Vec<DiagramEventHandleAsync>>,

    runtime: Handle,
}

impl Channel {
    pub(crate) fn new(runtime: Handle) -> Self {
        Self {
            event_queue: BroadcastQueue::new(EVENT_QUEUE_SIZE),
            events: Arc::new(RwLock::new(Vec::new())),
            events_async: Arc::new(RwLock::new(Vec::new())),
            runtime,
        }
    }

    pub(crate) fn notify(
        &self,
        event: DiagramEvent,
    ) {
        let evt = Event::new(event);
        dispatch_event!(self.events, &evt);
        dispatch_event_async!(self.runtime, self.events_async, &evt);
        self.event_queue.send(evt);
    }

    /// Receive every event notified from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<DiagramEvent>> {
        self.event_queue.subscribe()
    }
}

/// Listener registration filtered by pipe name.
#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: globset::GlobMatcher,
}

impl ChannelEvent {
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Result<Self> {
        let glob = globset::Glob::new(&options.name).map_err(|e| PipeflowError::Config(format!("invalid name pattern '{}': {}", options.name, e)))?;
        Ok(Self {
            channel,
            glob: glob.compile_matcher(),
        })
    }

    /// Called when a model is created and again right before its attributes
    /// are consulted by catalog resolution.
    pub fn on_pipe_attributes(
        &self,
        f: impl Fn(&PipeEvent) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.events.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(move |e| {
            if let DiagramEvent::GetPipeAttributes(pipe) = e.inner() {
                if glob.is_match(&pipe.name) {
                    f(pipe);
                }
            }
        }));
    }

    pub fn on_resolved(
        &self,
        f: impl Fn(&str, &str) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.events.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(move |e| {
            if let DiagramEvent::PipeResolved {
                name,
                activity,
            } = e.inner()
            {
                if glob.is_match(name) {
                    f(name, activity);
                }
            }
        }));
    }

    pub fn on_removed(
        &self,
        f: impl Fn(&str) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.events.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(move |e| {
            if let DiagramEvent::PipeRemoved {
                name,
            } = e.inner()
            {
                if glob.is_match(name) {
                    f(name);
                }
            }
        }));
    }

    pub fn on_event(
        &self,
        f: impl Fn(&Event<DiagramEvent>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        self.channel.events.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(move |e| {
            if glob.is_match(e.name()) {
                f(e);
            }
        }));
    }

    pub fn on_event_async<F>(
        &self,
        f: F,
    ) where
        F: Fn(&Event<DiagramEvent>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let glob = self.glob.clone();

        self.channel.events_async.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(move |e| {
            if glob.is_match(e.name()) {
                f(e)
            } else {
                Box::pin(async {})
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{PipeModel, PipeSpec};

    fn pipe_event(name: &str) -> DiagramEvent {
        DiagramEvent::GetPipeAttributes(PipeEvent {
            name: name.to_string(),
            pipe_model: Arc::new(RwLock::new(PipeModel::new(PipeSpec::new(name), None))),
        })
    }

    #[tokio::test]
    async fn test_sync_listener_can_fill_attributes() {
        let channel = Arc::new(Channel::new(Handle::current()));
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_pipe_attributes(|e| {
            e.pipe_model.write().unwrap().attributes.insert("write".to_string(), "disk-icon".to_string());
        });

        let event = pipe_event("Logger");
        channel.notify(event.clone());

        let DiagramEvent::GetPipeAttributes(pipe) = event else {
            unreachable!()
        };
        assert_eq!(pipe.pipe_model.read().unwrap().attributes.get("write").map(String::as_str), Some("disk-icon"));
    }

    #[tokio::test]
    async fn test_glob_filters_by_name() {
        let channel = Arc::new(Channel::new(Handle::current()));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_name("Log*")).unwrap().on_event(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        channel.notify(pipe_event("Logger"));
        channel.notify(pipe_event("Echo"));
        channel.notify(DiagramEvent::PipeRemoved {
            name: "LogSink".to_string(),
        });

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribe_and_async_handlers() {
        let channel = Arc::new(Channel::new(Handle::current()));
        let mut rx = channel.subscribe();
        let (tx, done) = tokio::sync::oneshot::channel::<String>();
        let tx = std::sync::Mutex::new(Some(tx));
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_event_async(move |e| {
            let name = e.name().to_string();
            let sender = tx.lock().unwrap().take();
            Box::pin(async move {
                if let Some(sender) = sender {
                    let _ = sender.send(name);
                }
            })
        });

        channel.notify(DiagramEvent::PipeResolved {
            name: "Logger".to_string(),
            activity: "disk-icon".to_string(),
        });

        assert_eq!(rx.recv().await.unwrap().str(), "pipeResolved");
        assert_eq!(done.await.unwrap(), "Logger");
    }

    #[test]
    fn test_invalid_glob() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let channel = Arc::new(Channel::new(runtime.handle().clone()));
        assert!(ChannelEvent::channel(channel, ChannelOptions::with_name("[")).is_err());
    }
}
