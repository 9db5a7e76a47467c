//! Broadcast queue for one-to-many event distribution.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Broadcast queue for one-to-many message distribution.
///
/// Every subscriber receives every message sent after it subscribed.
/// Backed by tokio's broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap);

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// send a message to the queue, returns the number of subscribers reached
    pub fn send(
        &self,
        msg: T,
    ) -> usize {
        self.sender.send(msg).unwrap_or(0)
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}
