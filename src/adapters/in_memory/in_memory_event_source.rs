// In memory push source backed by a broadcast channel.
//
// Tracks open connections so tests can assert that department switches never leak one.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use tokio::sync::broadcast;

use crate::core::ports::{PushError, PushEventSource, PushStream};

pub struct InMemoryEventSource {
    sender: broadcast::Sender<Result<String, String>>,
    open: Arc<AtomicUsize>,
    total: AtomicUsize,
}

struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            sender,
            open: Arc::new(AtomicUsize::new(0)),
            total: AtomicUsize::new(0),
        }
    }

    pub fn publish(&self, raw: impl Into<String>) {
        let _ = self.sender.send(Ok(raw.into()));
    }

    pub fn publish_error(&self, reason: impl Into<String>) {
        let _ = self.sender.send(Err(reason.into()));
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn total_connections(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl PushEventSource for InMemoryEventSource {
    fn subscribe(&self) -> PushStream {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        let guard = ConnectionGuard(self.open.clone());
        let receiver = self.sender.subscribe();

        futures::stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
            loop {
                match receiver.recv().await {
                    Ok(Ok(raw)) => return Some((Ok(raw), (receiver, guard))),
                    Ok(Err(reason)) => {
                        return Some((Err(PushError::Stream(reason)), (receiver, guard)));
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod in_memory_event_source_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_deliver_published_messages_to_every_subscriber() {
        let source = InMemoryEventSource::new();
        let mut first = source.subscribe();
        let mut second = source.subscribe();
        source.publish("hello");
        assert_eq!(first.next().await.unwrap().unwrap(), "hello");
        assert_eq!(second.next().await.unwrap().unwrap(), "hello");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_count_open_connections_until_dropped() {
        let source = InMemoryEventSource::new();
        let stream = source.subscribe();
        assert_eq!(source.open_connections(), 1);
        drop(stream);
        assert_eq!(source.open_connections(), 0);
        assert_eq!(source.total_connections(), 1);
    }
}
