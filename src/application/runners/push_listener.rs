// Push-update listener.
//
// Purpose
// - Keep one push connection open for the selected department and turn relevant
//   queue-change events into immediate snapshot refreshes.
//
// Responsibilities
// - Close the current connection before opening one for a newly selected department.
// - Drop malformed payloads without ending the session.
// - Leave reconnects to the transport.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::display_store::DisplayStore;
use crate::application::runners::snapshot_fetcher::RefreshRequest;
use crate::core::display::department::DepartmentContext;
use crate::core::display::push_event::QueueChangeEvent;
use crate::core::ports::PushEventSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Refreshed,
    Irrelevant,
    Malformed,
}

pub struct PushUpdateListener<TSource>
where
    TSource: PushEventSource + ?Sized + 'static,
{
    source: Arc<TSource>,
    store: Arc<DisplayStore>,
    refresh: mpsc::Sender<RefreshRequest>,
}

impl<TSource> PushUpdateListener<TSource>
where
    TSource: PushEventSource + ?Sized + 'static,
{
    pub fn new(source: Arc<TSource>, store: Arc<DisplayStore>, refresh: mpsc::Sender<RefreshRequest>) -> Self {
        Self {
            source,
            store,
            refresh,
        }
    }

    pub async fn on_event(&self, context: &DepartmentContext, raw: &str) -> EventDisposition {
        let Some(event) = QueueChangeEvent::decode(raw) else {
            warn!(payload = raw, "dropping malformed push event");
            return EventDisposition::Malformed;
        };
        if !event.is_relevant_to(context) {
            debug!(department = %event.department, "push event for another department");
            return EventDisposition::Irrelevant;
        }
        debug!(
            department = %event.department,
            number = event.number.as_deref().unwrap_or_default(),
            "push event triggers a snapshot refresh"
        );
        if self
            .refresh
            .send(RefreshRequest {
                department_id: context.id,
            })
            .await
            .is_err()
        {
            warn!("snapshot poller is gone; refresh request dropped");
        }
        EventDisposition::Refreshed
    }

    async fn session(&self, context: Option<DepartmentContext>) {
        let Some(context) = context else {
            return std::future::pending().await;
        };
        let connection_id = Uuid::now_v7();
        info!(%connection_id, department_id = context.id, "opening push connection");
        let mut stream = self.source.subscribe();
        while let Some(message) = stream.next().await {
            match message {
                Ok(raw) => {
                    self.on_event(&context, &raw).await;
                }
                Err(error) => {
                    warn!(%connection_id, %error, "push connection interrupted");
                }
            }
        }
        info!(%connection_id, "push stream ended");
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut selection = self.store.subscribe_selection();
        loop {
            let context = selection.borrow_and_update().clone();
            // Dropping the session future drops its stream, which closes the connection.
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = selection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = self.session(context) => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = selection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("push listener shutting down");
    }
}

#[cfg(test)]
mod push_update_listener_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_event_source::InMemoryEventSource;
    use crate::core::display::ad_rotation::AdSettings;
    use crate::core::display::state::DisplayFlags;
    use crate::test_support::fixtures::departments::make_departments;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    type BeforeEachReturn = (
        Arc<InMemoryEventSource>,
        Arc<DisplayStore>,
        mpsc::Sender<RefreshRequest>,
        mpsc::Receiver<RefreshRequest>,
    );

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let source = Arc::new(InMemoryEventSource::new());
        let store = Arc::new(DisplayStore::new(
            DisplayFlags::default(),
            AdSettings::default(),
            "http://media.local",
        ));
        let (tx, rx) = mpsc::channel(16);
        (source, store, tx, rx)
    }

    fn business_permits() -> DepartmentContext {
        DepartmentContext {
            id: 1,
            name: "Business Permits and Licensing".to_string(),
            prefix: "BPL".to_string(),
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_request_a_refresh_for_a_relevant_event(before_each: BeforeEachReturn) {
        let (source, store, tx, mut rx) = before_each;
        let listener = PushUpdateListener::new(source, store, tx);
        let disposition = listener
            .on_event(&business_permits(), r#"{"data":{"department":"bpl","number":4}}"#)
            .await;
        assert_eq!(disposition, EventDisposition::Refreshed);
        assert_eq!(rx.try_recv().unwrap(), RefreshRequest { department_id: 1 });
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_ignore_events_for_other_departments(before_each: BeforeEachReturn) {
        let (source, store, tx, mut rx) = before_each;
        let listener = PushUpdateListener::new(source, store, tx);
        let disposition = listener
            .on_event(&business_permits(), r#"{"department":"CRO"}"#)
            .await;
        assert_eq!(disposition, EventDisposition::Irrelevant);
        assert!(rx.try_recv().is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_drop_malformed_events(before_each: BeforeEachReturn) {
        let (source, store, tx, mut rx) = before_each;
        let listener = PushUpdateListener::new(source, store, tx);
        let disposition = listener.on_event(&business_permits(), "{not json").await;
        assert_eq!(disposition, EventDisposition::Malformed);
        assert!(rx.try_recv().is_err());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_not_connect_before_a_department_is_selected(before_each: BeforeEachReturn) {
        let (source, store, tx, _rx) = before_each;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(PushUpdateListener::new(source.clone(), store, tx).run(cancel.clone()));
        settle().await;
        assert_eq!(source.total_connections(), 0);
        cancel.cancel();
        handle.await.unwrap();
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_keep_listening_after_a_malformed_event(before_each: BeforeEachReturn) {
        let (source, store, tx, mut rx) = before_each;
        store.initialize_departments(make_departments()).await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(PushUpdateListener::new(source.clone(), store, tx).run(cancel.clone()));
        settle().await;
        assert_eq!(source.open_connections(), 1);

        source.publish("garbage");
        source.publish_error("connection reset");
        source.publish(r#"{"department":"Business Permits and Licensing"}"#);
        settle().await;

        assert_eq!(rx.try_recv().unwrap(), RefreshRequest { department_id: 1 });
        assert_eq!(source.open_connections(), 1);
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(source.open_connections(), 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_replace_the_connection_on_department_switch(before_each: BeforeEachReturn) {
        let (source, store, tx, mut rx) = before_each;
        store.initialize_departments(make_departments()).await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(
            PushUpdateListener::new(source.clone(), store.clone(), tx).run(cancel.clone()),
        );
        settle().await;

        store.select_department(2).await;
        settle().await;
        assert_eq!(source.total_connections(), 2);
        assert_eq!(source.open_connections(), 1);

        source.publish(r#"{"department":"BPL"}"#);
        source.publish(r#"{"department":"CRO"}"#);
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), RefreshRequest { department_id: 2 });
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        handle.await.unwrap();
    }
}
