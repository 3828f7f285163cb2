// Snapshot fetcher and poller.
//
// Purpose
// - Replace the projection with a full department snapshot on a timer, on push-driven
//   refresh requests, and right after a department switch.
//
// Responsibilities
// - Never cancel an in-flight fetch while running; each one is its own task and applies on
//   arrival. On shutdown the outstanding fetches are aborted and awaited.
// - Tag every fetch so results for a superseded selection are discarded.
// - Keep polling through backend failures.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::display_store::DisplayStore;
use crate::core::display::department::DepartmentId;
use crate::core::display::state::{ApplyOutcome, FetchTag};
use crate::core::ports::QueueBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub department_id: DepartmentId,
}

pub struct SnapshotFetcher<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    backend: Arc<TBackend>,
    store: Arc<DisplayStore>,
}

impl<TBackend> SnapshotFetcher<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<TBackend>, store: Arc<DisplayStore>) -> Self {
        Self { backend, store }
    }

    pub async fn fetch(&self, tag: FetchTag) -> ApplyOutcome {
        let fetch_id = Uuid::now_v7();
        let outcome = match self.backend.queues_by_department(tag.department_id).await {
            Ok(entries) => {
                let outcome = self.store.apply_snapshot(tag, &entries).await;
                debug!(
                    %fetch_id,
                    department_id = tag.department_id,
                    entries = entries.len(),
                    ?outcome,
                    "queue snapshot received"
                );
                outcome
            }
            Err(error) => {
                warn!(
                    %fetch_id,
                    department_id = tag.department_id,
                    %error,
                    "queue snapshot fetch failed; retrying on next tick"
                );
                self.store.record_fetch_failure(tag).await
            }
        };
        if outcome == ApplyOutcome::Discarded {
            debug!(%fetch_id, department_id = tag.department_id, "discarded snapshot for a superseded selection");
        }
        outcome
    }
}

pub struct SnapshotPoller<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    fetcher: Arc<SnapshotFetcher<TBackend>>,
    store: Arc<DisplayStore>,
    poll_interval: Duration,
}

impl<TBackend> SnapshotPoller<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<TBackend>, store: Arc<DisplayStore>, poll_interval: Duration) -> Self {
        Self {
            fetcher: Arc::new(SnapshotFetcher::new(backend, store.clone())),
            store,
            poll_interval,
        }
    }

    async fn spawn_fetch(&self, in_flight: &mut JoinSet<ApplyOutcome>, trigger: &'static str) {
        let Some(tag) = self.store.fetch_tag().await else {
            debug!(trigger, "no department selected; skipping snapshot fetch");
            return;
        };
        let fetcher = self.fetcher.clone();
        debug!(trigger, department_id = tag.department_id, "fetching queue snapshot");
        in_flight.spawn(async move { fetcher.fetch(tag).await });
    }

    pub async fn run(self, mut refresh: mpsc::Receiver<RefreshRequest>, cancel: CancellationToken) {
        let mut selection = self.store.subscribe_selection();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(in_flight = in_flight.len(), "snapshot poller shutting down");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(error) = joined {
                        warn!(%error, "queue snapshot task failed");
                    }
                }
                _ = ticker.tick() => self.spawn_fetch(&mut in_flight, "poll").await,
                Some(request) = refresh.recv() => {
                    let current = self.store.fetch_tag().await.map(|t| t.department_id);
                    if current == Some(request.department_id) {
                        self.spawn_fetch(&mut in_flight, "push").await;
                    } else {
                        debug!(department_id = request.department_id, "ignoring refresh for a department no longer shown");
                    }
                }
                changed = selection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    ticker.reset();
                    self.spawn_fetch(&mut in_flight, "selection").await;
                }
            }
        }
        in_flight.shutdown().await;
    }
}
