// Background workers for the display.
//
// Responsibilities
// - Wire the department loader, snapshot poller, push listener and ad runner to one store.
// - Share one cancellation token so shutdown stops them together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::display_store::DisplayStore;
use crate::application::runners::ad_rotation_runner::AdRotationRunner;
use crate::application::runners::department_loader::DepartmentLoader;
use crate::application::runners::push_listener::PushUpdateListener;
use crate::application::runners::snapshot_fetcher::SnapshotPoller;
use crate::core::ports::{PushEventSource, QueueBackend, SettingsStore};

const REFRESH_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct WorkerIntervals {
    pub queue_poll: Duration,
    pub department_retry: Duration,
    pub settings_poll: Duration,
    pub ad_rotation: Duration,
}

pub struct Workers {
    cancel: CancellationToken,
    tasks: JoinSet<()>,
}

pub fn spawn_workers(
    store: Arc<DisplayStore>,
    backend: Arc<dyn QueueBackend>,
    push_source: Arc<dyn PushEventSource>,
    settings: Arc<dyn SettingsStore>,
    intervals: WorkerIntervals,
) -> Workers {
    let cancel = CancellationToken::new();
    let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_CHANNEL_CAPACITY);
    let mut tasks = JoinSet::new();

    tasks.spawn(
        DepartmentLoader::new(backend.clone(), store.clone(), intervals.department_retry)
            .run(cancel.clone()),
    );
    tasks.spawn(
        SnapshotPoller::new(backend.clone(), store.clone(), intervals.queue_poll)
            .run(refresh_rx, cancel.clone()),
    );
    tasks.spawn(PushUpdateListener::new(push_source, store.clone(), refresh_tx).run(cancel.clone()));
    tasks.spawn(
        AdRotationRunner::new(
            settings,
            backend,
            store,
            intervals.ad_rotation,
            intervals.settings_poll,
        )
        .run(cancel.clone()),
    );
    info!(workers = tasks.len(), "display workers started");

    Workers { cancel, tasks }
}

impl Workers {
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while self.tasks.join_next().await.is_some() {}
        info!("display workers stopped");
    }
}
