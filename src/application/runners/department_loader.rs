// Boot step: nothing is fetched or subscribed until the department list arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::display_store::DisplayStore;
use crate::core::display::department::DepartmentContext;
use crate::core::ports::{BackendError, QueueBackend};

pub struct DepartmentLoader<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    backend: Arc<TBackend>,
    store: Arc<DisplayStore>,
    retry_interval: Duration,
}

impl<TBackend> DepartmentLoader<TBackend>
where
    TBackend: QueueBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<TBackend>, store: Arc<DisplayStore>, retry_interval: Duration) -> Self {
        Self {
            backend,
            store,
            retry_interval,
        }
    }

    pub async fn load_once(&self) -> Result<Option<DepartmentContext>, BackendError> {
        let departments = self.backend.departments().await?;
        info!(departments = departments.len(), "department list loaded");
        let selected = self.store.initialize_departments(departments).await;
        match &selected {
            Some(context) => info!(
                department_id = context.id,
                department = %context.name,
                "displaying first department"
            ),
            None => warn!("no departments to display"),
        }
        Ok(selected)
    }

    pub async fn run(self, cancel: CancellationToken) {
        loop {
            match self.load_once().await {
                Ok(_) => return,
                Err(error) => warn!(%error, "department list unavailable; retrying"),
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(self.retry_interval) => {}
            }
        }
    }
}
