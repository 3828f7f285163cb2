// In memory queue backend.
//
// Purpose
// - Exercise the fetcher, loader and ad runner without a GraphQL server.
//
// Responsibilities
// - Serve canned departments, per-department snapshots and ads.
// - Simulate outages (`toggle_offline`) and slow snapshots (`set_delay`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::display::ad_rotation::AdAsset;
use crate::core::display::department::{Department, DepartmentId};
use crate::core::display::queue_entry::QueueEntry;
use crate::core::ports::{BackendError, QueueBackend};

#[derive(Default)]
pub struct InMemoryBackend {
    departments: Mutex<Vec<Department>>,
    queues: Mutex<HashMap<DepartmentId, Vec<QueueEntry>>>,
    ads: Mutex<Vec<AdAsset>>,
    delays: Mutex<HashMap<DepartmentId, Duration>>,
    queue_fetches: AtomicUsize,
    is_offline: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_departments(&self, departments: Vec<Department>) {
        *lock(&self.departments) = departments;
    }

    pub fn set_queues(&self, department_id: DepartmentId, entries: Vec<QueueEntry>) {
        lock(&self.queues).insert(department_id, entries);
    }

    pub fn set_ads(&self, ads: Vec<AdAsset>) {
        *lock(&self.ads) = ads;
    }

    pub fn set_delay(&self, department_id: DepartmentId, delay: Duration) {
        lock(&self.delays).insert(department_id, delay);
    }

    /// Snapshot requests received so far, including failed ones.
    pub fn queue_fetches(&self) -> usize {
        self.queue_fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("Queue backend offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QueueBackend for InMemoryBackend {
    async fn departments(&self) -> Result<Vec<Department>, BackendError> {
        self.check_online()?;
        Ok(lock(&self.departments).clone())
    }

    async fn queues_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<QueueEntry>, BackendError> {
        self.queue_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = lock(&self.delays).get(&department_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        Ok(lock(&self.queues)
            .get(&department_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn ads(&self) -> Result<Vec<AdAsset>, BackendError> {
        self.check_online()?;
        Ok(lock(&self.ads).clone())
    }
}

#[cfg(test)]
mod in_memory_backend_tests {
    use super::*;
    use crate::test_support::fixtures::departments::make_departments;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_return_an_empty_snapshot_for_an_unknown_department() {
        let backend = InMemoryBackend::new();
        assert!(backend.queues_by_department(5).await.unwrap().is_empty());
        assert_eq!(backend.queue_fetches(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_every_call_while_offline() {
        let backend = InMemoryBackend::new();
        backend.set_departments(make_departments());
        backend.toggle_offline();
        let error = backend.departments().await.unwrap_err();
        assert!(error.to_string().contains("Queue backend offline"));
        assert!(backend.queues_by_department(1).await.is_err());
        assert!(backend.ads().await.is_err());

        backend.toggle_offline();
        assert_eq!(backend.departments().await.unwrap().len(), make_departments().len());
    }
}
