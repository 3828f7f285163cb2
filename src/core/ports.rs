// Ports define what the display core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the queue backend, the push stream and the settings store as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - In memory implementations live in adapters::in_memory and support `toggle_offline`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::core::display::ad_rotation::AdAsset;
use crate::core::display::department::{Department, DepartmentId};
use crate::core::display::queue_entry::QueueEntry;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend responded with status {0}")]
    Status(u16),

    #[error("graphql errors: {0}")]
    GraphQl(String),

    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait QueueBackend: Send + Sync {
    async fn departments(&self) -> Result<Vec<Department>, BackendError>;
    async fn queues_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<QueueEntry>, BackendError>;
    async fn ads(&self) -> Result<Vec<AdAsset>, BackendError>;
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push connection failed: {0}")]
    Connect(String),

    #[error("push endpoint responded with status {0}")]
    Status(u16),

    #[error("push stream error: {0}")]
    Stream(String),

    #[error("push stream closed by the server")]
    Closed,
}

/// Raw message payloads from the shared push stream. Errors are informational: the
/// transport reconnects on its own and keeps yielding.
pub type PushStream = BoxStream<'static, Result<String, PushError>>;

pub trait PushEventSource: Send + Sync {
    /// Opens a new connection. Dropping the stream closes it.
    fn subscribe(&self) -> PushStream;
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),

    #[error("settings store is not a JSON object: {0}")]
    Decode(String),
}

/// String-valued key/value store written by the admin surface.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
}
