// Shared test fixtures, compiled only for unit tests.

pub mod ads;
pub mod departments;
pub mod queue_entries;
