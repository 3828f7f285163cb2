use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
    Waiting,
    Serving,
    Done,
    Cancelled,
    Other(String),
}

impl QueueStatus {
    /// Backend statuses are free text; matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WAITING" => QueueStatus::Waiting,
            "SERVING" => QueueStatus::Serving,
            "DONE" | "COMPLETED" => QueueStatus::Done,
            "CANCELLED" | "CANCELED" => QueueStatus::Cancelled,
            _ => QueueStatus::Other(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    Regular,
    Priority,
}

impl PriorityClass {
    /// Anything that is not literally "regular" (senior, PWD, pregnant, ...) is priority.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("regular") {
            PriorityClass::Regular
        } else {
            PriorityClass::Priority
        }
    }
}

/// One citizen's ticket as returned by a department snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: String,
    pub number: u32,
    pub department_prefix: Option<String>,
    pub status: QueueStatus,
    pub priority: PriorityClass,
    pub counter_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
