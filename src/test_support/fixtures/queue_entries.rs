use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::core::display::queue_entry::{PriorityClass, QueueEntry, QueueStatus};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Waiting regular ticket, created `number` seconds after the fixture base time.
pub struct QueueEntryBuilder {
    inner: QueueEntry,
}

#[allow(dead_code)]
impl QueueEntryBuilder {
    pub fn new(number: u32) -> Self {
        Self {
            inner: QueueEntry {
                id: format!("q-{number}"),
                number,
                department_prefix: None,
                status: QueueStatus::Waiting,
                priority: PriorityClass::Regular,
                counter_name: None,
                created_at: base_time() + Duration::seconds(i64::from(number)),
            },
        }
    }

    pub fn regular(mut self) -> Self {
        self.inner.priority = PriorityClass::Regular;
        self
    }

    pub fn priority(mut self, raw: &str) -> Self {
        self.inner.priority = PriorityClass::parse(raw);
        self
    }

    /// Marks the ticket as being served at `counter`.
    pub fn serving(mut self, counter: Option<&str>) -> Self {
        self.inner.status = QueueStatus::Serving;
        self.inner.counter_name = counter.map(str::to_string);
        self
    }

    pub fn status(mut self, raw: &str) -> Self {
        self.inner.status = QueueStatus::parse(raw);
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.inner.department_prefix = Some(prefix.to_string());
        self
    }

    pub fn created_at_secs(mut self, secs: i64) -> Self {
        self.inner.created_at = base_time() + Duration::seconds(secs);
        self
    }

    pub fn build(self) -> QueueEntry {
        self.inner
    }
}
