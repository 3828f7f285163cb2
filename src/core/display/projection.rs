// Queue projection: turns a raw department snapshot into what the display shows.
//
// Purpose
// - Decide who is being served now and who is next, per priority class.
//
// Boundaries
// - Pure. No clock, no I/O, no hidden state. Same snapshot and prefix give the same projection.

use crate::core::display::queue_entry::{PriorityClass, QueueEntry, QueueStatus};

pub const NEXT_TICKETS_PER_CLASS: usize = 3;
pub const UNKNOWN_COUNTER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServingTicket {
    pub ticket_label: String,
    pub counter_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub serving: Vec<ServingTicket>,
    pub next_regular: Vec<String>,
    pub next_priority: Vec<String>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.serving.is_empty() && self.next_regular.is_empty() && self.next_priority.is_empty()
    }
}

/// `prefix-number`, unpadded. The entry's own department prefix wins over the selected one.
pub fn ticket_label(entry: &QueueEntry, selected_prefix: &str) -> String {
    let prefix = entry
        .department_prefix
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(selected_prefix);
    format!("{prefix}-{}", entry.number)
}

pub fn project(entries: &[QueueEntry], selected_prefix: &str) -> Projection {
    let serving = entries
        .iter()
        .filter(|e| e.status == QueueStatus::Serving)
        .map(|e| ServingTicket {
            ticket_label: ticket_label(e, selected_prefix),
            counter_label: e
                .counter_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_COUNTER.to_string()),
        })
        .collect();

    let mut waiting: Vec<&QueueEntry> = entries
        .iter()
        .filter(|e| e.status == QueueStatus::Waiting)
        .collect();
    // Stable, so equal timestamps keep snapshot order.
    waiting.sort_by_key(|e| e.created_at);

    let next_of = |class: PriorityClass| -> Vec<String> {
        waiting
            .iter()
            .filter(|e| e.priority == class)
            .take(NEXT_TICKETS_PER_CLASS)
            .map(|e| ticket_label(e, selected_prefix))
            .collect()
    };

    Projection {
        serving,
        next_regular: next_of(PriorityClass::Regular),
        next_priority: next_of(PriorityClass::Priority),
    }
}
