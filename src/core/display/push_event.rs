// Push events announcing that some department's queue changed.
//
// Senders identify the department by name or prefix, never by id, and either wrap the
// fields in a `data` envelope or send them at top level. Both shapes decode here.

use serde::Deserialize;
use serde_json::Value;

use crate::core::display::department::DepartmentContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueChangeEvent {
    pub department: String,
    pub number: Option<String>,
    pub service: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueueChangeFields {
    #[serde(default)]
    department: Option<Value>,
    #[serde(default)]
    number: Option<Value>,
    #[serde(default)]
    service: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PushPayload {
    Envelope { data: QueueChangeFields },
    Bare(QueueChangeFields),
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl QueueChangeEvent {
    /// Returns `None` for payloads that are not JSON objects in either accepted shape.
    pub fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if !value.is_object() {
            return None;
        }
        let fields = match serde_json::from_value::<PushPayload>(value).ok()? {
            PushPayload::Envelope { data } => data,
            PushPayload::Bare(fields) => fields,
        };
        Some(Self {
            department: scalar_text(fields.department).unwrap_or_default(),
            number: scalar_text(fields.number),
            service: scalar_text(fields.service),
        })
    }

    /// Case-insensitive match of the event department against the prefix or the name,
    /// exact or as a substring either way round. An empty side is a substring of
    /// anything, so a missing department or an empty prefix always matches.
    pub fn is_relevant_to(&self, context: &DepartmentContext) -> bool {
        let event = normalize(&self.department);
        let prefix = normalize(&context.prefix);
        let name = normalize(&context.name);

        [prefix, name].iter().any(|candidate| {
            event == *candidate || event.contains(candidate.as_str()) || candidate.contains(&event)
        })
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}
