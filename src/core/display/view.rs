use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;

use crate::core::display::ad_rotation::{AdKind, resolve_media_url};
use crate::core::display::department::DepartmentId;
use crate::core::display::state::{DisplayState, SnapshotPhase};

pub const WAITING_PLACEHOLDER: &str = "Waiting for queue...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentView {
    pub id: DepartmentId,
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingView {
    pub ticket: String,
    pub counter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdKindView {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSlideView {
    pub id: String,
    pub filename: String,
    pub mimetype: String,
    pub kind: AdKindView,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPanelView {
    /// False hides the whole ad section.
    pub enabled: bool,
    /// `None` renders the "Advertisement / Coming Soon" placeholder.
    pub current: Option<AdSlideView>,
    pub muted: bool,
    pub audio_controls: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueuePhaseView {
    Loading,
    Ready,
    Unavailable,
}

impl From<SnapshotPhase> for QueuePhaseView {
    fn from(phase: SnapshotPhase) -> Self {
        match phase {
            SnapshotPhase::Loading => QueuePhaseView::Loading,
            SnapshotPhase::Ready => QueuePhaseView::Ready,
            SnapshotPhase::Unavailable => QueuePhaseView::Unavailable,
        }
    }
}

/// Everything the TV page paints, in one render-ready value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayView {
    pub phase: QueuePhaseView,
    pub department: Option<DepartmentView>,
    pub departments: Vec<DepartmentView>,
    pub serving: Vec<ServingView>,
    pub serving_placeholder: Option<String>,
    pub next_regular: Vec<String>,
    pub next_priority: Vec<String>,
    pub ads: AdPanelView,
    pub clock: String,
}

pub fn format_clock<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%I:%M %p").to_string()
}

impl DisplayView {
    pub fn build(state: &DisplayState, media_base_url: &str, clock: String) -> Self {
        let projection = state.projection();
        let flags = state.flags();

        let mut serving: Vec<ServingView> = projection
            .serving
            .iter()
            .map(|s| ServingView {
                ticket: s.ticket_label.clone(),
                counter: s.counter_label.clone(),
            })
            .collect();
        if !flags.multi_serving {
            serving.truncate(1);
        }

        let serving_placeholder = match state.phase() {
            SnapshotPhase::Loading => Some("Loading...".to_string()),
            _ if serving.is_empty() => Some(WAITING_PLACEHOLDER.to_string()),
            _ => None,
        };

        let current = state.ads().current().and_then(|ad| {
            let kind = match ad.kind() {
                AdKind::Image => AdKindView::Image,
                AdKind::Video => AdKindView::Video,
                AdKind::Unsupported => return None,
            };
            Some(AdSlideView {
                id: ad.id.clone(),
                filename: ad.filename.clone(),
                mimetype: ad.mimetype.clone(),
                kind,
                url: resolve_media_url(media_base_url, &ad.filepath),
            })
        });

        Self {
            phase: state.phase().into(),
            department: state.current_department().map(|c| DepartmentView {
                id: c.id,
                name: c.name.clone(),
                prefix: c.prefix.clone(),
            }),
            departments: state
                .departments()
                .iter()
                .map(|d| DepartmentView {
                    id: d.id,
                    name: d.name.clone(),
                    prefix: d.prefix.clone(),
                })
                .collect(),
            serving,
            serving_placeholder,
            next_regular: projection.next_regular.clone(),
            next_priority: projection.next_priority.clone(),
            ads: AdPanelView {
                enabled: state.ads().settings().show_ads_globally,
                current,
                muted: state.is_muted(),
                audio_controls: flags.audio_controls,
            },
            clock,
        }
    }
}
