use async_graphql::{Context, Enum, ID, Object, Result as GqlResult, SimpleObject};

use crate::core::display::view::{
    AdKindView, AdPanelView, AdSlideView, DepartmentView, DisplayView, QueuePhaseView, ServingView,
};
use crate::shell::state::AppState;

#[derive(Enum, Clone, Copy, PartialEq, Eq)]
pub enum GqlQueuePhase {
    Loading,
    Ready,
    Unavailable,
}

impl From<QueuePhaseView> for GqlQueuePhase {
    fn from(phase: QueuePhaseView) -> Self {
        match phase {
            QueuePhaseView::Loading => GqlQueuePhase::Loading,
            QueuePhaseView::Ready => GqlQueuePhase::Ready,
            QueuePhaseView::Unavailable => GqlQueuePhase::Unavailable,
        }
    }
}

#[derive(Enum, Clone, Copy, PartialEq, Eq)]
pub enum GqlAdKind {
    Image,
    Video,
}

#[derive(SimpleObject, Clone)]
pub struct GqlDepartment {
    pub id: ID,
    pub name: String,
    pub prefix: String,
}

impl From<DepartmentView> for GqlDepartment {
    fn from(v: DepartmentView) -> Self {
        Self {
            id: ID(v.id.to_string()),
            name: v.name,
            prefix: v.prefix,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlServing {
    pub ticket: String,
    pub counter: String,
}

impl From<ServingView> for GqlServing {
    fn from(v: ServingView) -> Self {
        Self {
            ticket: v.ticket,
            counter: v.counter,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlAdSlide {
    pub id: ID,
    pub filename: String,
    pub mimetype: String,
    pub kind: GqlAdKind,
    pub url: String,
}

impl From<AdSlideView> for GqlAdSlide {
    fn from(v: AdSlideView) -> Self {
        Self {
            id: ID(v.id),
            filename: v.filename,
            mimetype: v.mimetype,
            kind: match v.kind {
                AdKindView::Image => GqlAdKind::Image,
                AdKindView::Video => GqlAdKind::Video,
            },
            url: v.url,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlAdPanel {
    pub enabled: bool,
    pub current: Option<GqlAdSlide>,
    pub muted: bool,
    pub audio_controls: bool,
}

impl From<AdPanelView> for GqlAdPanel {
    fn from(v: AdPanelView) -> Self {
        Self {
            enabled: v.enabled,
            current: v.current.map(Into::into),
            muted: v.muted,
            audio_controls: v.audio_controls,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlDisplay {
    pub phase: GqlQueuePhase,
    pub department: Option<GqlDepartment>,
    pub departments: Vec<GqlDepartment>,
    pub serving: Vec<GqlServing>,
    pub serving_placeholder: Option<String>,
    pub next_regular: Vec<String>,
    pub next_priority: Vec<String>,
    pub ads: GqlAdPanel,
    pub clock: String,
}

impl From<DisplayView> for GqlDisplay {
    fn from(v: DisplayView) -> Self {
        Self {
            phase: v.phase.into(),
            department: v.department.map(Into::into),
            departments: v.departments.into_iter().map(Into::into).collect(),
            serving: v.serving.into_iter().map(Into::into).collect(),
            serving_placeholder: v.serving_placeholder,
            next_regular: v.next_regular,
            next_priority: v.next_priority,
            ads: v.ads.into(),
            clock: v.clock,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The whole TV screen as it should be painted right now.
    async fn display(&self, context: &Context<'_>) -> GqlResult<GqlDisplay> {
        let state = context.data_unchecked::<AppState>();
        Ok(state.queries.display().await.into())
    }

    async fn departments(&self, context: &Context<'_>) -> GqlResult<Vec<GqlDepartment>> {
        let state = context.data_unchecked::<AppState>();
        Ok(state
            .queries
            .departments()
            .await
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn select_department(&self, context: &Context<'_>, id: ID) -> GqlResult<GqlDepartment> {
        let state = context.data_unchecked::<AppState>();
        let department_id = id
            .parse::<i64>()
            .map_err(|_| async_graphql::Error::new(format!("invalid department id {}", *id)))?;
        let selected = state
            .commands
            .select_department(department_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(GqlDepartment {
            id: ID(selected.id.to_string()),
            name: selected.name,
            prefix: selected.prefix,
        })
    }

    /// Returns the new muted state.
    async fn toggle_mute(&self, context: &Context<'_>) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        state
            .commands
            .toggle_mute()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}
