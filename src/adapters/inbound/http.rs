use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::application::errors::ApplicationError;
use crate::core::display::department::DepartmentId;
use crate::core::display::view::DepartmentView;
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub departments_loaded: bool,
}

pub async fn display(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.queries.display().await)
}

pub async fn select_department(
    State(state): State<AppState>,
    Path(department_id): Path<DepartmentId>,
) -> impl IntoResponse {
    match state.commands.select_department(department_id).await {
        Ok(selected) => Json(DepartmentView {
            id: selected.id,
            name: selected.name,
            prefix: selected.prefix,
        })
        .into_response(),
        Err(ApplicationError::UnknownDepartment(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let departments_loaded = state.store.read(|s| s.departments_loaded()).await;
    Json(HealthResponse {
        status: "ok",
        departments_loaded,
    })
}
