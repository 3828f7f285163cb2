use std::sync::Arc;

use tracing::info;

use crate::application::display_store::DisplayStore;
use crate::application::errors::ApplicationError;
use crate::core::display::department::{DepartmentContext, DepartmentId};

pub struct DisplayCommandHandler {
    store: Arc<DisplayStore>,
}

impl DisplayCommandHandler {
    pub fn new(store: Arc<DisplayStore>) -> Self {
        Self { store }
    }

    /// Switches the display. An unknown id leaves the current selection untouched.
    pub async fn select_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<DepartmentContext, ApplicationError> {
        let context = self
            .store
            .select_department(department_id)
            .await
            .ok_or(ApplicationError::UnknownDepartment(department_id))?;
        info!(department_id, department = %context.name, "operator switched department");
        Ok(context)
    }

    /// Returns the new muted state.
    pub async fn toggle_mute(&self) -> Result<bool, ApplicationError> {
        self.store
            .toggle_mute()
            .await
            .ok_or(ApplicationError::AudioControlsDisabled)
    }
}
