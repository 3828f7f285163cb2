use thiserror::Error;

use crate::core::display::department::DepartmentId;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("department {0} is not known")]
    UnknownDepartment(DepartmentId),

    #[error("audio controls are disabled on this display")]
    AudioControlsDisabled,
}
