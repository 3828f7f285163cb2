pub type DepartmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub prefix: String,
}

/// The department currently shown on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentContext {
    pub id: DepartmentId,
    pub name: String,
    pub prefix: String,
}

impl From<&Department> for DepartmentContext {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            prefix: d.prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentSelector {
    departments: Option<Vec<Department>>,
    current: Option<DepartmentContext>,
}

impl DepartmentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the department list and defaults the selection to its first element.
    /// Returns true only when this call made the selection.
    pub fn initialize(&mut self, departments: Vec<Department>) -> bool {
        let first = departments.first().map(DepartmentContext::from);
        self.departments = Some(departments);
        if self.current.is_some() {
            return false;
        }
        match first {
            Some(context) => {
                self.current = Some(context);
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, department_id: DepartmentId) -> SelectOutcome {
        let found = self
            .departments
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|d| d.id == department_id)
            .map(DepartmentContext::from);
        match found {
            Some(context) => {
                self.current = Some(context);
                SelectOutcome::Selected
            }
            None => SelectOutcome::NotFound,
        }
    }

    pub fn current(&self) -> Option<&DepartmentContext> {
        self.current.as_ref()
    }

    pub fn departments(&self) -> &[Department] {
        self.departments.as_deref().unwrap_or_default()
    }

    /// True once a department list (possibly empty) has been received.
    pub fn is_loaded(&self) -> bool {
        self.departments.is_some()
    }
}
