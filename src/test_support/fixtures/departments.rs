use crate::core::display::department::Department;

/// The municipal departments, in the order the backend lists them.
pub fn make_departments() -> Vec<Department> {
    [
        (1, "Business Permits and Licensing", "BPL"),
        (2, "Civil Registry Office", "CRO"),
        (3, "Municipal Assessor's Office", "MAO"),
        (4, "Municipal Treasurer's Office", "MTO"),
        (5, "Municipal Planning Office", "MPO"),
        (6, "Social Services", "SSO"),
        (7, "Municipal Mayor's Office", "MMO"),
        (8, "Municipal Engineering Office", "MEO"),
    ]
    .into_iter()
    .map(|(id, name, prefix)| Department {
        id,
        name: name.to_string(),
        prefix: prefix.to_string(),
    })
    .collect()
}
