use std::sync::Arc;

use chrono::Local;

use crate::application::display_store::DisplayStore;
use crate::core::display::view::{DepartmentView, DisplayView, format_clock};

pub struct DisplayQueryHandler {
    store: Arc<DisplayStore>,
}

impl DisplayQueryHandler {
    pub fn new(store: Arc<DisplayStore>) -> Self {
        Self { store }
    }

    pub async fn display(&self) -> DisplayView {
        self.store.view(format_clock(&Local::now())).await
    }

    pub async fn departments(&self) -> Vec<DepartmentView> {
        self.store
            .read(|s| {
                s.departments()
                    .iter()
                    .map(|d| DepartmentView {
                        id: d.id,
                        name: d.name.clone(),
                        prefix: d.prefix.clone(),
                    })
                    .collect()
            })
            .await
    }
}

#[cfg(test)]
mod display_query_handler_tests {
    use super::*;
    use crate::core::display::ad_rotation::AdSettings;
    use crate::core::display::state::DisplayFlags;
    use crate::core::display::view::QueuePhaseView;
    use crate::test_support::fixtures::departments::make_departments;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_report_loading_until_departments_arrive() {
        let store = Arc::new(DisplayStore::new(
            DisplayFlags::default(),
            AdSettings::default(),
            "http://media.local",
        ));
        let queries = DisplayQueryHandler::new(store.clone());
        let view = queries.display().await;
        assert_eq!(view.phase, QueuePhaseView::Loading);
        assert!(view.department.is_none());
        assert!(queries.departments().await.is_empty());

        store.initialize_departments(make_departments()).await;
        assert_eq!(queries.departments().await.len(), make_departments().len());
        assert!(!queries.display().await.clock.is_empty());
    }
}
