use std::sync::Arc;

use crate::application::command_handlers::display_commands::DisplayCommandHandler;
use crate::application::display_store::DisplayStore;
use crate::application::query_handlers::display_queries::DisplayQueryHandler;

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<DisplayCommandHandler>,
    pub queries: Arc<DisplayQueryHandler>,
    pub store: Arc<DisplayStore>,
}

impl AppState {
    pub fn new(store: Arc<DisplayStore>) -> Self {
        Self {
            commands: Arc::new(DisplayCommandHandler::new(store.clone())),
            queries: Arc::new(DisplayQueryHandler::new(store.clone())),
            store,
        }
    }

    #[cfg(test)]
    pub fn in_memory_for_tests() -> Self {
        use crate::core::display::ad_rotation::AdSettings;
        use crate::core::display::state::DisplayFlags;

        Self::new(Arc::new(DisplayStore::new(
            DisplayFlags::default(),
            AdSettings::default(),
            "http://media.local",
        )))
    }
}
