// Shared handle on the reconciled display state.
//
// Responsibilities
// - Serialize writers behind one lock; never hold it across backend I/O.
// - Publish every selection change on a watch channel so the fetcher and listener re-arm.

use tokio::sync::{RwLock, watch};

use crate::core::display::ad_rotation::{AdRotation, AdSettings};
use crate::core::display::department::{Department, DepartmentContext, DepartmentId, SelectOutcome};
use crate::core::display::queue_entry::QueueEntry;
use crate::core::display::state::{ApplyOutcome, DisplayFlags, DisplayState, FetchTag};
use crate::core::display::view::DisplayView;

pub struct DisplayStore {
    state: RwLock<DisplayState>,
    selection: watch::Sender<Option<DepartmentContext>>,
    media_base_url: String,
}

impl DisplayStore {
    pub fn new(flags: DisplayFlags, ad_settings: AdSettings, media_base_url: impl Into<String>) -> Self {
        let (selection, _) = watch::channel(None);
        Self {
            state: RwLock::new(DisplayState::new(flags, ad_settings)),
            selection,
            media_base_url: media_base_url.into(),
        }
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Option<DepartmentContext>> {
        self.selection.subscribe()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&DisplayState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn initialize_departments(&self, departments: Vec<Department>) -> Option<DepartmentContext> {
        let mut state = self.state.write().await;
        let selected = state.initialize_departments(departments);
        if let Some(context) = &selected {
            self.selection.send_replace(Some(context.clone()));
        }
        selected
    }

    /// Returns the context that was selected, read under the same write lock.
    /// `None` means the id is unknown and nothing changed.
    pub async fn select_department(&self, department_id: DepartmentId) -> Option<DepartmentContext> {
        let mut state = self.state.write().await;
        if state.select_department(department_id) == SelectOutcome::NotFound {
            return None;
        }
        let selected = state.current_department().cloned();
        self.selection.send_replace(selected.clone());
        selected
    }

    pub async fn fetch_tag(&self) -> Option<FetchTag> {
        self.state.read().await.fetch_tag()
    }

    pub async fn apply_snapshot(&self, tag: FetchTag, entries: &[QueueEntry]) -> ApplyOutcome {
        self.state.write().await.apply_snapshot(tag, entries)
    }

    pub async fn record_fetch_failure(&self, tag: FetchTag) -> ApplyOutcome {
        self.state.write().await.record_fetch_failure(tag)
    }

    pub async fn with_ads<R>(&self, f: impl FnOnce(&mut AdRotation) -> R) -> R {
        f(self.state.write().await.ads_mut())
    }

    pub async fn toggle_mute(&self) -> Option<bool> {
        self.state.write().await.toggle_mute()
    }

    pub async fn view(&self, clock: String) -> DisplayView {
        let state = self.state.read().await;
        DisplayView::build(&state, &self.media_base_url, clock)
    }
}

#[cfg(test)]
mod display_store_tests {
    use super::*;
    use crate::test_support::fixtures::departments::make_departments;
    use rstest::rstest;

    fn store() -> DisplayStore {
        DisplayStore::new(DisplayFlags::default(), AdSettings::default(), "http://media.local")
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_publish_the_first_selection() {
        let store = store();
        let mut selection = store.subscribe_selection();
        assert!(selection.borrow().is_none());

        store.initialize_departments(make_departments()).await;
        selection.changed().await.expect("sender alive");
        assert_eq!(selection.borrow().as_ref().map(|c| c.id), Some(1));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_publish_switches_but_not_unknown_ids() {
        let store = store();
        store.initialize_departments(make_departments()).await;
        let mut selection = store.subscribe_selection();
        selection.borrow_and_update();

        assert_eq!(store.select_department(404).await, None);
        assert!(!selection.has_changed().expect("sender alive"));

        assert_eq!(store.select_department(3).await.map(|c| c.id), Some(3));
        assert!(selection.has_changed().expect("sender alive"));
        assert_eq!(selection.borrow_and_update().as_ref().map(|c| c.id), Some(3));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_each_switch_its_own_department_when_switches_race() {
        let store = std::sync::Arc::new(store());
        store.initialize_departments(make_departments()).await;

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.select_department(2).await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.select_department(4).await }
        });

        let first = first.await.expect("task completes").expect("known id");
        let second = second.await.expect("task completes").expect("known id");
        assert_eq!((first.id, first.prefix.as_str()), (2, "CRO"));
        assert_eq!((second.id, second.prefix.as_str()), (4, "MTO"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_reselect_on_a_second_department_load() {
        let store = store();
        store.initialize_departments(make_departments()).await;
        store.select_department(2).await;
        assert!(store.initialize_departments(make_departments()).await.is_none());
        assert_eq!(store.read(|s| s.current_department().map(|c| c.id)).await, Some(2));
    }
}
