// Reconciled display state: department selection, queue projection and ad rotation.
//
// Purpose
// - Single owner of the projection. Only accepted snapshots (through `project`) write it.
//
// Responsibilities
// - Tag every fetch with the selection it was issued for and refuse stale results.
// - Clear the projection synchronously on every department switch.

use crate::core::display::ad_rotation::{AdAsset, AdRotation, AdSettings};
use crate::core::display::department::{
    Department, DepartmentContext, DepartmentId, DepartmentSelector, SelectOutcome,
};
use crate::core::display::projection::{Projection, project};
use crate::core::display::queue_entry::QueueEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPhase {
    /// No snapshot accepted yet for the current selection.
    Loading,
    Ready,
    /// The last fetch for the current selection failed.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    pub department_id: DepartmentId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub multi_serving: bool,
    pub audio_controls: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            multi_serving: true,
            audio_controls: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayState {
    selector: DepartmentSelector,
    generation: u64,
    projection: Projection,
    phase: SnapshotPhase,
    ads: AdRotation,
    muted: bool,
    flags: DisplayFlags,
}

impl DisplayState {
    pub fn new(flags: DisplayFlags, ad_settings: AdSettings) -> Self {
        Self {
            selector: DepartmentSelector::new(),
            generation: 0,
            projection: Projection::default(),
            phase: SnapshotPhase::Loading,
            ads: AdRotation::new(ad_settings),
            muted: true,
            flags,
        }
    }

    /// Returns the new context when this call made the first selection.
    pub fn initialize_departments(&mut self, departments: Vec<Department>) -> Option<DepartmentContext> {
        if self.selector.initialize(departments) {
            self.reset_for_new_selection();
            return self.selector.current().cloned();
        }
        None
    }

    pub fn select_department(&mut self, department_id: DepartmentId) -> SelectOutcome {
        let outcome = self.selector.select(department_id);
        if outcome == SelectOutcome::Selected {
            self.reset_for_new_selection();
        }
        outcome
    }

    fn reset_for_new_selection(&mut self) {
        self.generation += 1;
        self.projection = Projection::default();
        self.phase = SnapshotPhase::Loading;
    }

    pub fn current_department(&self) -> Option<&DepartmentContext> {
        self.selector.current()
    }

    pub fn departments(&self) -> &[Department] {
        self.selector.departments()
    }

    pub fn departments_loaded(&self) -> bool {
        self.selector.is_loaded()
    }

    /// Tag for a fetch issued now, or `None` while nothing is selected.
    pub fn fetch_tag(&self) -> Option<FetchTag> {
        self.selector.current().map(|c| FetchTag {
            department_id: c.id,
            generation: self.generation,
        })
    }

    fn is_current(&self, tag: FetchTag) -> bool {
        self.fetch_tag() == Some(tag)
    }

    pub fn apply_snapshot(&mut self, tag: FetchTag, entries: &[QueueEntry]) -> ApplyOutcome {
        if !self.is_current(tag) {
            return ApplyOutcome::Discarded;
        }
        let prefix = self
            .selector
            .current()
            .map(|c| c.prefix.as_str())
            .unwrap_or_default();
        self.projection = project(entries, prefix);
        self.phase = SnapshotPhase::Ready;
        ApplyOutcome::Applied
    }

    pub fn record_fetch_failure(&mut self, tag: FetchTag) -> ApplyOutcome {
        if !self.is_current(tag) {
            return ApplyOutcome::Discarded;
        }
        self.projection = Projection::default();
        self.phase = SnapshotPhase::Unavailable;
        ApplyOutcome::Applied
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn phase(&self) -> SnapshotPhase {
        self.phase
    }

    pub fn set_ad_catalog(&mut self, catalog: Vec<AdAsset>) {
        self.ads.set_catalog(catalog);
    }

    pub fn ads(&self) -> &AdRotation {
        &self.ads
    }

    pub fn ads_mut(&mut self) -> &mut AdRotation {
        &mut self.ads
    }

    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flips the video-ad mute state. `None` when audio controls are disabled.
    pub fn toggle_mute(&mut self) -> Option<bool> {
        if !self.flags.audio_controls {
            return None;
        }
        self.muted = !self.muted;
        Some(self.muted)
    }
}

#[cfg(test)]
mod display_state_tests {
    use super::*;
    use crate::test_support::fixtures::departments::make_departments;
    use crate::test_support::fixtures::queue_entries::QueueEntryBuilder;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> DisplayState {
        let mut state = DisplayState::new(DisplayFlags::default(), AdSettings::default());
        state.initialize_departments(make_departments());
        state
    }

    fn snapshot() -> Vec<QueueEntry> {
        vec![
            QueueEntryBuilder::new(1).serving(Some("Counter 1")).build(),
            QueueEntryBuilder::new(2).regular().build(),
            QueueEntryBuilder::new(3).priority("PWD").build(),
        ]
    }

    #[rstest]
    fn it_should_start_loading_without_a_fetch_tag() {
        let state = DisplayState::new(DisplayFlags::default(), AdSettings::default());
        assert_eq!(state.phase(), SnapshotPhase::Loading);
        assert!(state.fetch_tag().is_none());
        assert!(!state.departments_loaded());
    }

    #[rstest]
    fn it_should_apply_a_snapshot_for_the_current_selection(mut state: DisplayState) {
        let tag = state.fetch_tag().expect("selected");
        assert_eq!(state.apply_snapshot(tag, &snapshot()), ApplyOutcome::Applied);
        assert_eq!(state.phase(), SnapshotPhase::Ready);
        assert_eq!(state.projection().serving[0].ticket_label, "BPL-1");
        assert_eq!(state.projection().next_regular, vec!["BPL-2"]);
        assert_eq!(state.projection().next_priority, vec!["BPL-3"]);
    }

    #[rstest]
    fn it_should_clear_the_projection_on_department_switch(mut state: DisplayState) {
        let tag = state.fetch_tag().expect("selected");
        state.apply_snapshot(tag, &snapshot());
        assert_eq!(state.select_department(2), SelectOutcome::Selected);
        assert!(state.projection().is_empty());
        assert_eq!(state.phase(), SnapshotPhase::Loading);
    }

    #[rstest]
    fn it_should_discard_a_snapshot_issued_for_a_previous_department(mut state: DisplayState) {
        let stale = state.fetch_tag().expect("selected");
        state.select_department(2);
        assert_eq!(state.apply_snapshot(stale, &snapshot()), ApplyOutcome::Discarded);
        assert!(state.projection().is_empty());
        assert_eq!(state.record_fetch_failure(stale), ApplyOutcome::Discarded);
        assert_eq!(state.phase(), SnapshotPhase::Loading);
    }

    #[rstest]
    fn it_should_discard_a_snapshot_from_before_a_reselection(mut state: DisplayState) {
        let stale = state.fetch_tag().expect("selected");
        state.select_department(1);
        assert_eq!(stale.department_id, state.fetch_tag().map(|t| t.department_id).unwrap());
        assert_eq!(state.apply_snapshot(stale, &snapshot()), ApplyOutcome::Discarded);
    }

    #[rstest]
    fn it_should_keep_everything_on_unknown_department(mut state: DisplayState) {
        let tag = state.fetch_tag().expect("selected");
        state.apply_snapshot(tag, &snapshot());
        assert_eq!(state.select_department(42), SelectOutcome::NotFound);
        assert_eq!(state.fetch_tag(), Some(tag));
        assert!(!state.projection().is_empty());
    }

    #[rstest]
    fn it_should_show_an_empty_projection_after_a_failed_fetch(mut state: DisplayState) {
        let tag = state.fetch_tag().expect("selected");
        state.apply_snapshot(tag, &snapshot());
        assert_eq!(state.record_fetch_failure(tag), ApplyOutcome::Applied);
        assert_eq!(state.phase(), SnapshotPhase::Unavailable);
        assert!(state.projection().is_empty());
    }

    #[rstest]
    fn it_should_toggle_mute_only_with_audio_controls() {
        let mut with_audio = DisplayState::new(DisplayFlags::default(), AdSettings::default());
        assert!(with_audio.is_muted());
        assert_eq!(with_audio.toggle_mute(), Some(false));

        let mut without_audio = DisplayState::new(
            DisplayFlags {
                multi_serving: true,
                audio_controls: false,
            },
            AdSettings::default(),
        );
        assert_eq!(without_audio.toggle_mute(), None);
        assert!(without_audio.is_muted());
    }
}
