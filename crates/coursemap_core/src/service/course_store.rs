//! Course store: the single owner of course state.
//!
//! # Responsibility
//! - Load state from key-value storage once, at construction.
//! - Expose read accessors and graph projections to the canvas layer.
//! - Apply mutations through the tree engine and save after each one.
//!
//! # Invariants
//! - In-memory state is the source of truth; storage failures after a
//!   mutation are logged and never undo or fail the mutation.
//! - No-op mutations (unresolved paths) do not write to storage.
//! - Loaded state is normalized before any accessor sees it.

use crate::config::StoreOptions;
use crate::ids::{Clock, EntityId, SystemClock};
use crate::model::draft::{
    CourseDraft, CoursePatch, ModuleDraft, ModulePatch, StickyDraft, StickyPatch, TaskDraft,
    TaskPatch,
};
use crate::model::entity::{Course, EntityKind, EntityRef, Module, Sticky, Task};
use crate::model::geometry::Position;
use crate::projection::{derive_edges, flatten_visible_nodes, Connection, MindMapNode};
use crate::service::state::{StateEnvelope, StoreState, STATE_VERSION};
use crate::service::summary::{sample_course_drafts, CourseSummary, TaskProgress};
use crate::service::StoreError;
use crate::storage::KeyValueStore;
use crate::tree::path::NodePath;
use log::{debug, info, warn};

/// Stateful facade used by the hosting application.
///
/// Construct one per composition root and pass it by reference; tests may
/// create as many independent instances as they need.
pub struct CourseStore<S: KeyValueStore> {
    storage: S,
    options: StoreOptions,
    clock: Box<dyn Clock>,
    state: StoreState,
}

impl<S: KeyValueStore> CourseStore<S> {
    /// Loads state with default options, falling back to an empty state
    /// when the stored blob cannot be read.
    pub fn load(storage: S) -> Self {
        Self::load_with_options(storage, StoreOptions::default())
    }

    /// Same as [`CourseStore::load`] with explicit options.
    pub fn load_with_options(storage: S, options: StoreOptions) -> Self {
        let state = match read_state(&storage, &options) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error fallback=empty key={} error={}",
                    options.storage_key, err
                );
                StoreState::default()
            }
        };
        Self::from_parts(storage, options, state)
    }

    /// Loads state with default options, surfacing unreadable blobs.
    pub fn try_load(storage: S) -> Result<Self, StoreError> {
        Self::try_load_with_options(storage, StoreOptions::default())
    }

    /// Same as [`CourseStore::try_load`] with explicit options.
    ///
    /// # Errors
    /// - `Storage` when the backend cannot be read.
    /// - `MalformedState` when the blob is not a valid state document.
    /// - `UnsupportedStateVersion` when the blob was written by a newer build.
    pub fn try_load_with_options(storage: S, options: StoreOptions) -> Result<Self, StoreError> {
        let state = read_state(&storage, &options)?;
        Ok(Self::from_parts(storage, options, state))
    }

    /// Replaces the clock used for `created_at`/`updated_at`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn from_parts(storage: S, options: StoreOptions, state: StoreState) -> Self {
        info!(
            "event=store_load module=store status=ok key={} courses={}",
            options.storage_key,
            state.courses.len()
        );
        Self {
            storage,
            options,
            clock: Box::new(SystemClock),
            state,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Full serializable state.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn courses(&self) -> &[Course] {
        self.state.courses.courses()
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.state.courses.course(course_id)
    }

    pub fn module(&self, course_id: &str, module_id: &str) -> Option<&Module> {
        self.state.courses.module(course_id, module_id)
    }

    pub fn sticky(&self, course_id: &str, module_id: &str, sticky_id: &str) -> Option<&Sticky> {
        self.state.courses.sticky(course_id, module_id, sticky_id)
    }

    pub fn task(
        &self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
    ) -> Option<&Task> {
        self.state
            .courses
            .task(course_id, module_id, sticky_id, task_id)
    }

    pub fn entity(&self, path: &NodePath) -> Option<EntityRef<'_>> {
        self.state.courses.entity(path)
    }

    /// Visible nodes across every course.
    pub fn all_nodes(&self) -> Vec<MindMapNode> {
        flatten_visible_nodes(self.courses(), None)
    }

    /// Visible connections across every course.
    pub fn connections(&self) -> Vec<Connection> {
        derive_edges(self.courses(), None)
    }

    pub fn all_nodes_for_course(&self, course_id: &str) -> Vec<MindMapNode> {
        flatten_visible_nodes(self.courses(), Some(course_id))
    }

    pub fn connections_for_course(&self, course_id: &str) -> Vec<Connection> {
        derive_edges(self.courses(), Some(course_id))
    }

    pub fn canvas_offset(&self) -> Position {
        self.state.canvas_offset
    }

    pub fn canvas_scale(&self) -> f64 {
        self.state.canvas_scale
    }

    pub fn course_summary(&self, course_id: &str) -> Option<CourseSummary> {
        self.course(course_id).map(CourseSummary::of)
    }

    pub fn sticky_progress(
        &self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
    ) -> Option<TaskProgress> {
        self.sticky(course_id, module_id, sticky_id)
            .map(TaskProgress::of)
    }

    pub fn add_course(&mut self, draft: CourseDraft, position: Option<Position>) -> EntityId {
        let now = self.clock.now();
        let id = self.state.courses.add_course(draft, position, now);
        self.commit("node_add", EntityKind::Course, &id, true);
        id
    }

    pub fn add_module(
        &mut self,
        course_id: &str,
        draft: ModuleDraft,
        position: Option<Position>,
    ) -> Option<EntityId> {
        let now = self.clock.now();
        let id = self
            .state
            .courses
            .add_module(course_id, draft, position, now);
        self.commit_created(EntityKind::Module, course_id, id)
    }

    pub fn add_sticky(
        &mut self,
        course_id: &str,
        module_id: &str,
        draft: StickyDraft,
        position: Option<Position>,
    ) -> Option<EntityId> {
        let now = self.clock.now();
        let id = self
            .state
            .courses
            .add_sticky(course_id, module_id, draft, position, now);
        self.commit_created(EntityKind::Sticky, module_id, id)
    }

    pub fn add_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        draft: TaskDraft,
        position: Option<Position>,
    ) -> Option<EntityId> {
        let now = self.clock.now();
        let id = self
            .state
            .courses
            .add_task(course_id, module_id, sticky_id, draft, position, now);
        self.commit_created(EntityKind::Task, sticky_id, id)
    }

    pub fn update_course(&mut self, course_id: &str, patch: CoursePatch) -> bool {
        let now = self.clock.now();
        let applied = self.state.courses.update_course(course_id, patch, now);
        self.commit("node_update", EntityKind::Course, course_id, applied)
    }

    pub fn update_module(&mut self, course_id: &str, module_id: &str, patch: ModulePatch) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .update_module(course_id, module_id, patch, now);
        self.commit("node_update", EntityKind::Module, module_id, applied)
    }

    pub fn update_sticky(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        patch: StickyPatch,
    ) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .update_sticky(course_id, module_id, sticky_id, patch, now);
        self.commit("node_update", EntityKind::Sticky, sticky_id, applied)
    }

    pub fn update_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .update_task(course_id, module_id, sticky_id, task_id, patch, now);
        self.commit("node_update", EntityKind::Task, task_id, applied)
    }

    /// Deletes a course and its subtree. Confirmation is the caller's job.
    pub fn delete_course(&mut self, course_id: &str) -> bool {
        let applied = self.state.courses.delete_course(course_id);
        self.commit("node_delete", EntityKind::Course, course_id, applied)
    }

    pub fn delete_module(&mut self, course_id: &str, module_id: &str) -> bool {
        let now = self.clock.now();
        let applied = self.state.courses.delete_module(course_id, module_id, now);
        self.commit("node_delete", EntityKind::Module, module_id, applied)
    }

    pub fn delete_sticky(&mut self, course_id: &str, module_id: &str, sticky_id: &str) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .delete_sticky(course_id, module_id, sticky_id, now);
        self.commit("node_delete", EntityKind::Sticky, sticky_id, applied)
    }

    pub fn delete_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
    ) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .delete_task(course_id, module_id, sticky_id, task_id, now);
        self.commit("node_delete", EntityKind::Task, task_id, applied)
    }

    /// Moves one node, typically at the end of a drag gesture.
    pub fn update_node_position(&mut self, path: &NodePath, position: Position) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .update_node_position(path, position, now);
        self.commit("node_move", path.kind(), path.target_id(), applied)
    }

    /// Flips collapse state of a course, module or sticky.
    pub fn toggle_node_collapse(&mut self, path: &NodePath) -> bool {
        let now = self.clock.now();
        let applied = self.state.courses.toggle_collapse(path, now);
        self.commit("node_collapse", path.kind(), path.target_id(), applied)
    }

    pub fn toggle_task_completion(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
    ) -> bool {
        let now = self.clock.now();
        let applied = self
            .state
            .courses
            .toggle_task_completion(course_id, module_id, sticky_id, task_id, now);
        self.commit("task_complete", EntityKind::Task, task_id, applied)
    }

    /// Stores the canvas pan/zoom. Scale is clamped to the configured range;
    /// non-finite input is ignored.
    pub fn update_canvas_transform(&mut self, offset: Position, scale: f64) -> bool {
        let Some(scale) = self.options.clamp_scale(scale).filter(|_| offset.is_finite()) else {
            debug!("event=canvas_transform module=store status=noop reason=non_finite");
            return false;
        };
        self.state.canvas_offset = offset;
        self.state.canvas_scale = scale;
        debug!("event=canvas_transform module=store status=ok scale={scale}");
        self.persist();
        true
    }

    /// Restores the default pan/zoom.
    pub fn reset_canvas_view(&mut self) {
        self.update_canvas_transform(Position::ORIGIN, 1.0);
    }

    /// Adds the starter courses when there are none. Returns how many were
    /// added.
    pub fn seed_sample_courses(&mut self) -> usize {
        if !self.state.courses.is_empty() {
            return 0;
        }
        let drafts = sample_course_drafts();
        let count = drafts.len();
        for draft in drafts {
            let now = self.clock.now();
            self.state.courses.add_course(draft, None, now);
        }
        info!("event=store_seed module=store status=ok courses={count}");
        self.persist();
        count
    }

    /// Writes the current state to storage.
    ///
    /// Mutations already call this implicitly; use it for an explicit flush.
    pub fn save(&self) -> Result<(), StoreError> {
        let envelope = StateEnvelope {
            state: &self.state,
            version: STATE_VERSION,
        };
        let blob = serde_json::to_string(&envelope).map_err(StoreError::MalformedState)?;
        self.storage.set_item(&self.options.storage_key, &blob)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(
                "event=state_save module=persistence status=error key={} error={}",
                self.options.storage_key, err
            );
        }
    }

    fn commit(&self, event: &str, kind: EntityKind, target_id: &str, applied: bool) -> bool {
        if applied {
            debug!("event={event} module=store status=ok kind={kind} id={target_id}");
            self.persist();
        } else {
            debug!("event={event} module=store status=noop kind={kind} id={target_id}");
        }
        applied
    }

    fn commit_created(
        &self,
        kind: EntityKind,
        parent_id: &str,
        id: Option<EntityId>,
    ) -> Option<EntityId> {
        match &id {
            Some(id) => {
                debug!(
                    "event=node_add module=store status=ok kind={kind} id={id} parent={parent_id}"
                );
                self.persist();
            }
            None => {
                debug!("event=node_add module=store status=noop kind={kind} parent={parent_id}");
            }
        }
        id
    }
}

fn read_state<S: KeyValueStore>(
    storage: &S,
    options: &StoreOptions,
) -> Result<StoreState, StoreError> {
    let Some(blob) = storage.get_item(&options.storage_key)? else {
        return Ok(StoreState::default());
    };
    let envelope: StateEnvelope<StoreState> =
        serde_json::from_str(&blob).map_err(StoreError::MalformedState)?;
    if envelope.version > STATE_VERSION {
        return Err(StoreError::UnsupportedStateVersion {
            found: envelope.version,
            supported: STATE_VERSION,
        });
    }

    let mut state = envelope.state;
    let repaired = state.courses.normalize();
    if repaired > 0 {
        info!("event=store_normalize module=store status=ok repaired={repaired}");
    }
    match options.clamp_scale(state.canvas_scale) {
        Some(scale) => state.canvas_scale = scale,
        None => state.canvas_scale = 1.0,
    }
    if !state.canvas_offset.is_finite() {
        state.canvas_offset = Position::ORIGIN;
    }
    Ok(state)
}
