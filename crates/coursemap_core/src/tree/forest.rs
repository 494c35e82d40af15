//! Course forest and its mutation engine.
//!
//! # Responsibility
//! - Own the ordered list of courses and everything beneath them.
//! - Apply add/update/delete at every level, plus position, collapse and
//!   completion shortcuts.
//!
//! # Invariants
//! - A mutation resolves its whole path before touching anything; an
//!   unresolved path leaves the forest unchanged and returns a no-op result.
//! - A successful mutation refreshes `updated_at` on the touched entity (if
//!   it still exists) and on every ancestor up to the course.
//! - New entities get a fresh id, `created_at == updated_at`, kind size and
//!   kind color, and are appended after their existing siblings.
//! - Non-finite positions are never stored.

use crate::ids::{new_id, EntityId, Timestamp};
use crate::layout::place_child;
use crate::model::draft::{
    CourseDraft, CoursePatch, ModuleDraft, ModulePatch, StickyDraft, StickyPatch, TaskDraft,
    TaskPatch,
};
use crate::model::entity::{Course, EntityKind, EntityRef, Module, Sticky, Task};
use crate::model::geometry::Position;
use crate::tree::path::NodePath;
use serde::{Deserialize, Serialize};

/// Anchor given to a course that was persisted without one.
pub const DEFAULT_COURSE_POSITION: Position = Position::new(200.0, 150.0);

/// Ordered list of root courses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    courses: Vec<Course>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_courses(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn into_courses(self) -> Vec<Course> {
        self.courses
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == course_id)
    }

    pub fn module(&self, course_id: &str, module_id: &str) -> Option<&Module> {
        self.course(course_id)?.module(module_id)
    }

    pub fn sticky(&self, course_id: &str, module_id: &str, sticky_id: &str) -> Option<&Sticky> {
        self.module(course_id, module_id)?.sticky(sticky_id)
    }

    pub fn task(
        &self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
    ) -> Option<&Task> {
        self.sticky(course_id, module_id, sticky_id)?.task(task_id)
    }

    /// Resolves any path to a borrowed entity view.
    pub fn entity(&self, path: &NodePath) -> Option<EntityRef<'_>> {
        match path {
            NodePath::Course { course_id } => self.course(course_id).map(EntityRef::Course),
            NodePath::Module {
                course_id,
                module_id,
            } => self.module(course_id, module_id).map(EntityRef::Module),
            NodePath::Sticky {
                course_id,
                module_id,
                sticky_id,
            } => self
                .sticky(course_id, module_id, sticky_id)
                .map(EntityRef::Sticky),
            NodePath::Task {
                course_id,
                module_id,
                sticky_id,
                task_id,
            } => self
                .task(course_id, module_id, sticky_id, task_id)
                .map(EntityRef::Task),
        }
    }

    /// Every entity id in depth-first order, regardless of collapse state.
    pub fn entity_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for course in &self.courses {
            ids.push(course.id.as_str());
            for module in &course.modules {
                ids.push(module.id.as_str());
                for sticky in &module.stickies {
                    ids.push(sticky.id.as_str());
                    ids.extend(sticky.tasks.iter().map(|task| task.id.as_str()));
                }
            }
        }
        ids
    }

    /// Backfills fields that older persisted blobs may lack.
    ///
    /// Courses get a default anchor and size; every entity gets its kind
    /// color. Child geometry is never invented. Returns the number of
    /// entities that were changed.
    pub fn normalize(&mut self) -> usize {
        let mut repaired = 0;
        for course in &mut self.courses {
            let mut changed = false;
            if course.position.is_none() {
                course.position = Some(DEFAULT_COURSE_POSITION);
                changed = true;
            }
            if course.size.is_none() {
                course.size = Some(EntityKind::Course.default_size());
                changed = true;
            }
            changed |= backfill_color(&mut course.color, EntityKind::Course);
            repaired += usize::from(changed);

            for module in &mut course.modules {
                repaired += usize::from(backfill_color(&mut module.color, EntityKind::Module));
                for sticky in &mut module.stickies {
                    repaired +=
                        usize::from(backfill_color(&mut sticky.color, EntityKind::Sticky));
                    for task in &mut sticky.tasks {
                        repaired += usize::from(backfill_color(&mut task.color, EntityKind::Task));
                    }
                }
            }
        }
        repaired
    }

    /// Appends a new course. Courses are roots, so this always succeeds.
    pub fn add_course(
        &mut self,
        draft: CourseDraft,
        position: Option<Position>,
        now: Timestamp,
    ) -> EntityId {
        let position = finite(position)
            .unwrap_or_else(|| place_child(None, self.courses.len(), EntityKind::Course));
        let id = new_id();
        self.courses.push(Course {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            modules: Vec::new(),
            created_at: now,
            updated_at: now,
            estimated_duration: draft.estimated_duration,
            difficulty: draft.difficulty,
            category: draft.category,
            position: Some(position),
            size: Some(EntityKind::Course.default_size()),
            color: Some(EntityKind::Course.color().to_string()),
            is_collapsed: false,
        });
        id
    }

    /// Appends a module under `course_id`; `None` when the course is missing.
    pub fn add_module(
        &mut self,
        course_id: &str,
        draft: ModuleDraft,
        position: Option<Position>,
        now: Timestamp,
    ) -> Option<EntityId> {
        let course = self.course_mut(course_id)?;
        let anchor = course.position.unwrap_or(DEFAULT_COURSE_POSITION);
        let position = finite(position).unwrap_or_else(|| {
            place_child(Some(anchor), course.modules.len(), EntityKind::Module)
        });
        let id = new_id();
        course.modules.push(Module {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            stickies: Vec::new(),
            created_at: now,
            updated_at: now,
            position: Some(position),
            size: Some(EntityKind::Module.default_size()),
            color: Some(EntityKind::Module.color().to_string()),
            is_collapsed: false,
        });
        course.updated_at = now;
        Some(id)
    }

    /// Appends a sticky under `course_id/module_id`.
    pub fn add_sticky(
        &mut self,
        course_id: &str,
        module_id: &str,
        draft: StickyDraft,
        position: Option<Position>,
        now: Timestamp,
    ) -> Option<EntityId> {
        let course = self.course_mut(course_id)?;
        let module = course.module_mut(module_id)?;
        let anchor = module.position.unwrap_or(Position::ORIGIN);
        let position = finite(position).unwrap_or_else(|| {
            place_child(Some(anchor), module.stickies.len(), EntityKind::Sticky)
        });
        let id = new_id();
        module.stickies.push(Sticky {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
            position: Some(position),
            size: Some(EntityKind::Sticky.default_size()),
            color: Some(EntityKind::Sticky.color().to_string()),
            is_collapsed: false,
        });
        module.updated_at = now;
        course.updated_at = now;
        Some(id)
    }

    /// Appends a task under `course_id/module_id/sticky_id`.
    pub fn add_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        draft: TaskDraft,
        position: Option<Position>,
        now: Timestamp,
    ) -> Option<EntityId> {
        let course = self.course_mut(course_id)?;
        let module = course.module_mut(module_id)?;
        let sticky = module.sticky_mut(sticky_id)?;
        let anchor = sticky.position.unwrap_or(Position::ORIGIN);
        let position = finite(position)
            .unwrap_or_else(|| place_child(Some(anchor), sticky.tasks.len(), EntityKind::Task));
        let id = new_id();
        sticky.tasks.push(Task {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            is_completed: draft.is_completed,
            created_at: now,
            updated_at: now,
            position: Some(position),
            size: Some(EntityKind::Task.default_size()),
            color: Some(EntityKind::Task.color().to_string()),
        });
        sticky.updated_at = now;
        module.updated_at = now;
        course.updated_at = now;
        Some(id)
    }

    pub fn update_course(
        &mut self,
        course_id: &str,
        mut patch: CoursePatch,
        now: Timestamp,
    ) -> bool {
        patch.position = finite(patch.position);
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        patch.apply(course);
        course.updated_at = now;
        true
    }

    pub fn update_module(
        &mut self,
        course_id: &str,
        module_id: &str,
        mut patch: ModulePatch,
        now: Timestamp,
    ) -> bool {
        patch.position = finite(patch.position);
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id) else {
            return false;
        };
        patch.apply(module);
        module.updated_at = now;
        course.updated_at = now;
        true
    }

    pub fn update_sticky(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        mut patch: StickyPatch,
        now: Timestamp,
    ) -> bool {
        patch.position = finite(patch.position);
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id) else {
            return false;
        };
        let Some(sticky) = module.sticky_mut(sticky_id) else {
            return false;
        };
        patch.apply(sticky);
        sticky.updated_at = now;
        module.updated_at = now;
        course.updated_at = now;
        true
    }

    pub fn update_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
        mut patch: TaskPatch,
        now: Timestamp,
    ) -> bool {
        patch.position = finite(patch.position);
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id) else {
            return false;
        };
        let Some(sticky) = module.sticky_mut(sticky_id) else {
            return false;
        };
        let Some(task) = sticky.task_mut(task_id) else {
            return false;
        };
        patch.apply(task);
        task.updated_at = now;
        sticky.updated_at = now;
        module.updated_at = now;
        course.updated_at = now;
        true
    }

    /// Removes a course and its whole subtree.
    pub fn delete_course(&mut self, course_id: &str) -> bool {
        let Some(index) = self.courses.iter().position(|course| course.id == course_id) else {
            return false;
        };
        self.courses.remove(index);
        true
    }

    pub fn delete_module(&mut self, course_id: &str, module_id: &str, now: Timestamp) -> bool {
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(index) = course.modules.iter().position(|module| module.id == module_id) else {
            return false;
        };
        course.modules.remove(index);
        course.updated_at = now;
        true
    }

    pub fn delete_sticky(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        now: Timestamp,
    ) -> bool {
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id) else {
            return false;
        };
        let Some(index) = module.stickies.iter().position(|sticky| sticky.id == sticky_id) else {
            return false;
        };
        module.stickies.remove(index);
        module.updated_at = now;
        course.updated_at = now;
        true
    }

    pub fn delete_task(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
        now: Timestamp,
    ) -> bool {
        let Some(course) = self.course_mut(course_id) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id) else {
            return false;
        };
        let Some(sticky) = module.sticky_mut(sticky_id) else {
            return false;
        };
        let Some(index) = sticky.tasks.iter().position(|task| task.id == task_id) else {
            return false;
        };
        sticky.tasks.remove(index);
        sticky.updated_at = now;
        module.updated_at = now;
        course.updated_at = now;
        true
    }

    /// Moves one node. Non-finite positions are rejected as no-ops.
    pub fn update_node_position(
        &mut self,
        path: &NodePath,
        position: Position,
        now: Timestamp,
    ) -> bool {
        if !position.is_finite() {
            return false;
        }
        match path {
            NodePath::Course { course_id } => self.update_course(
                course_id,
                CoursePatch {
                    position: Some(position),
                    ..CoursePatch::default()
                },
                now,
            ),
            NodePath::Module {
                course_id,
                module_id,
            } => self.update_module(
                course_id,
                module_id,
                ModulePatch {
                    position: Some(position),
                    ..ModulePatch::default()
                },
                now,
            ),
            NodePath::Sticky {
                course_id,
                module_id,
                sticky_id,
            } => self.update_sticky(
                course_id,
                module_id,
                sticky_id,
                StickyPatch {
                    position: Some(position),
                    ..StickyPatch::default()
                },
                now,
            ),
            NodePath::Task {
                course_id,
                module_id,
                sticky_id,
                task_id,
            } => self.update_task(
                course_id,
                module_id,
                sticky_id,
                task_id,
                TaskPatch {
                    position: Some(position),
                    ..TaskPatch::default()
                },
                now,
            ),
        }
    }

    /// Flips `is_collapsed`. Always a no-op for tasks.
    pub fn toggle_collapse(&mut self, path: &NodePath, now: Timestamp) -> bool {
        if !path.kind().can_collapse() {
            return false;
        }
        let Some(current) = self.entity(path).map(|entity| entity.is_collapsed()) else {
            return false;
        };
        match path {
            NodePath::Course { course_id } => self.update_course(
                course_id,
                CoursePatch {
                    is_collapsed: Some(!current),
                    ..CoursePatch::default()
                },
                now,
            ),
            NodePath::Module {
                course_id,
                module_id,
            } => self.update_module(
                course_id,
                module_id,
                ModulePatch {
                    is_collapsed: Some(!current),
                    ..ModulePatch::default()
                },
                now,
            ),
            NodePath::Sticky {
                course_id,
                module_id,
                sticky_id,
            } => self.update_sticky(
                course_id,
                module_id,
                sticky_id,
                StickyPatch {
                    is_collapsed: Some(!current),
                    ..StickyPatch::default()
                },
                now,
            ),
            NodePath::Task { .. } => false,
        }
    }

    /// Flips `is_completed` on one task.
    pub fn toggle_task_completion(
        &mut self,
        course_id: &str,
        module_id: &str,
        sticky_id: &str,
        task_id: &str,
        now: Timestamp,
    ) -> bool {
        let Some(current) = self
            .task(course_id, module_id, sticky_id, task_id)
            .map(|task| task.is_completed)
        else {
            return false;
        };
        self.update_task(
            course_id,
            module_id,
            sticky_id,
            task_id,
            TaskPatch {
                is_completed: Some(!current),
                ..TaskPatch::default()
            },
            now,
        )
    }

    fn course_mut(&mut self, course_id: &str) -> Option<&mut Course> {
        self.courses.iter_mut().find(|course| course.id == course_id)
    }
}

fn finite(position: Option<Position>) -> Option<Position> {
    position.filter(Position::is_finite)
}

fn backfill_color(color: &mut Option<String>, kind: EntityKind) -> bool {
    if color.is_some() {
        return false;
    }
    *color = Some(kind.color().to_string());
    true
}
