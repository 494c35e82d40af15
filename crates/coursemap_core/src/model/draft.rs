//! Creation inputs and typed partial updates.
//!
//! # Responsibility
//! - Describe the user-editable fields accepted when creating an entity.
//! - Describe partial updates per kind and merge them field by field.
//!
//! # Invariants
//! - Drafts and patches never carry `id`, timestamps, size or color.
//! - `None` in a patch leaves the target field untouched.
//! - Nested `Option<Option<_>>` fields distinguish "keep" from "clear".

use crate::model::entity::{Course, Difficulty, Module, Sticky, Task};
use crate::model::geometry::Position;

/// Fields supplied when creating a course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub estimated_duration: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

impl CourseDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Fields supplied when creating a module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDraft {
    pub title: String,
    pub description: String,
}

impl ModuleDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Fields supplied when creating a sticky.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StickyDraft {
    pub title: String,
    pub description: String,
}

impl StickyDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }
}

/// Partial update for a course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_duration: Option<Option<String>>,
    pub difficulty: Option<Option<Difficulty>>,
    pub category: Option<Option<String>>,
    pub position: Option<Position>,
    pub is_collapsed: Option<bool>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(estimated_duration) = self.estimated_duration {
            course.estimated_duration = estimated_duration;
        }
        if let Some(difficulty) = self.difficulty {
            course.difficulty = difficulty;
        }
        if let Some(category) = self.category {
            course.category = category;
        }
        if let Some(position) = self.position {
            course.position = Some(position);
        }
        if let Some(is_collapsed) = self.is_collapsed {
            course.is_collapsed = is_collapsed;
        }
    }
}

/// Partial update for a module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    pub is_collapsed: Option<bool>,
}

impl ModulePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, module: &mut Module) {
        if let Some(title) = self.title {
            module.title = title;
        }
        if let Some(description) = self.description {
            module.description = description;
        }
        if let Some(position) = self.position {
            module.position = Some(position);
        }
        if let Some(is_collapsed) = self.is_collapsed {
            module.is_collapsed = is_collapsed;
        }
    }
}

/// Partial update for a sticky.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StickyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    pub is_collapsed: Option<bool>,
}

impl StickyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, sticky: &mut Sticky) {
        if let Some(title) = self.title {
            sticky.title = title;
        }
        if let Some(description) = self.description {
            sticky.description = description;
        }
        if let Some(position) = self.position {
            sticky.position = Some(position);
        }
        if let Some(is_collapsed) = self.is_collapsed {
            sticky.is_collapsed = is_collapsed;
        }
    }
}

/// Partial update for a task. Tasks have no collapse state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<Position>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(position) = self.position {
            task.position = Some(position);
        }
    }
}
