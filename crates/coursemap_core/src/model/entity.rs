//! Course / Module / Sticky / Task records.
//!
//! # Responsibility
//! - Define the persisted shape of the four-level content tree.
//! - Provide kind-derived visual constants (size, color).
//!
//! # Invariants
//! - Children are owned by value; one child has exactly one parent.
//! - Child order is insertion order.
//! - `size` and `color` are fixed per kind and never user-edited.
//! - `position`/`size` may be absent on records loaded from older blobs;
//!   such records are not renderable until repaired.

use crate::ids::{EntityId, Timestamp};
use crate::model::geometry::{NodeSize, Position};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Level of an entity in the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Root of one learning plan.
    Course,
    /// Chapter-sized grouping inside a course.
    Module,
    /// Topic note grouping tasks inside a module.
    Sticky,
    /// Completable leaf item.
    Task,
}

impl EntityKind {
    /// Fixed bounding box size for nodes of this kind.
    pub fn default_size(self) -> NodeSize {
        match self {
            Self::Course => NodeSize::new(200.0, 120.0),
            Self::Module => NodeSize::new(160.0, 100.0),
            Self::Sticky => NodeSize::new(140.0, 80.0),
            Self::Task => NodeSize::new(120.0, 60.0),
        }
    }

    /// Fixed fill color (hex) for nodes of this kind.
    pub fn color(self) -> &'static str {
        match self {
            Self::Course => "#3B82F6",
            Self::Module => "#10B981",
            Self::Sticky => "#F59E0B",
            Self::Task => "#8B5CF6",
        }
    }

    /// Tasks are leaves and cannot be collapsed.
    pub fn can_collapse(self) -> bool {
        !matches!(self, Self::Task)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Module => "module",
            Self::Sticky => "sticky",
            Self::Task => "task",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// No prior knowledge assumed.
    Beginner,
    /// Builds on the fundamentals.
    Intermediate,
    /// Expects solid working experience.
    Advanced,
}

/// Root entity of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Free text such as "6 weeks".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NodeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_collapsed: bool,
}

/// Second-level entity owned by a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stickies: Vec<Sticky>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NodeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_collapsed: bool,
}

/// Third-level entity owned by a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticky {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NodeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_collapsed: bool,
}

/// Leaf entity owned by a sticky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NodeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Course {
    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == module_id)
    }

    pub fn module_mut(&mut self, module_id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|module| module.id == module_id)
    }
}

impl Module {
    pub fn sticky(&self, sticky_id: &str) -> Option<&Sticky> {
        self.stickies.iter().find(|sticky| sticky.id == sticky_id)
    }

    pub fn sticky_mut(&mut self, sticky_id: &str) -> Option<&mut Sticky> {
        self.stickies.iter_mut().find(|sticky| sticky.id == sticky_id)
    }
}

impl Sticky {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }
}

/// Borrowed view over any entity, for code that dispatches on kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Course(&'a Course),
    Module(&'a Module),
    Sticky(&'a Sticky),
    Task(&'a Task),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Course(_) => EntityKind::Course,
            Self::Module(_) => EntityKind::Module,
            Self::Sticky(_) => EntityKind::Sticky,
            Self::Task(_) => EntityKind::Task,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            Self::Course(course) => &course.id,
            Self::Module(module) => &module.id,
            Self::Sticky(sticky) => &sticky.id,
            Self::Task(task) => &task.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Self::Course(course) => &course.title,
            Self::Module(module) => &module.title,
            Self::Sticky(sticky) => &sticky.title,
            Self::Task(task) => &task.title,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Course(course) => course.position,
            Self::Module(module) => module.position,
            Self::Sticky(sticky) => sticky.position,
            Self::Task(task) => task.position,
        }
    }

    pub fn size(&self) -> Option<NodeSize> {
        match self {
            Self::Course(course) => course.size,
            Self::Module(module) => module.size,
            Self::Sticky(sticky) => sticky.size,
            Self::Task(task) => task.size,
        }
    }

    /// Stored color, falling back to the kind color.
    pub fn color(&self) -> &'a str {
        let stored = match self {
            Self::Course(course) => course.color.as_deref(),
            Self::Module(module) => module.color.as_deref(),
            Self::Sticky(sticky) => sticky.color.as_deref(),
            Self::Task(task) => task.color.as_deref(),
        };
        stored.unwrap_or(self.kind().color())
    }

    /// Always `false` for tasks.
    pub fn is_collapsed(&self) -> bool {
        match self {
            Self::Course(course) => course.is_collapsed,
            Self::Module(module) => module.is_collapsed,
            Self::Sticky(sticky) => sticky.is_collapsed,
            Self::Task(_) => false,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        match self {
            Self::Course(course) => course.created_at,
            Self::Module(module) => module.created_at,
            Self::Sticky(sticky) => sticky.created_at,
            Self::Task(task) => task.created_at,
        }
    }

    pub fn updated_at(&self) -> Timestamp {
        match self {
            Self::Course(course) => course.updated_at,
            Self::Module(module) => module.updated_at,
            Self::Sticky(sticky) => sticky.updated_at,
            Self::Task(task) => task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Course, EntityKind, EntityRef, Task};

    #[test]
    fn kind_constants_match_node_table() {
        let course = EntityKind::Course.default_size();
        let task = EntityKind::Task.default_size();
        assert_eq!((course.width, course.height), (200.0, 120.0));
        assert_eq!((task.width, task.height), (120.0, 60.0));
        assert!(EntityKind::Sticky.can_collapse());
        assert!(!EntityKind::Task.can_collapse());
    }

    #[test]
    fn legacy_blob_without_geometry_deserializes() {
        let course: Course = serde_json::from_str(
            r#"{
                "id": "c1",
                "title": "Legacy",
                "description": "",
                "modules": [],
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();
        assert!(course.position.is_none());
        assert!(course.size.is_none());
        assert!(!course.is_collapsed);
        assert_eq!(EntityRef::Course(&course).color(), "#3B82F6");
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": "t1",
                "title": "Read chapter",
                "isCompleted": true,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-02T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(task.is_completed);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["isCompleted"], true);
        assert!(json.get("position").is_none());
    }
}
