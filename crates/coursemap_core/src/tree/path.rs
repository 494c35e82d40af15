//! Addressing of one entity inside the forest.

use crate::ids::EntityId;
use crate::model::entity::EntityKind;
use std::fmt::{Display, Formatter};

/// Full ancestry path of one entity, from its course down to itself.
///
/// The variant doubles as the entity kind, so a path can never disagree
/// with the kind it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodePath {
    Course {
        course_id: EntityId,
    },
    Module {
        course_id: EntityId,
        module_id: EntityId,
    },
    Sticky {
        course_id: EntityId,
        module_id: EntityId,
        sticky_id: EntityId,
    },
    Task {
        course_id: EntityId,
        module_id: EntityId,
        sticky_id: EntityId,
        task_id: EntityId,
    },
}

impl NodePath {
    pub fn course(course_id: impl Into<EntityId>) -> Self {
        Self::Course {
            course_id: course_id.into(),
        }
    }

    pub fn module(course_id: impl Into<EntityId>, module_id: impl Into<EntityId>) -> Self {
        Self::Module {
            course_id: course_id.into(),
            module_id: module_id.into(),
        }
    }

    pub fn sticky(
        course_id: impl Into<EntityId>,
        module_id: impl Into<EntityId>,
        sticky_id: impl Into<EntityId>,
    ) -> Self {
        Self::Sticky {
            course_id: course_id.into(),
            module_id: module_id.into(),
            sticky_id: sticky_id.into(),
        }
    }

    pub fn task(
        course_id: impl Into<EntityId>,
        module_id: impl Into<EntityId>,
        sticky_id: impl Into<EntityId>,
        task_id: impl Into<EntityId>,
    ) -> Self {
        Self::Task {
            course_id: course_id.into(),
            module_id: module_id.into(),
            sticky_id: sticky_id.into(),
            task_id: task_id.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Course { .. } => EntityKind::Course,
            Self::Module { .. } => EntityKind::Module,
            Self::Sticky { .. } => EntityKind::Sticky,
            Self::Task { .. } => EntityKind::Task,
        }
    }

    pub fn course_id(&self) -> &str {
        match self {
            Self::Course { course_id }
            | Self::Module { course_id, .. }
            | Self::Sticky { course_id, .. }
            | Self::Task { course_id, .. } => course_id,
        }
    }

    /// Id of the addressed entity itself.
    pub fn target_id(&self) -> &str {
        match self {
            Self::Course { course_id } => course_id,
            Self::Module { module_id, .. } => module_id,
            Self::Sticky { sticky_id, .. } => sticky_id,
            Self::Task { task_id, .. } => task_id,
        }
    }

    /// Path of the owning entity; `None` for courses.
    pub fn parent(&self) -> Option<NodePath> {
        match self {
            Self::Course { .. } => None,
            Self::Module { course_id, .. } => Some(Self::course(course_id.clone())),
            Self::Sticky {
                course_id,
                module_id,
                ..
            } => Some(Self::module(course_id.clone(), module_id.clone())),
            Self::Task {
                course_id,
                module_id,
                sticky_id,
                ..
            } => Some(Self::sticky(
                course_id.clone(),
                module_id.clone(),
                sticky_id.clone(),
            )),
        }
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Course { course_id } => write!(f, "{course_id}"),
            Self::Module {
                course_id,
                module_id,
            } => write!(f, "{course_id}/{module_id}"),
            Self::Sticky {
                course_id,
                module_id,
                sticky_id,
            } => write!(f, "{course_id}/{module_id}/{sticky_id}"),
            Self::Task {
                course_id,
                module_id,
                sticky_id,
                task_id,
            } => write!(f, "{course_id}/{module_id}/{sticky_id}/{task_id}"),
        }
    }
}
