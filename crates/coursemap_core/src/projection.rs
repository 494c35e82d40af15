//! Graph projection of the forest for rendering.
//!
//! # Responsibility
//! - Flatten visible entities into renderable nodes.
//! - Derive parent→child connections anchored at node centers.
//!
//! # Invariants
//! - Read-only: projection never mutates the forest; identical input gives
//!   identical output.
//! - Descendants of a collapsed node are hidden; the collapsed node and its
//!   incoming connection stay visible.
//! - A non-course entity without position or size is skipped together with
//!   its subtree. A course without them is projected with course defaults.
//! - Connections only join direct parent/child pairs.

use crate::model::entity::{Course, EntityKind, EntityRef};
use crate::model::geometry::{NodeSize, Position};
use crate::tree::forest::DEFAULT_COURSE_POSITION;
use serde::Serialize;

const MAX_CURVATURE: f64 = 100.0;
const CURVATURE_RATIO: f64 = 0.3;

/// Renderable projection of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub title: String,
    pub position: Position,
    pub size: NodeSize,
    pub color: String,
    pub is_collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl MindMapNode {
    /// Center of the node's bounding box.
    pub fn anchor(&self) -> Position {
        self.size.center_from(self.position)
    }
}

/// Derived line between a parent node center and a child node center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// `from_id` immediately followed by `to_id`.
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub from_anchor: Position,
    pub to_anchor: Position,
}

impl Connection {
    fn between(parent: &MindMapNode, child: &MindMapNode) -> Self {
        Self {
            id: format!("{}{}", parent.id, child.id),
            from_id: parent.id.clone(),
            to_id: child.id.clone(),
            from_anchor: parent.anchor(),
            to_anchor: child.anchor(),
        }
    }

    /// Cubic bezier control points for drawing this connection as a
    /// horizontal-leaning curve.
    ///
    /// Curvature grows with distance (30%) and is capped at 100 units.
    pub fn curve_controls(&self) -> (Position, Position) {
        let dx = self.to_anchor.x - self.from_anchor.x;
        let curvature =
            (self.from_anchor.distance_to(self.to_anchor) * CURVATURE_RATIO).min(MAX_CURVATURE);
        let lean = if dx > 0.0 { curvature } else { -curvature };
        (
            Position::new(self.from_anchor.x + lean, self.from_anchor.y),
            Position::new(self.to_anchor.x - lean, self.to_anchor.y),
        )
    }
}

/// Lists every visible node, depth first, optionally scoped to one course.
///
/// An unknown `scope_course_id` yields an empty list.
pub fn flatten_visible_nodes(
    courses: &[Course],
    scope_course_id: Option<&str>,
) -> Vec<MindMapNode> {
    let mut nodes = Vec::new();
    visit_visible(courses, scope_course_id, |node, _| nodes.push(node.clone()));
    nodes
}

/// Lists one connection per visible parent/child pair.
pub fn derive_edges(courses: &[Course], scope_course_id: Option<&str>) -> Vec<Connection> {
    let mut edges = Vec::new();
    visit_visible(courses, scope_course_id, |node, parent| {
        if let Some(parent) = parent {
            edges.push(Connection::between(parent, node));
        }
    });
    edges
}

fn visit_visible<F>(courses: &[Course], scope_course_id: Option<&str>, mut visit: F)
where
    F: FnMut(&MindMapNode, Option<&MindMapNode>),
{
    let in_scope = |course: &&Course| scope_course_id.map_or(true, |id| course.id == id);
    for course in courses.iter().filter(in_scope) {
        let course_node = course_node(course);
        visit(&course_node, None);
        if course.is_collapsed {
            continue;
        }

        for module in &course.modules {
            let Some(module_node) = child_node(EntityRef::Module(module), &course_node) else {
                continue;
            };
            visit(&module_node, Some(&course_node));
            if module.is_collapsed {
                continue;
            }

            for sticky in &module.stickies {
                let Some(sticky_node) = child_node(EntityRef::Sticky(sticky), &module_node) else {
                    continue;
                };
                visit(&sticky_node, Some(&module_node));
                if sticky.is_collapsed {
                    continue;
                }

                for task in &sticky.tasks {
                    if let Some(task_node) = child_node(EntityRef::Task(task), &sticky_node) {
                        visit(&task_node, Some(&sticky_node));
                    }
                }
            }
        }
    }
}

fn course_node(course: &Course) -> MindMapNode {
    let entity = EntityRef::Course(course);
    MindMapNode {
        id: course.id.clone(),
        kind: EntityKind::Course,
        title: course.title.clone(),
        position: course.position.unwrap_or(DEFAULT_COURSE_POSITION),
        size: course
            .size
            .unwrap_or_else(|| EntityKind::Course.default_size()),
        color: entity.color().to_string(),
        is_collapsed: course.is_collapsed,
        parent_id: None,
    }
}

fn child_node(entity: EntityRef<'_>, parent: &MindMapNode) -> Option<MindMapNode> {
    Some(MindMapNode {
        id: entity.id().to_string(),
        kind: entity.kind(),
        title: entity.title().to_string(),
        position: entity.position()?,
        size: entity.size()?,
        color: entity.color().to_string(),
        is_collapsed: entity.is_collapsed(),
        parent_id: Some(parent.id.clone()),
    })
}
