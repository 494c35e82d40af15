//! Aggregate read models and sample content.

use crate::model::draft::CourseDraft;
use crate::model::entity::{Course, Difficulty, Sticky};
use serde::Serialize;

/// Entity counts under one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub module_count: usize,
    pub sticky_count: usize,
    pub task_count: usize,
    pub completed_task_count: usize,
}

impl CourseSummary {
    pub fn of(course: &Course) -> Self {
        let mut summary = Self {
            module_count: course.modules.len(),
            ..Self::default()
        };
        for sticky in course.modules.iter().flat_map(|module| &module.stickies) {
            let progress = TaskProgress::of(sticky);
            summary.sticky_count += 1;
            summary.task_count += progress.total;
            summary.completed_task_count += progress.completed;
        }
        summary
    }
}

/// Task completion inside one sticky.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
}

impl TaskProgress {
    pub fn of(sticky: &Sticky) -> Self {
        Self {
            completed: sticky.tasks.iter().filter(|task| task.is_completed).count(),
            total: sticky.tasks.len(),
        }
    }

    /// Completion rounded to a whole percent; `0` when there are no tasks.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.completed as f64 / self.total as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Starter courses offered when the forest is empty.
pub fn sample_course_drafts() -> Vec<CourseDraft> {
    vec![
        CourseDraft {
            title: "React Native Fundamentals".to_string(),
            description: "Learn the basics of React Native development from scratch".to_string(),
            estimated_duration: Some("6 weeks".to_string()),
            difficulty: Some(Difficulty::Beginner),
            category: Some("Mobile Development".to_string()),
        },
        CourseDraft {
            title: "Advanced JavaScript Patterns".to_string(),
            description: "Master advanced JavaScript concepts and design patterns".to_string(),
            estimated_duration: Some("8 weeks".to_string()),
            difficulty: Some(Difficulty::Advanced),
            category: Some("Programming".to_string()),
        },
        CourseDraft {
            title: "UI/UX Design Principles".to_string(),
            description: "Create beautiful and intuitive user interfaces".to_string(),
            estimated_duration: Some("4 weeks".to_string()),
            difficulty: Some(Difficulty::Intermediate),
            category: Some("Design".to_string()),
        },
    ]
}
