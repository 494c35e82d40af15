use chrono::{Duration, TimeZone, Utc};
use coursemap_core::{
    Clock, CourseDraft, CoursePatch, CourseStore, Difficulty, EntityKind, KeyValueStore,
    MemoryKeyValueStore, ModuleDraft, ModulePatch, NodePath, Position, StickyDraft, StickyPatch,
    StorageError, StorageResult, StoreError, StoreOptions, TaskDraft, TaskPatch, Timestamp,
    DEFAULT_STORAGE_KEY,
};
use std::cell::Cell;
use std::collections::HashSet;

/// Clock that advances one second on every read.
struct SteppingClock {
    ticks: Cell<i64>,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            ticks: Cell::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let tick = self.ticks.get();
        self.ticks.set(tick + 1);
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick)
    }
}

/// Storage whose reads succeed with nothing and whose writes always fail.
struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }

    fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }
}

struct Tree {
    course: String,
    module: String,
    sticky: String,
    task: String,
}

fn build_tree<S: KeyValueStore>(store: &mut CourseStore<S>) -> Tree {
    let course = store.add_course(CourseDraft::new("Rust", "Systems programming"), None);
    let module = store
        .add_module(&course, ModuleDraft::new("Ownership", ""), None)
        .unwrap();
    let sticky = store
        .add_sticky(&course, &module, StickyDraft::new("Borrowing", ""), None)
        .unwrap();
    let task = store
        .add_task(&course, &module, &sticky, TaskDraft::new("Read chapter 4", ""), None)
        .unwrap();
    Tree {
        course,
        module,
        sticky,
        task,
    }
}

fn node_ids<S: KeyValueStore>(store: &CourseStore<S>) -> Vec<String> {
    store.all_nodes().into_iter().map(|node| node.id).collect()
}

#[test]
fn ids_are_unique_across_the_whole_forest() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    for course_index in 0..3 {
        let course = store.add_course(CourseDraft::new(format!("Course {course_index}"), ""), None);
        for module_index in 0..3 {
            let module = store
                .add_module(&course, ModuleDraft::new(format!("M{module_index}"), ""), None)
                .unwrap();
            for sticky_index in 0..3 {
                let sticky = store
                    .add_sticky(
                        &course,
                        &module,
                        StickyDraft::new(format!("S{sticky_index}"), ""),
                        None,
                    )
                    .unwrap();
                for task_index in 0..3 {
                    store
                        .add_task(
                            &course,
                            &module,
                            &sticky,
                            TaskDraft::new(format!("T{task_index}"), ""),
                            None,
                        )
                        .unwrap();
                }
            }
        }
    }

    let ids = node_ids(&store);
    assert_eq!(ids.len(), 3 * (1 + 3 * (1 + 3 * (1 + 3))));
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[test]
fn courses_without_position_fill_the_grid() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let ids = (0..4)
        .map(|index| store.add_course(CourseDraft::new(format!("Course {index}"), ""), None))
        .collect::<Vec<_>>();

    let positions = ids
        .iter()
        .map(|id| store.course(id).unwrap().position.unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        positions,
        vec![
            Position::new(50.0, 50.0),
            Position::new(350.0, 50.0),
            Position::new(650.0, 50.0),
            Position::new(50.0, 250.0),
        ]
    );
}

#[test]
fn first_module_is_placed_on_the_ring_around_its_course() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let course = store.add_course(CourseDraft::new("Rust", ""), Some(Position::new(100.0, 100.0)));
    let module = store
        .add_module(&course, ModuleDraft::new("Ownership", ""), None)
        .unwrap();

    let placed = store.module(&course, &module).unwrap().position.unwrap();
    assert!((placed.x - 320.0).abs() < 1e-9);
    assert!((placed.y - 100.0).abs() < 1e-9);
}

#[test]
fn deleting_a_module_removes_its_whole_subtree() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);
    let keep = store
        .add_module(&tree.course, ModuleDraft::new("Lifetimes", ""), None)
        .unwrap();

    assert!(store.delete_module(&tree.course, &tree.module));

    let ids = node_ids(&store);
    assert_eq!(ids, vec![tree.course.clone(), keep.clone()]);
    assert!(store.module(&tree.course, &tree.module).is_none());
    assert!(store
        .sticky(&tree.course, &tree.module, &tree.sticky)
        .is_none());
    assert!(store
        .entity(&NodePath::task(&tree.course, &tree.module, &tree.sticky, &tree.task))
        .is_none());
    assert!(store
        .connections()
        .iter()
        .all(|edge| edge.to_id != tree.module && edge.from_id != tree.module));
}

#[test]
fn deleting_a_course_needs_no_confirmation() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);

    assert!(store.delete_course(&tree.course));
    assert!(store.all_nodes().is_empty());
    assert!(store.connections().is_empty());
    assert!(!store.delete_course(&tree.course));
}

#[test]
fn task_update_refreshes_every_ancestor() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new()).with_clock(SteppingClock::new());
    let tree = build_tree(&mut store);
    let task_path = NodePath::task(&tree.course, &tree.module, &tree.sticky, &tree.task);
    let path_updated_at = |store: &CourseStore<MemoryKeyValueStore>| {
        let mut path = Some(task_path.clone());
        let mut stamps = Vec::new();
        while let Some(current) = path {
            stamps.push(store.entity(&current).unwrap().updated_at());
            path = current.parent();
        }
        stamps
    };
    let before = path_updated_at(&store);

    let patch = TaskPatch {
        title: Some("Read chapter 5".to_string()),
        ..TaskPatch::default()
    };
    assert!(store.update_task(&tree.course, &tree.module, &tree.sticky, &tree.task, patch));

    let after = path_updated_at(&store);
    assert_eq!(after.len(), 4);
    for (old, new) in before.iter().zip(&after) {
        assert!(new > old, "expected {new} to be after {old}");
    }
    let task = store
        .task(&tree.course, &tree.module, &tree.sticky, &tree.task)
        .unwrap();
    assert_eq!(task.title, "Read chapter 5");
    assert!(task.created_at < task.updated_at);
}

#[test]
fn collapsing_a_module_hides_its_descendants_until_expanded() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);
    let module_path = NodePath::module(&tree.course, &tree.module);

    assert!(store.toggle_node_collapse(&module_path));
    let visible = store
        .all_nodes_for_course(&tree.course)
        .into_iter()
        .map(|node| node.id)
        .collect::<Vec<_>>();
    assert_eq!(visible, vec![tree.course.clone(), tree.module.clone()]);
    let edges = store.connections_for_course(&tree.course);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to_id, tree.module);

    assert!(store.toggle_node_collapse(&module_path));
    assert_eq!(store.all_nodes_for_course(&tree.course).len(), 4);
    assert_eq!(store.connections_for_course(&tree.course).len(), 3);
}

#[test]
fn collapsing_a_task_is_a_noop() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);
    let before = store.state().clone();

    let task_path = NodePath::task(&tree.course, &tree.module, &tree.sticky, &tree.task);
    assert!(!store.toggle_node_collapse(&task_path));
    assert_eq!(store.state(), &before);
}

#[test]
fn update_on_unknown_course_leaves_state_and_storage_untouched() {
    let storage = MemoryKeyValueStore::new();
    let mut store = CourseStore::load(&storage);
    let tree = build_tree(&mut store);
    let state_before = store.state().clone();
    let blob_before = storage.get_item(DEFAULT_STORAGE_KEY).unwrap();

    let patch = ModulePatch {
        title: Some("Hijacked".to_string()),
        ..ModulePatch::default()
    };
    assert!(!store.update_module("nonexistent", &tree.module, patch));
    assert!(!store.delete_sticky(&tree.course, "nonexistent", &tree.sticky));
    assert!(store
        .add_task(&tree.course, &tree.module, "nonexistent", TaskDraft::new("x", ""), None)
        .is_none());
    assert!(!store.update_node_position(
        &NodePath::module("nonexistent", &tree.module),
        Position::new(1.0, 1.0)
    ));

    assert_eq!(store.state(), &state_before);
    assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap(), blob_before);
}

#[test]
fn node_position_updates_move_edge_anchors() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let course = store.add_course(CourseDraft::new("Rust", ""), Some(Position::new(0.0, 0.0)));
    let module = store
        .add_module(&course, ModuleDraft::new("Ownership", ""), None)
        .unwrap();

    let path = NodePath::course(&course);
    assert!(store.update_node_position(&path, Position::new(200.0, 150.0)));
    assert!(store.update_node_position(
        &NodePath::module(&course, &module),
        Position::new(400.0, 300.0)
    ));
    assert!(store.update_node_position(&path, Position::new(200.0, 150.0)));

    let edges = store.connections();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].from_anchor, Position::new(300.0, 210.0));
    assert_eq!(edges[0].to_anchor, Position::new(480.0, 350.0));

    assert!(!store.update_node_position(&path, Position::new(f64::NAN, 0.0)));
    assert_eq!(
        store.course(&course).unwrap().position,
        Some(Position::new(200.0, 150.0))
    );
}

#[test]
fn course_metadata_can_be_set_and_cleared() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let course = store.add_course(
        CourseDraft {
            difficulty: Some(Difficulty::Intermediate),
            category: Some("Design".to_string()),
            ..CourseDraft::new("UI", "Interfaces")
        },
        None,
    );

    assert!(store.update_course(
        &course,
        CoursePatch {
            difficulty: Some(None),
            estimated_duration: Some(Some("4 weeks".to_string())),
            ..CoursePatch::default()
        }
    ));

    let stored = store.course(&course).unwrap();
    assert_eq!(stored.difficulty, None);
    assert_eq!(stored.category.as_deref(), Some("Design"));
    assert_eq!(stored.estimated_duration.as_deref(), Some("4 weeks"));
    assert_eq!(stored.id, course);
}

#[test]
fn task_completion_feeds_progress_and_summary() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);
    store
        .add_task(&tree.course, &tree.module, &tree.sticky, TaskDraft::new("Quiz", ""), None)
        .unwrap();

    assert!(store.toggle_task_completion(&tree.course, &tree.module, &tree.sticky, &tree.task));

    let progress = store
        .sticky_progress(&tree.course, &tree.module, &tree.sticky)
        .unwrap();
    assert_eq!((progress.completed, progress.total), (1, 2));
    assert_eq!(progress.percent(), 50);

    let summary = store.course_summary(&tree.course).unwrap();
    assert_eq!(summary.module_count, 1);
    assert_eq!(summary.sticky_count, 1);
    assert_eq!(summary.task_count, 2);
    assert_eq!(summary.completed_task_count, 1);

    assert!(store.toggle_task_completion(&tree.course, &tree.module, &tree.sticky, &tree.task));
    assert_eq!(store.course_summary(&tree.course).unwrap().completed_task_count, 0);
    assert!(store.course_summary("nonexistent").is_none());
}

#[test]
fn state_survives_a_reload_from_the_same_storage() {
    let storage = MemoryKeyValueStore::new();
    let (tree, state) = {
        let mut store = CourseStore::load(&storage);
        let tree = build_tree(&mut store);
        store.toggle_node_collapse(&NodePath::sticky(&tree.course, &tree.module, &tree.sticky));
        store.update_canvas_transform(Position::new(-120.0, 45.5), 1.5);
        (tree, store.state().clone())
    };

    let reloaded = CourseStore::try_load(&storage).unwrap();
    assert_eq!(reloaded.state(), &state);
    assert_eq!(reloaded.canvas_offset(), Position::new(-120.0, 45.5));
    assert_eq!(reloaded.canvas_scale(), 1.5);
    assert!(
        reloaded
            .sticky(&tree.course, &tree.module, &tree.sticky)
            .unwrap()
            .is_collapsed
    );
}

#[test]
fn saved_blob_uses_the_envelope_layout() {
    let storage = MemoryKeyValueStore::new();
    let mut store = CourseStore::load(&storage);
    let tree = build_tree(&mut store);

    let blob = storage.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(json["version"], 0);
    let course = &json["state"]["courses"][0];
    assert_eq!(course["id"], tree.course.as_str());
    assert!(course["createdAt"].as_str().unwrap().contains('T'));
    assert_eq!(course["modules"][0]["stickies"][0]["tasks"][0]["isCompleted"], false);
    assert_eq!(json["state"]["canvasScale"], 1.0);
}

#[test]
fn custom_storage_key_is_honored() {
    let storage = MemoryKeyValueStore::new();
    let options = StoreOptions {
        storage_key: "course-storage-test".to_string(),
        ..StoreOptions::default()
    };
    let mut store = CourseStore::load_with_options(&storage, options);
    store.add_course(CourseDraft::new("Rust", ""), None);

    assert!(storage.get_item("course-storage-test").unwrap().is_some());
    assert!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn storage_failures_never_undo_mutations() {
    let mut store = CourseStore::load(UnavailableStore);
    let course = store.add_course(CourseDraft::new("Rust", ""), None);
    let module = store.add_module(&course, ModuleDraft::new("Ownership", ""), None);

    assert!(module.is_some());
    assert_eq!(store.all_nodes().len(), 2);
    assert!(matches!(store.save(), Err(StoreError::Storage(_))));
}

#[test]
fn malformed_blob_is_reported_by_try_load_and_ignored_by_load() {
    let storage = MemoryKeyValueStore::new();
    storage
        .set_item(DEFAULT_STORAGE_KEY, "{not json")
        .unwrap();

    assert!(matches!(
        CourseStore::try_load(&storage),
        Err(StoreError::MalformedState(_))
    ));
    let store = CourseStore::load(&storage);
    assert!(store.courses().is_empty());
    assert_eq!(store.canvas_scale(), 1.0);
}

#[test]
fn newer_state_version_is_rejected() {
    let storage = MemoryKeyValueStore::new();
    storage
        .set_item(DEFAULT_STORAGE_KEY, r#"{"state": {"courses": []}, "version": 7}"#)
        .unwrap();

    assert!(matches!(
        CourseStore::try_load(&storage),
        Err(StoreError::UnsupportedStateVersion {
            found: 7,
            supported: 0
        })
    ));
}

#[test]
fn legacy_blob_is_normalized_on_load() {
    let storage = MemoryKeyValueStore::new();
    storage
        .set_item(
            DEFAULT_STORAGE_KEY,
            r#"{
                "state": {
                    "courses": [{
                        "id": "c1",
                        "title": "Legacy",
                        "description": "",
                        "createdAt": "2024-01-01T00:00:00.000Z",
                        "updatedAt": "2024-01-01T00:00:00.000Z",
                        "modules": [{
                            "id": "m1",
                            "title": "Unplaced",
                            "description": "",
                            "stickies": [],
                            "createdAt": "2024-01-01T00:00:00.000Z",
                            "updatedAt": "2024-01-01T00:00:00.000Z"
                        }]
                    }],
                    "canvasOffset": {"x": 10, "y": 20},
                    "canvasScale": 12
                },
                "version": 0
            }"#,
        )
        .unwrap();

    let store = CourseStore::try_load(&storage).unwrap();
    let course = store.course("c1").unwrap();
    assert_eq!(course.position, Some(Position::new(200.0, 150.0)));
    assert_eq!(course.size, Some(EntityKind::Course.default_size()));
    assert_eq!(store.canvas_scale(), 3.0);
    assert_eq!(store.canvas_offset(), Position::new(10.0, 20.0));

    let nodes = store.all_nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].color, "#3B82F6");
    assert!(store.connections().is_empty());
}

#[test]
fn canvas_transform_is_clamped_and_resettable() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    assert_eq!(store.canvas_offset(), Position::new(0.0, 0.0));
    assert_eq!(store.canvas_scale(), 1.0);

    assert!(store.update_canvas_transform(Position::new(5.0, -5.0), 0.1));
    assert_eq!(store.canvas_scale(), 0.5);
    assert!(!store.update_canvas_transform(Position::new(1.0, 1.0), f64::INFINITY));
    assert_eq!(store.canvas_offset(), Position::new(5.0, -5.0));

    store.reset_canvas_view();
    assert_eq!(store.canvas_offset(), Position::new(0.0, 0.0));
    assert_eq!(store.canvas_scale(), 1.0);
}

#[test]
fn sample_courses_are_seeded_only_into_an_empty_store() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    assert_eq!(store.seed_sample_courses(), 3);
    assert_eq!(store.seed_sample_courses(), 0);

    let titles = store
        .courses()
        .iter()
        .map(|course| course.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![
            "React Native Fundamentals",
            "Advanced JavaScript Patterns",
            "UI/UX Design Principles",
        ]
    );
    assert_eq!(
        store.courses()[2].position,
        Some(Position::new(650.0, 50.0))
    );
}

#[test]
fn independent_stores_do_not_share_state() {
    let mut first = CourseStore::load(MemoryKeyValueStore::new());
    let second = CourseStore::load(MemoryKeyValueStore::new());
    first.add_course(CourseDraft::new("Rust", ""), None);

    assert_eq!(first.courses().len(), 1);
    assert!(second.courses().is_empty());
}

#[test]
fn deletes_refresh_every_surviving_ancestor() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new()).with_clock(SteppingClock::new());
    let tree = build_tree(&mut store);
    let stamps = |store: &CourseStore<MemoryKeyValueStore>| {
        (
            store
                .sticky(&tree.course, &tree.module, &tree.sticky)
                .map(|sticky| sticky.updated_at),
            store.module(&tree.course, &tree.module).unwrap().updated_at,
            store.course(&tree.course).unwrap().updated_at,
        )
    };

    let (sticky_before, module_before, course_before) = stamps(&store);
    assert!(store.delete_task(&tree.course, &tree.module, &tree.sticky, &tree.task));
    assert!(store
        .task(&tree.course, &tree.module, &tree.sticky, &tree.task)
        .is_none());
    let (sticky_after, module_after, course_after) = stamps(&store);
    assert!(sticky_after.unwrap() > sticky_before.unwrap());
    assert!(module_after > module_before);
    assert!(course_after > course_before);

    assert!(store.delete_sticky(&tree.course, &tree.module, &tree.sticky));
    let (sticky_gone, module_last, course_last) = stamps(&store);
    assert!(sticky_gone.is_none());
    assert!(module_last > module_after);
    assert!(course_last > course_after);
    assert!(store
        .module(&tree.course, &tree.module)
        .unwrap()
        .stickies
        .is_empty());
    assert_eq!(store.all_nodes().len(), 2);
}

#[test]
fn sticky_update_refreshes_module_and_course() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new()).with_clock(SteppingClock::new());
    let tree = build_tree(&mut store);
    let module_before = store.module(&tree.course, &tree.module).unwrap().updated_at;
    let course_before = store.course(&tree.course).unwrap().updated_at;
    let task_before = store
        .task(&tree.course, &tree.module, &tree.sticky, &tree.task)
        .unwrap()
        .updated_at;

    let patch = StickyPatch {
        title: Some("Borrow checker".to_string()),
        description: Some("Shared vs mutable".to_string()),
        ..StickyPatch::default()
    };
    assert!(store.update_sticky(&tree.course, &tree.module, &tree.sticky, patch));

    let sticky = store
        .sticky(&tree.course, &tree.module, &tree.sticky)
        .unwrap();
    assert_eq!(sticky.title, "Borrow checker");
    assert_eq!(sticky.description, "Shared vs mutable");
    assert!(sticky.updated_at > sticky.created_at);
    assert!(store.module(&tree.course, &tree.module).unwrap().updated_at > module_before);
    assert!(store.course(&tree.course).unwrap().updated_at > course_before);
    let task_after = store
        .task(&tree.course, &tree.module, &tree.sticky, &tree.task)
        .unwrap()
        .updated_at;
    assert_eq!(task_after, task_before);
}

#[test]
fn collapsing_a_sticky_hides_its_tasks_and_their_edges() {
    let mut store = CourseStore::load(MemoryKeyValueStore::new());
    let tree = build_tree(&mut store);

    let sticky_path = NodePath::sticky(&tree.course, &tree.module, &tree.sticky);
    assert!(store.toggle_node_collapse(&sticky_path));

    let visible = store
        .all_nodes_for_course(&tree.course)
        .into_iter()
        .map(|node| node.id)
        .collect::<Vec<_>>();
    assert_eq!(
        visible,
        vec![tree.course.clone(), tree.module.clone(), tree.sticky.clone()]
    );
    let edges = store.connections_for_course(&tree.course);
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|edge| edge.to_id != tree.task));
    assert_eq!(edges[1].from_id, tree.module);
    assert_eq!(edges[1].to_id, tree.sticky);
}
