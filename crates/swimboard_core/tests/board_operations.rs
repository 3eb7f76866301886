use swimboard_core::{
    BoardConfig, BoardError, BoardService, LaneColor, LanePatch, MemoryKeyValueStore, Priority,
    StoreError, TaskDraft, TaskId, TaskPatch, TaskQuery, TaskSortKey,
};

fn setup() -> BoardService<MemoryKeyValueStore> {
    BoardService::load(MemoryKeyValueStore::new(), BoardConfig::default()).unwrap()
}

fn add(board: &mut BoardService<MemoryKeyValueStore>, title: &str, lane: &str) -> TaskId {
    board.add_task(TaskDraft::new(title, lane)).unwrap().id
}

fn assert_index_consistent(board: &BoardService<MemoryKeyValueStore>) {
    board.task_store().verify_index().unwrap();
    for task in board.task_store().tasks() {
        let listed = board
            .task_store()
            .tasks_by_status()
            .iter()
            .filter(|(_, ids)| ids.contains(&task.id))
            .map(|(lane, _)| lane.as_str())
            .collect::<Vec<_>>();
        assert_eq!(listed, vec![task.status.as_str()]);
        assert!(board.lane(&task.status).is_some());
    }
}

#[test]
fn add_then_move_updates_record_and_index() {
    let mut board = setup();

    let id = add(&mut board, "Fix bug", "todo");
    assert_eq!(board.task_store().len(), 1);
    assert_eq!(board.task_store().lane_ids("todo"), &[id]);

    assert!(board.move_task(id, "done").unwrap());
    assert!(board.task_store().lane_ids("todo").is_empty());
    assert_eq!(board.task_store().lane_ids("done"), &[id]);
    assert_eq!(board.task(id).unwrap().status, "done");
    assert_index_consistent(&board);
}

#[test]
fn move_to_current_lane_is_noop() {
    let mut board = setup();
    let id = add(&mut board, "Stay", "todo");
    let before = board.task_store().clone();

    assert!(!board.move_task(id, "todo").unwrap());
    assert_eq!(*board.task_store(), before);
}

#[test]
fn move_to_unknown_lane_is_rejected() {
    let mut board = setup();
    let id = add(&mut board, "Lost", "todo");

    let err = board.move_task(id, "ghost").unwrap_err();
    assert!(matches!(err, BoardError::UnknownLane(lane) if lane == "ghost"));
    assert_eq!(board.task(id).unwrap().status, "todo");
}

#[test]
fn add_then_delete_restores_state() {
    let mut board = setup();
    add(&mut board, "Existing", "todo");
    let before = board.task_store().clone();

    let id = add(&mut board, "Temporary", "in_progress");
    let removed = board.delete_task(id).unwrap().unwrap();

    assert_eq!(removed.id, id);
    assert_eq!(*board.task_store(), before);
}

#[test]
fn update_with_status_change_keeps_index_in_sync() {
    let mut board = setup();
    let a = add(&mut board, "a", "todo");
    let b = add(&mut board, "b", "done");

    let patch = TaskPatch {
        title: Some("  renamed  ".to_string()),
        status: Some("done".to_string()),
        priority: Some(Priority::Low),
        ..TaskPatch::default()
    };
    let updated = board.update_task(a, patch).unwrap().unwrap();

    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(board.task_store().lane_ids("done"), &[b, a]);
    assert!(board.task_store().lane_ids("todo").is_empty());
    assert_index_consistent(&board);
}

#[test]
fn update_rejects_unknown_status_without_changes() {
    let mut board = setup();
    let id = add(&mut board, "a", "todo");
    let before = board.task_store().clone();

    let err = board.update_task(id, TaskPatch::status("ghost")).unwrap_err();
    assert!(matches!(err, BoardError::UnknownLane(_)));
    assert_eq!(*board.task_store(), before);
}

#[test]
fn reorder_sets_exact_sequence_for_permutations() {
    let mut board = setup();
    let a = add(&mut board, "a", "todo");
    let b = add(&mut board, "b", "todo");
    let c = add(&mut board, "c", "todo");

    board.reorder_tasks("todo", vec![b, c, a]).unwrap();
    assert_eq!(board.task_store().lane_ids("todo"), &[b, c, a]);

    let err = board.reorder_tasks("todo", vec![a, b]).unwrap_err();
    assert!(matches!(err, BoardError::Store(StoreError::OrderMismatch { .. })));
    assert_eq!(board.task_store().lane_ids("todo"), &[b, c, a]);
}

#[test]
fn deleting_lane_moves_tasks_to_first_remaining_lane() {
    let mut board = setup();
    let first = add(&mut board, "first", "todo");
    let a = add(&mut board, "a", "in_progress");
    let b = add(&mut board, "b", "in_progress");

    let removed = board.delete_lane("in_progress").unwrap().unwrap();

    assert_eq!(removed.id, "in_progress");
    assert!(board.lane("in_progress").is_none());
    assert!(!board
        .task_store()
        .tasks_by_status()
        .contains_key("in_progress"));
    assert_eq!(board.task_store().lane_ids("todo"), &[first, a, b]);
    assert_eq!(board.task(a).unwrap().status, "todo");
    assert_index_consistent(&board);
}

#[test]
fn deleting_first_lane_moves_tasks_to_next_lane() {
    let mut board = setup();
    let a = add(&mut board, "a", "todo");

    board.delete_lane("todo").unwrap();

    assert_eq!(board.lanes()[0].id, "in_progress");
    assert_eq!(board.task_store().lane_ids("in_progress"), &[a]);
    assert_index_consistent(&board);
}

#[test]
fn lane_crud_and_reorder() {
    let mut board = setup();

    let review = board.add_lane("  Review ").unwrap();
    assert_eq!(review.name, "Review");
    assert!(LaneColor::PALETTE.contains(&review.color));
    assert!(board.task_store().lane_ids(&review.id).is_empty());
    assert!(board
        .task_store()
        .tasks_by_status()
        .contains_key(&review.id));

    let renamed = board
        .update_lane(&review.id, LanePatch::rename("QA"))
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "QA");

    board
        .reorder_lanes(&[review.id.as_str(), "done", "unknown", "todo"])
        .unwrap();
    let ids: Vec<_> = board.lanes().iter().map(|lane| lane.id.as_str()).collect();
    assert_eq!(ids, vec![review.id.as_str(), "done", "todo", "in_progress"]);

    assert!(matches!(
        board.add_lane("   "),
        Err(BoardError::InvalidLane(_))
    ));
}

#[test]
fn query_tasks_filters_and_sorts_for_list_view() {
    let mut board = setup();
    board
        .add_task(TaskDraft::new("Write docs", "todo").with_priority(Priority::Low))
        .unwrap();
    board
        .add_task(
            TaskDraft::new("Fix crash", "in_progress")
                .with_priority(Priority::High)
                .with_label("bug"),
        )
        .unwrap();
    board
        .add_task(TaskDraft::new("Fix typo", "done").with_label("bug"))
        .unwrap();

    let in_board_order: Vec<_> = board
        .query_tasks(&TaskQuery::default())
        .into_iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(in_board_order, vec!["Write docs", "Fix crash", "Fix typo"]);

    let bugs = TaskQuery {
        label: Some("BUG".to_string()),
        sort: Some(TaskSortKey::Title),
        descending: true,
        ..TaskQuery::default()
    };
    let titles: Vec<_> = board
        .query_tasks(&bugs)
        .into_iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Fix typo", "Fix crash"]);
}

#[test]
fn board_tasks_follow_lane_order() {
    let mut board = setup();
    add(&mut board, "first", "todo");
    add(&mut board, "second", "done");
    add(&mut board, "third", "todo");

    board.reorder_lanes(&["done", "todo"]).unwrap();

    let titles: Vec<_> = board
        .board_tasks()
        .into_iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, vec!["second", "first", "third"]);
    assert_eq!(board.task_store().len(), 3);
    assert_eq!(board.task_store().tasks().count(), 3);
}

#[test]
fn invariant_holds_across_mixed_operations() {
    let mut board = setup();
    let mut ids = Vec::new();
    for (index, lane) in ["todo", "in_progress", "done", "todo", "done"].iter().enumerate() {
        ids.push(add(&mut board, &format!("task {index}"), lane));
    }
    let extra = board.add_lane("Blocked").unwrap();

    board.move_task(ids[0], &extra.id).unwrap();
    board.update_task(ids[1], TaskPatch::status("todo")).unwrap();
    board.delete_task(ids[2]).unwrap();
    let todo = board.task_store().lane_ids("todo").to_vec();
    let mut reversed = todo.clone();
    reversed.reverse();
    board.reorder_tasks("todo", reversed).unwrap();
    board.delete_lane("todo").unwrap();
    board.move_task(ids[4], &extra.id).unwrap();

    assert_index_consistent(&board);
    assert_eq!(board.task_store().len(), 4);
    assert!(board.lane("todo").is_none());
}
