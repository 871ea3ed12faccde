use std::collections::HashSet;
use strive_types::{DAILY_TASK_CAP, TaskItem};
use tracing::warn;

/// Local view of today's task list. Mutations are remote-authoritative; the
/// board only ever changes through a full replace or a toggle transaction.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<TaskItem>,
    pending_toggles: HashSet<String>,
}

/// Recorded prior state of one optimistic toggle. Must be handed back to
/// `commit_toggle` or `rollback_toggle`, never dropped silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleTxn {
    pub task_id: String,
    pub previous: bool,
}

#[derive(Debug, PartialEq)]
pub enum ToggleStart {
    /// Local state flipped; the remote update should be issued now.
    Started(ToggleTxn),
    /// A toggle for this task is already in flight; ignore this one.
    AlreadyPending,
    UnknownTask,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskItem> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Cap check run before any add reaches the network.
    pub fn can_add(&self) -> bool {
        self.tasks.len() < DAILY_TASK_CAP
    }

    /// Full replace from the authoritative server list. In-flight toggles
    /// stay pending; their transactions resolve against the new list.
    pub fn replace(&mut self, tasks: Vec<TaskItem>) {
        self.tasks = tasks;
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.pending_toggles.clear();
    }

    pub fn toggle_pending(&self, task_id: &str) -> bool {
        self.pending_toggles.contains(task_id)
    }

    /// Optimistically sets the item's completion to `completed`, recording
    /// the prior value. Toggles are serialized per item: a second toggle on
    /// the same task while one is in flight is refused.
    pub fn begin_toggle(&mut self, task_id: &str, completed: bool) -> ToggleStart {
        if self.pending_toggles.contains(task_id) {
            return ToggleStart::AlreadyPending;
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return ToggleStart::UnknownTask;
        };
        let previous = task.completed;
        task.completed = completed;
        self.pending_toggles.insert(task_id.to_string());
        ToggleStart::Started(ToggleTxn {
            task_id: task_id.to_string(),
            previous,
        })
    }

    /// The remote update succeeded; the optimistic value stands.
    pub fn commit_toggle(&mut self, txn: ToggleTxn) {
        self.pending_toggles.remove(&txn.task_id);
    }

    /// The remote update failed; restore the recorded prior value exactly.
    pub fn rollback_toggle(&mut self, txn: ToggleTxn) {
        self.pending_toggles.remove(&txn.task_id);
        match self.tasks.iter_mut().find(|t| t.id == txn.task_id) {
            Some(task) => task.completed = txn.previous,
            None => warn!(
                "task {} left the board before rollback, skipping",
                txn.task_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, completed: bool) -> TaskItem {
        TaskItem {
            id: id.to_string(),
            text: format!("task {}", id),
            completed,
            date_added: "2026-08-23T09:00:00".to_string(),
        }
    }

    fn board_with(count: usize) -> TaskBoard {
        let mut board = TaskBoard::new();
        board.replace((0..count).map(|i| task(&format!("t{}", i), false)).collect());
        board
    }

    #[test]
    fn test_cap_blocks_add_at_six() {
        let board = board_with(5);
        assert!(board.can_add());
        let board = board_with(6);
        assert!(!board.can_add());
    }

    #[test]
    fn test_toggle_commit_keeps_optimistic_value() {
        let mut board = board_with(2);
        let ToggleStart::Started(txn) = board.begin_toggle("t0", true) else {
            panic!("expected toggle to start");
        };
        assert!(board.get("t0").unwrap().completed);
        assert!(board.toggle_pending("t0"));

        board.commit_toggle(txn);
        assert!(board.get("t0").unwrap().completed);
        assert!(!board.toggle_pending("t0"));
    }

    #[test]
    fn test_toggle_rollback_restores_prior_state() {
        let mut board = board_with(2);
        let ToggleStart::Started(txn) = board.begin_toggle("t1", true) else {
            panic!("expected toggle to start");
        };
        assert!(board.get("t1").unwrap().completed);

        board.rollback_toggle(txn);
        assert!(!board.get("t1").unwrap().completed);
        assert!(!board.toggle_pending("t1"));
    }

    #[test]
    fn test_second_toggle_on_same_task_is_refused() {
        let mut board = board_with(1);
        let ToggleStart::Started(_txn) = board.begin_toggle("t0", true) else {
            panic!("expected toggle to start");
        };
        assert_eq!(board.begin_toggle("t0", false), ToggleStart::AlreadyPending);
        // The optimistic value from the first toggle is untouched.
        assert!(board.get("t0").unwrap().completed);
    }

    #[test]
    fn test_toggle_on_other_task_proceeds_while_one_pending() {
        let mut board = board_with(2);
        let ToggleStart::Started(_a) = board.begin_toggle("t0", true) else {
            panic!("expected toggle to start");
        };
        assert!(matches!(
            board.begin_toggle("t1", true),
            ToggleStart::Started(_)
        ));
    }

    #[test]
    fn test_unknown_task_toggle() {
        let mut board = board_with(1);
        assert_eq!(board.begin_toggle("missing", true), ToggleStart::UnknownTask);
    }

    #[test]
    fn test_rollback_after_replace_does_not_panic() {
        let mut board = board_with(1);
        let ToggleStart::Started(txn) = board.begin_toggle("t0", true) else {
            panic!("expected toggle to start");
        };
        board.replace(vec![task("fresh", false)]);
        board.rollback_toggle(txn);
        assert!(!board.toggle_pending("t0"));
        assert!(!board.get("fresh").unwrap().completed);
    }

    #[test]
    fn test_clear_drops_tasks_and_pending() {
        let mut board = board_with(3);
        let _ = board.begin_toggle("t0", true);
        board.clear();
        assert!(board.is_empty());
        assert!(!board.toggle_pending("t0"));
    }

    #[test]
    fn test_replace_keeps_pending_toggles() {
        let mut board = board_with(1);
        let _ = board.begin_toggle("t0", true);
        board.replace(vec![task("t0", true), task("t1", false)]);
        assert!(board.toggle_pending("t0"));
    }
}
