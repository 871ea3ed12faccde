use serde::{Deserialize, Serialize};

/// Maximum number of tasks allowed for the active day.
pub const DAILY_TASK_CAP: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub date_added: String, // ISO 8601 string, server-issued
}
