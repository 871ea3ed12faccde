use strive_core::TaskBoard;
use strive_types::{Comment, PendingCredential, Session, TaskItem};

/// Creates a test task with a given id
pub fn create_test_task(id: &str, completed: bool) -> TaskItem {
    TaskItem {
        id: id.to_string(),
        text: format!("task {}", id),
        completed,
        date_added: "2026-08-23T09:00:00".to_string(),
    }
}

/// Creates a board holding `count` incomplete tasks named t0..tN
pub fn create_board_with_tasks(count: usize) -> TaskBoard {
    let mut board = TaskBoard::new();
    board.replace(
        (0..count)
            .map(|i| create_test_task(&format!("t{}", i), false))
            .collect(),
    );
    board
}

pub fn create_test_session(username: &str) -> Session {
    Session::new(
        format!("token-{}", username),
        username.to_string(),
        None,
    )
}

pub fn create_test_credential(username: &str) -> PendingCredential {
    PendingCredential {
        username: username.to_string(),
        password: "hunter42".to_string(),
    }
}

pub fn create_test_comment(username: &str, timestamp: &str) -> Comment {
    Comment {
        username: username.to_string(),
        text: format!("comment from {}", username),
        profile_photo: "default_dp.png".to_string(),
        timestamp: timestamp.parse().expect("valid timestamp fixture"),
    }
}
