use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use strive_core::FeedKind;
use strive_types::{Comment, LeaderboardEntry, TaskHistory, TaskItem};

/// Everything the engine tells the user interface. Render methods take the
/// full collection and replace whatever was shown before; `confirm_delete`
/// is the one place the engine waits on the user.
#[async_trait]
pub trait Frontend: Send + Sync {
    fn show_points(&self, points: i64);
    fn show_leaderboard(&self, entries: &[LeaderboardEntry]);
    fn show_comments(&self, comments: &[Comment]);
    /// `None` means the placeholder: the fetch failed or nothing was ever
    /// completed.
    fn show_history(&self, history: Option<&TaskHistory>);
    fn show_tasks(&self, tasks: &[TaskItem]);
    fn show_toast(&self, message: &str);
    fn set_feed_loading(&self, feed: FeedKind, loading: bool);
    async fn confirm_delete(&self, task: &TaskItem) -> bool;
}

/// Line-oriented stdout rendering for the bundled binary.
pub struct TerminalFrontend;

impl TerminalFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Frontend for TerminalFrontend {
    fn show_points(&self, points: i64) {
        println!("Your points: {}", points);
    }

    fn show_leaderboard(&self, entries: &[LeaderboardEntry]) {
        if entries.is_empty() {
            println!("No players yet!");
            return;
        }
        println!("-- Leaderboard --");
        for (rank, entry) in entries.iter().enumerate() {
            println!("{:>2}. {:<20} {:>5}", rank + 1, entry.username, entry.points);
        }
    }

    fn show_comments(&self, comments: &[Comment]) {
        if comments.is_empty() {
            println!("No comments yet. Be the first!");
            return;
        }
        println!("-- Comments --");
        for comment in comments {
            println!(
                "[{}] {}: {}",
                comment.timestamp.format("%H:%M"),
                comment.username,
                comment.text
            );
        }
    }

    fn show_history(&self, history: Option<&TaskHistory>) {
        let Some(history) = history else {
            println!("Complete a task to start your progress graph.");
            return;
        };
        println!("-- Tasks completed --");
        for (date, count) in history {
            println!("{}  {}", date, history_bar(*count));
        }
    }

    fn show_tasks(&self, tasks: &[TaskItem]) {
        if tasks.is_empty() {
            println!("No tasks for today. Add one!");
            return;
        }
        for (index, task) in tasks.iter().enumerate() {
            let mark = if task.completed { "x" } else { " " };
            println!("{}. [{}] {}", index + 1, mark, task.text);
        }
    }

    fn show_toast(&self, message: &str) {
        println!("! {}", message);
    }

    fn set_feed_loading(&self, feed: FeedKind, loading: bool) {
        // No spinner on a terminal; keep the signal visible in debug logs.
        debug!("{} feed loading: {}", feed, loading);
    }

    async fn confirm_delete(&self, task: &TaskItem) -> bool {
        print!("Delete \"{}\"? [y/N] ", task.text);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        if reader.read_line(&mut line).await.is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

/// A negative count from the server clamps to an empty bar instead of
/// wrapping into a huge allocation.
fn history_bar(count: i64) -> String {
    "#".repeat(count.max(0) as usize)
}
