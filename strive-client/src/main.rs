use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::info;

use strive_client::engine::SyncEngine;
use strive_client::frontend::{Frontend, TerminalFrontend};
use strive_client::{build_engine, config::Config};
use strive_core::{AppPhase, CredentialOutcome};
use strive_types::Theme;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Strive client...");

    let config = Config::new();
    info!("API endpoint: {}", config.api_base_url);
    info!("State directory: {}", config.state_dir.display());

    let frontend = Arc::new(TerminalFrontend::new());
    let engine = build_engine(&config, frontend.clone());

    match engine.bootstrap().await {
        AppPhase::Authenticated => {
            if let Some(session) = engine.session().await {
                println!("Welcome back, {}!", session.username);
            }
        }
        _ => {
            println!("Not signed in. Use: login <username> <password>");
        }
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !dispatch(&engine, &frontend, line.trim()).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::error!("stdin error: {}", err);
                        break;
                    }
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    engine.dispose().await;
    info!("Client shutdown complete.");
}

/// Runs one command line. Returns false when the client should exit.
async fn dispatch(
    engine: &Arc<SyncEngine>,
    frontend: &Arc<TerminalFrontend>,
    line: &str,
) -> bool {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let authenticated = engine.phase().await == AppPhase::Authenticated;

    match command {
        "" => {}
        "help" => print_help(),
        "quit" | "exit" => return false,
        "login" => handle_login(engine, frontend, rest).await,
        "signup" => handle_signup(engine, frontend, rest).await,
        "logout" => {
            engine.sign_out().await;
            println!("Signed out.");
        }
        "theme" => match rest {
            "" => println!("theme: {}", engine.theme().as_str()),
            value => engine.set_theme(Theme::parse(value)),
        },
        "add" | "done" | "undo" | "rm" | "tasks" | "comment" | "rename" | "passwd" | "photo"
        | "refresh"
            if !authenticated =>
        {
            println!("Sign in first: login <username> <password>");
        }
        "add" => {
            if let Err(err) = engine.add_task(rest).await {
                frontend.show_toast(&err.to_string());
            }
        }
        "done" => handle_toggle(engine, frontend, rest, true).await,
        "undo" => handle_toggle(engine, frontend, rest, false).await,
        "rm" => {
            if let Some(task_id) = task_id_at(engine, rest).await {
                if let Err(err) = engine.delete_task(&task_id).await {
                    frontend.show_toast(&err.to_string());
                }
            }
        }
        "tasks" => engine.refresh_tasks().await,
        "comment" => match engine.post_comment(rest).await {
            Ok(true) => println!("Comment posted."),
            Ok(false) => {}
            Err(err) => frontend.show_toast(&err.to_string()),
        },
        "rename" => match engine.update_username(rest).await {
            Ok(true) => {
                println!("Username updated.");
                engine.refresh_dashboard().await;
            }
            Ok(false) => {}
            Err(err) => frontend.show_toast(&err.to_string()),
        },
        "passwd" => match engine.update_password(rest).await {
            Ok(true) => {
                println!("Password updated.");
                engine.refresh_dashboard().await;
            }
            Ok(false) => {}
            Err(err) => frontend.show_toast(&err.to_string()),
        },
        "photo" => handle_photo(engine, frontend, rest).await,
        "refresh" => engine.refresh_dashboard().await,
        _ => println!("Unknown command `{}`. Type `help`.", command),
    }
    true
}

async fn handle_login(engine: &Arc<SyncEngine>, frontend: &Arc<TerminalFrontend>, rest: &str) {
    let Some((username, password)) = rest.split_once(char::is_whitespace) else {
        println!("Usage: login <username> <password>");
        return;
    };
    match engine.submit_credentials(username, password.trim()).await {
        None => println!("Usage: login <username> <password>"),
        Some(CredentialOutcome::Authenticated(session)) => {
            println!("Welcome back, {}!", session.username);
        }
        Some(CredentialOutcome::NeedsSignup(credential)) => {
            println!(
                "No account for {} yet. Type `signup` to create it (or `signup <photo-path>` to add a profile photo).",
                credential.username
            );
        }
        Some(CredentialOutcome::Rejected { message }) => frontend.show_toast(&message),
    }
}

async fn handle_signup(engine: &Arc<SyncEngine>, frontend: &Arc<TerminalFrontend>, rest: &str) {
    let photo = match rest {
        "" => None,
        path => match tokio::fs::read(path).await {
            Ok(bytes) => Some((photo_file_name(path), bytes)),
            Err(err) => {
                println!("Could not read {}: {}", path, err);
                return;
            }
        },
    };
    match engine.complete_signup(photo).await {
        Ok(session) => println!("Welcome, {}!", session.username),
        Err(err) => frontend.show_toast(&err.to_string()),
    }
}

async fn handle_toggle(
    engine: &Arc<SyncEngine>,
    frontend: &Arc<TerminalFrontend>,
    rest: &str,
    completed: bool,
) {
    let Some(task_id) = task_id_at(engine, rest).await else {
        return;
    };
    if engine.toggle_task(&task_id, completed).await.is_err() {
        frontend.show_toast("Task could not be updated. Please try again.");
    }
}

async fn handle_photo(engine: &Arc<SyncEngine>, frontend: &Arc<TerminalFrontend>, rest: &str) {
    if rest.is_empty() {
        println!("Usage: photo <path>");
        return;
    }
    let bytes = match tokio::fs::read(rest).await {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("Could not read {}: {}", rest, err);
            return;
        }
    };
    match engine
        .update_profile_photo(&photo_file_name(rest), bytes)
        .await
    {
        Ok(_) => {
            println!("Profile photo updated.");
            engine.refresh_dashboard().await;
        }
        Err(err) => frontend.show_toast(&err.to_string()),
    }
}

/// Maps a 1-based display index onto the task's server id.
async fn task_id_at(engine: &Arc<SyncEngine>, rest: &str) -> Option<String> {
    let index: usize = match rest.parse() {
        Ok(index) => index,
        Err(_) => {
            println!("Usage: done|undo|rm <task number>");
            return None;
        }
    };
    let tasks = engine.tasks().await;
    match index.checked_sub(1).and_then(|i| tasks.get(i)) {
        Some(task) => Some(task.id.clone()),
        None => {
            println!("No such task.");
            None
        }
    }
}

fn photo_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo.png")
        .to_string()
}

fn print_help() {
    println!("Commands:");
    println!("  login <username> <password>   sign in, or start signup if the account is new");
    println!("  signup [photo-path]           finish creating the account from the last login");
    println!("  logout                        sign out and clear saved state");
    println!("  add <text>                    add a task for today (max 6 per day)");
    println!("  done <n> / undo <n>           toggle task n complete / incomplete");
    println!("  rm <n>                        delete task n");
    println!("  tasks                         re-pull today's task list");
    println!("  comment <text>                post to the community feed");
    println!("  rename <username>             change username");
    println!("  passwd <password>             change password (min 6 characters)");
    println!("  photo <path>                  upload a profile photo");
    println!("  theme [light|dark]            show or set the theme");
    println!("  refresh                       refresh the dashboard now");
    println!("  quit                          exit");
}
