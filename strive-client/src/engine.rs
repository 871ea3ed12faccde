use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use strive_core::{
    AppPhase, CredentialOutcome, FeedKind, FeedTracker, Lifecycle, TaskBoard, ToggleStart,
    first_points, history_is_blank, normalize_credentials, resolve_login,
    sort_comments_newest_first, validate_new_password,
};
use strive_persistence::StateStore;
use strive_types::{ClientError, PendingCredential, Session, TaskItem, Theme};

use crate::api::ApiClient;
use crate::frontend::Frontend;

const ALL_FEEDS: [FeedKind; 4] = [
    FeedKind::MyPoints,
    FeedKind::Leaderboard,
    FeedKind::Comments,
    FeedKind::History,
];

/// Client-side state synchronization and session-recovery engine. Owns the
/// session, the task board, the feed bookkeeping, and the periodic dashboard
/// refresh loop; every remote interaction flows through here.
pub struct SyncEngine {
    api: Arc<ApiClient>,
    store: Arc<StateStore>,
    frontend: Arc<dyn Frontend>,
    refresh_interval: Duration,
    lifecycle: RwLock<Lifecycle>,
    board: RwLock<TaskBoard>,
    feeds: RwLock<FeedTracker>,
    session: RwLock<Option<Session>>,
    pending_signup: RwLock<Option<PendingCredential>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<StateStore>,
        frontend: Arc<dyn Frontend>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            api,
            store,
            frontend,
            refresh_interval,
            lifecycle: RwLock::new(Lifecycle::new()),
            board: RwLock::new(TaskBoard::new()),
            feeds: RwLock::new(FeedTracker::new()),
            session: RwLock::new(None),
            pending_signup: RwLock::new(None),
            refresh_task: Mutex::new(None),
        }
    }

    // --- lifecycle & session ---

    /// One-shot startup: restores a stored session if token and username are
    /// both present, entering the authenticated state directly.
    pub async fn bootstrap(self: &Arc<Self>) -> AppPhase {
        match self.store.load_session() {
            Some(session) => {
                info!("restored session for {}", session.username);
                self.enter_authenticated(session, false).await;
            }
            None => {
                debug!("no stored session");
                self.lifecycle.write().await.sign_out();
            }
        }
        self.phase().await
    }

    pub async fn phase(&self) -> AppPhase {
        self.lifecycle.read().await.phase()
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn has_pending_signup(&self) -> bool {
        self.pending_signup.read().await.is_some()
    }

    pub async fn refresh_loop_running(&self) -> bool {
        self.refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn theme(&self) -> Theme {
        self.store.load_theme()
    }

    pub fn set_theme(&self, theme: Theme) {
        if let Err(err) = self.store.save_theme(theme) {
            warn!("failed to persist theme: {}", err);
        }
    }

    /// Shuts the engine down for good; stops the loop and invalidates every
    /// in-flight response through the epoch.
    pub async fn dispose(&self) {
        self.stop_refresh_loop().await;
        self.lifecycle.write().await.dispose();
        info!("engine disposed");
    }

    // --- credential resolution ---

    /// A single credential submission. `None` means the input was blank and
    /// nothing happened. The outcome tells the caller whether the user is in,
    /// must finish signup, or saw a rejection to render inline.
    pub async fn submit_credentials(
        self: &Arc<Self>,
        username: &str,
        password: &str,
    ) -> Option<CredentialOutcome> {
        let (username, password) = normalize_credentials(username, password)?;
        info!("submitting credentials for {}", username);

        let credential = PendingCredential {
            username: username.clone(),
            password: password.clone(),
        };
        let attempt = self
            .api
            .login(&username, &password)
            .await
            .map(|resp| Session::new(resp.session_token, username.clone(), resp.profile_photo));

        let outcome = resolve_login(credential, attempt);
        match &outcome {
            CredentialOutcome::Authenticated(session) => {
                self.enter_authenticated(session.clone(), true).await;
            }
            CredentialOutcome::NeedsSignup(credential) => {
                info!(
                    "no account for {}, continuing as signup",
                    credential.username
                );
                *self.pending_signup.write().await = Some(credential.clone());
            }
            CredentialOutcome::Rejected { message } => {
                warn!("login rejected: {}", message);
            }
        }
        Some(outcome)
    }

    /// Second step of the flow, fed by the stashed credentials. They are
    /// consumed no matter what: a failure sends the user back to credential
    /// entry from scratch.
    pub async fn complete_signup(
        self: &Arc<Self>,
        photo: Option<(String, Vec<u8>)>,
    ) -> Result<Session, ClientError> {
        let Some(credential) = self.pending_signup.write().await.take() else {
            return Err(ClientError::validation("No signup in progress."));
        };
        info!("creating account for {}", credential.username);

        let created = self
            .api
            .add_user(&credential.username, &credential.password)
            .await?;
        self.api.set_token(Some(created.session_token.clone())).await;

        let profile_photo = match photo {
            Some((file_name, bytes)) => {
                match self.api.upload_profile_picture(&file_name, bytes).await {
                    Ok(uploaded) => Some(uploaded.file_path),
                    Err(err) => {
                        warn!("profile upload failed, abandoning sign-in: {}", err);
                        self.api.set_token(None).await;
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        let session = Session::new(created.session_token, credential.username, profile_photo);
        self.enter_authenticated(session.clone(), true).await;
        Ok(session)
    }

    /// Teardown mirrors its setup in reverse: the ticker stops before the
    /// remote call, and the local wipe happens whether or not the server
    /// acknowledged the logout.
    pub async fn sign_out(&self) {
        info!("signing out");
        self.stop_refresh_loop().await;
        if let Err(err) = self.api.logout().await {
            warn!("logout request failed, clearing session anyway: {}", err);
        }
        if let Err(err) = self.store.clear_all() {
            warn!("failed to clear stored state: {}", err);
        }
        self.api.set_token(None).await;
        *self.session.write().await = None;
        self.board.write().await.clear();
        self.lifecycle.write().await.sign_out();
    }

    async fn enter_authenticated(self: &Arc<Self>, session: Session, persist: bool) {
        // Entering over a live session (login as another account) retires the
        // previous epoch before the new identity is installed: responses still
        // in flight for the old account are dropped on arrival, and its task
        // board never bleeds into the new session.
        self.lifecycle.write().await.authenticate();
        self.board.write().await.clear();
        if persist {
            if let Err(err) = self.store.save_session(&session) {
                warn!("failed to persist session: {}", err);
            }
        }
        self.api.set_token(Some(session.token.clone())).await;
        *self.session.write().await = Some(session);
        self.start_refresh_loop().await;
    }

    // --- tasks ---

    /// Creates a task remotely, then re-pulls the authoritative list. There
    /// is no optimistic insert. Blank text and a full day are silent no-ops
    /// that never reach the network.
    pub async fn add_task(self: &Arc<Self>, text: &str) -> Result<bool, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        if !self.board.read().await.can_add() {
            debug!("daily task cap reached, add ignored");
            return Ok(false);
        }
        self.api.add_task(text).await?;
        self.refresh_tasks().await;
        Ok(true)
    }

    /// Optimistic completion toggle. The local flip renders immediately; a
    /// remote failure restores the recorded prior state before the error
    /// reaches the caller. A repeat toggle while one is in flight for the
    /// same task is ignored.
    pub async fn toggle_task(
        self: &Arc<Self>,
        task_id: &str,
        completed: bool,
    ) -> Result<(), ClientError> {
        let txn = match self.board.write().await.begin_toggle(task_id, completed) {
            ToggleStart::Started(txn) => txn,
            ToggleStart::AlreadyPending => {
                debug!("toggle already in flight for task {}", task_id);
                return Ok(());
            }
            ToggleStart::UnknownTask => {
                debug!("toggle for unknown task {}", task_id);
                return Ok(());
            }
        };
        self.show_board().await;

        match self.api.update_task(task_id, completed).await {
            Ok(()) => {
                self.board.write().await.commit_toggle(txn);
                // Completion moves points; failures here never undo the toggle.
                self.refresh_dashboard().await;
                Ok(())
            }
            Err(err) => {
                warn!("toggle failed for task {}, rolling back: {}", task_id, err);
                self.board.write().await.rollback_toggle(txn);
                self.show_board().await;
                Err(err)
            }
        }
    }

    /// Asks the frontend for confirmation first; a declined prompt issues no
    /// network traffic. Returns whether a delete actually happened.
    pub async fn delete_task(self: &Arc<Self>, task_id: &str) -> Result<bool, ClientError> {
        let Some(task) = self.board.read().await.get(task_id).cloned() else {
            debug!("delete for unknown task {}", task_id);
            return Ok(false);
        };
        if !self.frontend.confirm_delete(&task).await {
            debug!("delete of task {} declined", task_id);
            return Ok(false);
        }
        self.api.delete_task(task_id).await?;
        self.refresh_tasks().await;
        self.refresh_dashboard().await;
        Ok(true)
    }

    /// Pulls the authoritative list; on failure the board renders empty
    /// rather than keeping stale entries.
    pub async fn refresh_tasks(&self) {
        match self.api.get_my_tasks().await {
            Ok(tasks) => self.board.write().await.replace(tasks),
            Err(err) => {
                warn!("task list refresh failed, rendering empty: {}", err);
                self.board.write().await.replace(Vec::new());
            }
        }
        self.show_board().await;
    }

    pub async fn tasks(&self) -> Vec<TaskItem> {
        self.board.read().await.tasks().to_vec()
    }

    async fn show_board(&self) {
        let tasks = self.tasks().await;
        self.frontend.show_tasks(&tasks);
    }

    // --- comments ---

    pub async fn post_comment(self: &Arc<Self>, text: &str) -> Result<bool, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        self.api.add_comment(text).await?;
        let epoch = self.lifecycle.read().await.epoch();
        self.refresh_feed(FeedKind::Comments, epoch).await;
        Ok(true)
    }

    // --- profile editing ---

    /// Renames the account. The server answers with a rotated token and the
    /// canonical new name; both replace the live session and the stored keys.
    pub async fn update_username(&self, new_username: &str) -> Result<bool, ClientError> {
        let new_username = new_username.trim();
        if new_username.is_empty() {
            return Ok(false);
        }
        let current = self.session.read().await.as_ref().map(|s| s.username.clone());
        if current.as_deref() == Some(new_username) {
            return Ok(false);
        }

        let renamed = self.api.update_username(new_username).await?;
        info!("username changed to {}", renamed.new_username);
        self.api.set_token(Some(renamed.new_token.clone())).await;
        if let Some(session) = self.session.write().await.as_mut() {
            session.token = renamed.new_token.clone();
            session.username = renamed.new_username.clone();
        }
        if let Err(err) = self.store.save_token(&renamed.new_token) {
            warn!("failed to persist rotated token: {}", err);
        }
        if let Err(err) = self.store.save_username(&renamed.new_username) {
            warn!("failed to persist username: {}", err);
        }
        Ok(true)
    }

    /// Length is checked locally before anything leaves the process.
    pub async fn update_password(&self, new_password: &str) -> Result<bool, ClientError> {
        if new_password.is_empty() {
            return Ok(false);
        }
        validate_new_password(new_password)?;

        let rotated = self.api.update_password(new_password).await?;
        self.api.set_token(Some(rotated.new_token.clone())).await;
        if let Some(session) = self.session.write().await.as_mut() {
            session.token = rotated.new_token.clone();
        }
        if let Err(err) = self.store.save_token(&rotated.new_token) {
            warn!("failed to persist rotated token: {}", err);
        }
        Ok(true)
    }

    pub async fn update_profile_photo(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<bool, ClientError> {
        let uploaded = self.api.upload_profile_picture(file_name, bytes).await?;
        if let Some(session) = self.session.write().await.as_mut() {
            session.profile_photo = uploaded.file_path.clone();
        }
        if let Err(err) = self.store.save_photo(&uploaded.file_path) {
            warn!("failed to persist photo reference: {}", err);
        }
        Ok(true)
    }

    // --- dashboard reconciliation loop ---

    /// Starts (or restarts) the ticker. The first tick fires immediately, so
    /// entering the authenticated state refreshes at once and then every
    /// interval.
    pub async fn start_refresh_loop(self: &Arc<Self>) {
        let mut slot = self.refresh_task.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let engine = Arc::clone(self);
        let period = self.refresh_interval;
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                engine.refresh_dashboard().await;
            }
        }));
        debug!("dashboard refresh loop started");
    }

    /// Stops the ticker only. Feed fetches already in flight keep running;
    /// their results are dropped by the epoch guard instead.
    pub async fn stop_refresh_loop(&self) {
        if let Some(task) = self.refresh_task.lock().await.take() {
            task.abort();
            debug!("dashboard refresh loop stopped");
        }
    }

    /// One reconciliation tick: all four feeds are issued at once, each in
    /// its own task with its own failure handling. The tick itself never
    /// waits for slow feeds; ordering is restored by generation numbers.
    /// Every task carries the epoch of the tick that spawned it.
    pub async fn refresh_dashboard(self: &Arc<Self>) {
        debug!("dashboard refresh tick");
        let epoch = self.lifecycle.read().await.epoch();
        for feed in ALL_FEEDS {
            let engine = Arc::clone(self);
            tokio::spawn(async move {
                engine.refresh_feed(feed, epoch).await;
            });
        }
    }

    async fn refresh_feed(self: &Arc<Self>, feed: FeedKind, epoch: u64) {
        // A spawned task may get its first poll only after a teardown or a
        // re-login. The tick's epoch is stale by then and nothing is issued.
        if self.lifecycle.read().await.epoch() != epoch {
            debug!("{} refresh skipped, lifecycle moved since the tick", feed);
            return;
        }
        let generation = self.feeds.write().await.begin(feed);
        match feed {
            FeedKind::MyPoints => self.refresh_my_points(generation, epoch).await,
            FeedKind::Leaderboard => {
                self.frontend.set_feed_loading(feed, true);
                self.refresh_leaderboard(generation, epoch).await;
            }
            FeedKind::Comments => {
                self.frontend.set_feed_loading(feed, true);
                self.refresh_comments(generation, epoch).await;
            }
            FeedKind::History => self.refresh_history(generation, epoch).await,
        }
    }

    /// True when this response may still act on the world: nothing newer for
    /// the feed rendered first and no lifecycle transition happened since the
    /// fetch was issued. Stale responses do nothing at all.
    async fn may_apply(&self, feed: FeedKind, generation: u64, epoch: u64) -> bool {
        if self.lifecycle.read().await.epoch() != epoch {
            debug!("{} response from a previous epoch dropped", feed);
            return false;
        }
        if !self.feeds.write().await.try_apply(feed, generation) {
            debug!("stale {} response dropped", feed);
            return false;
        }
        true
    }

    async fn refresh_my_points(&self, generation: u64, epoch: u64) {
        let result = self.api.get_my_points().await;
        if !self.may_apply(FeedKind::MyPoints, generation, epoch).await {
            return;
        }
        match result {
            Ok(records) => self.frontend.show_points(first_points(&records)),
            Err(err) => {
                // Never leave a previous value standing on failure.
                warn!("my-points fetch failed, showing 0: {}", err);
                self.frontend.show_points(0);
            }
        }
    }

    async fn refresh_leaderboard(&self, generation: u64, epoch: u64) {
        let result = self.api.get_points().await;
        self.frontend.set_feed_loading(FeedKind::Leaderboard, false);
        if !self.may_apply(FeedKind::Leaderboard, generation, epoch).await {
            return;
        }
        match result {
            Ok(entries) => self.frontend.show_leaderboard(&entries),
            Err(err) => {
                warn!("leaderboard fetch failed: {}", err);
                self.frontend.show_toast("Could not refresh leaderboard.");
            }
        }
    }

    async fn refresh_comments(&self, generation: u64, epoch: u64) {
        let result = self.api.get_comments().await;
        self.frontend.set_feed_loading(FeedKind::Comments, false);
        if !self.may_apply(FeedKind::Comments, generation, epoch).await {
            return;
        }
        match result {
            Ok(mut comments) => {
                sort_comments_newest_first(&mut comments);
                self.frontend.show_comments(&comments);
            }
            Err(err) => {
                warn!("comments fetch failed: {}", err);
                self.frontend.show_toast("Could not refresh comments.");
            }
        }
    }

    async fn refresh_history(&self, generation: u64, epoch: u64) {
        let result = self.api.get_task_history().await;
        if !self.may_apply(FeedKind::History, generation, epoch).await {
            return;
        }
        match result {
            Ok(history) if !history_is_blank(&history) => {
                self.frontend.show_history(Some(&history));
            }
            Ok(_) => self.frontend.show_history(None),
            Err(err) => {
                warn!("history fetch failed, showing placeholder: {}", err);
                self.frontend.show_history(None);
            }
        }
    }
}
