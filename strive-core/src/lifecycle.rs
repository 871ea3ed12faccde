use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppPhase {
    Init,
    Unauthenticated,
    Authenticated,
    Disposed,
}

/// Explicit application lifecycle: `Init -> Authenticated <-> Unauthenticated
/// -> Disposed`. The epoch increments on every transition; asynchronous work
/// captures the epoch when it starts and drops its result if the epoch moved
/// on before it finished (late responses after logout land here).
#[derive(Debug)]
pub struct Lifecycle {
    phase: AppPhase,
    epoch: u64,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: AppPhase::Init,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AppPhase::Authenticated
    }

    /// Entered after login, signup completion, or a successful restore.
    /// Re-entry over a live session is allowed and still moves the epoch,
    /// so work in flight for the previous account is retired.
    pub fn authenticate(&mut self) -> bool {
        self.transition(self.phase != AppPhase::Disposed, AppPhase::Authenticated)
    }

    /// Entered at logout or when a restore found no stored session.
    pub fn sign_out(&mut self) -> bool {
        self.transition(
            matches!(self.phase, AppPhase::Init | AppPhase::Authenticated),
            AppPhase::Unauthenticated,
        )
    }

    pub fn dispose(&mut self) -> bool {
        self.transition(self.phase != AppPhase::Disposed, AppPhase::Disposed)
    }

    fn transition(&mut self, allowed: bool, next: AppPhase) -> bool {
        if !allowed {
            debug!("ignoring transition {:?} -> {:?}", self.phase, next);
            return false;
        }
        self.phase = next;
        self.epoch += 1;
        true
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
