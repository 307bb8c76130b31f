//! Route guard for the authenticated dashboard region.
//!
//! Three outcomes per evaluation:
//! - no usable session: redirect to `/login`, render nothing
//! - session holding a dashboard permission: render
//! - session without one: show a blocking notice and arm a deferred
//!   sign-out that redirects to `/login` once it succeeds
//!
//! The deferred sign-out is cancelable. It is dropped when the guard later
//! evaluates to another state, when [`RouteGuard::cancel_pending_logout`] is
//! called, or when the session changes before the delay elapses.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::authz::{PolicyEvaluator, DASHBOARD_PERMISSIONS};
use crate::models::user::User;
use crate::session::SessionStore;

/// The three navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/",
        }
    }
}

/// Navigation surface the guard and views drive.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    AuthenticatedAuthorized,
    AuthenticatedUnauthorized,
}

/// Blocking notice shown while a forced sign-out is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessNotice {
    pub title: String,
    pub detail: String,
}

impl AccessNotice {
    fn for_delay(delay: Duration) -> Self {
        let millis = delay.as_millis();
        let when = if millis % 1000 == 0 {
            let secs = millis / 1000;
            if secs == 1 {
                "1 second".to_string()
            } else {
                format!("{secs} seconds")
            }
        } else {
            format!("{millis} milliseconds")
        };

        Self {
            title: "You Don't Have Access To Visit This Page".to_string(),
            detail: format!("You will be automatically logged out after {when}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Redirect(Route),
    Render(User),
    Blocked(AccessNotice),
}

impl GuardOutcome {
    pub fn state(&self) -> GuardState {
        match self {
            GuardOutcome::Redirect(_) => GuardState::Unauthenticated,
            GuardOutcome::Render(_) => GuardState::AuthenticatedAuthorized,
            GuardOutcome::Blocked(_) => GuardState::AuthenticatedUnauthorized,
        }
    }
}

/// How an armed sign-out ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Signed out and redirected to `/login`.
    SignedOut,
    /// Nothing to sign out; no redirect.
    AlreadySignedOut,
    /// Cancelled before the delay elapsed.
    Cancelled,
    /// Sign-out failed; no redirect and no retry.
    Failed,
}

/// Handle to an armed deferred sign-out.
#[derive(Debug)]
pub struct PendingLogout {
    handle: JoinHandle<LogoutOutcome>,
}

impl PendingLogout {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the sign-out to fire or be cancelled.
    pub async fn wait(self) -> LogoutOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => LogoutOutcome::Cancelled,
            Err(err) => {
                tracing::warn!(error = %err, "forced logout task panicked");
                LogoutOutcome::Failed
            }
        }
    }
}

pub struct RouteGuard {
    session: SessionStore,
    evaluator: Arc<dyn PolicyEvaluator>,
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    pending: Mutex<Option<PendingLogout>>,
    last_state: Mutex<Option<GuardState>>,
}

impl RouteGuard {
    pub fn new(
        session: SessionStore,
        evaluator: Arc<dyn PolicyEvaluator>,
        navigator: Arc<dyn Navigator>,
        delay: Duration,
    ) -> Self {
        Self {
            session,
            evaluator,
            navigator,
            delay,
            pending: Mutex::new(None),
            last_state: Mutex::new(None),
        }
    }

    pub fn last_state(&self) -> Option<GuardState> {
        *self.last_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-evaluates the session on entry to the protected region.
    ///
    /// Redirects are performed through the navigator as well as returned.
    pub async fn evaluate(&self) -> GuardOutcome {
        let outcome = if !self.session.is_authenticated().await {
            self.cancel_pending_logout();
            tracing::debug!("no usable session; redirecting to login");
            self.navigator.navigate(Route::Login);
            GuardOutcome::Redirect(Route::Login)
        } else {
            match self.session.current_user() {
                Some(user) if self.evaluator.can(Some(&user), DASHBOARD_PERMISSIONS) => {
                    self.cancel_pending_logout();
                    GuardOutcome::Render(user)
                }
                user => {
                    tracing::info!(
                        user_id = ?user.as_ref().map(|u| u.id),
                        delay_ms = self.delay.as_millis() as u64,
                        "session lacks dashboard access; forcing logout"
                    );
                    self.arm_logout();
                    GuardOutcome::Blocked(AccessNotice::for_delay(self.delay))
                }
            }
        };

        *self.last_state.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome.state());
        outcome
    }

    fn arm_logout(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|p| !p.is_finished()) {
            return;
        }

        // Subscribe before spawning so a change right after arming is seen.
        let mut changes = self.session.subscribe();
        let session = self.session.clone();
        let navigator = Arc::clone(&self.navigator);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = changes.changed() => {
                    tracing::debug!("session changed; forced logout cancelled");
                    return LogoutOutcome::Cancelled;
                }
            }

            match session.sign_out().await {
                Ok(true) => {
                    navigator.navigate(Route::Login);
                    LogoutOutcome::SignedOut
                }
                Ok(false) => LogoutOutcome::AlreadySignedOut,
                Err(err) => {
                    tracing::warn!(error = %err, "forced logout failed");
                    LogoutOutcome::Failed
                }
            }
        });

        *pending = Some(PendingLogout { handle });
    }

    /// Cancels an armed sign-out. Returns whether one was still pending.
    pub fn cancel_pending_logout(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(pending) if !pending.is_finished() => {
                pending.cancel();
                tracing::debug!("pending forced logout cancelled");
                true
            }
            _ => false,
        }
    }

    /// Hands the armed sign-out to the caller, e.g. to wait for it.
    pub fn take_pending_logout(&self) -> Option<PendingLogout> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Guard for the public login/register views: an authenticated session is
/// sent to the dashboard instead.
pub async fn redirect_if_authenticated(
    session: &SessionStore,
    navigator: &dyn Navigator,
) -> Option<Route> {
    if session.is_authenticated().await {
        navigator.navigate(Route::Dashboard);
        Some(Route::Dashboard)
    } else {
        None
    }
}
