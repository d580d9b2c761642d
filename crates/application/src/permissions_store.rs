use std::sync::Arc;
use std::time::Duration;

use atrium_core::{AppError, AppResult};
use atrium_domain::UserRole;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{AuthenticationState, PermissionCache, UserRoleSource};

mod queries;

/// Lifecycle phase of the permission tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionsPhase {
    /// No signed-in user; nothing is loaded.
    Unauthenticated,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed.
    Error,
}

impl PermissionsPhase {
    /// Returns a stable transport value for this phase.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// Observable state of a [`PermissionsStore`].
///
/// The role and its cache are always replaced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsSnapshot {
    /// Current lifecycle phase.
    pub phase: PermissionsPhase,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    /// Last good permission tree.
    pub user_role: Option<Arc<UserRole>>,
    /// Lookup tables built from `user_role`.
    pub cache: Arc<PermissionCache>,
}

impl PermissionsSnapshot {
    /// Returns the state of a store with no signed-in user.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            phase: PermissionsPhase::Unauthenticated,
            error: None,
            user_role: None,
            cache: Arc::new(PermissionCache::new()),
        }
    }

    /// Returns whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == PermissionsPhase::Loading
    }
}

/// Holds the signed-in user's permission tree and answers point queries.
///
/// Every route change refetches the tree. Fetches are neither debounced nor
/// coalesced: whichever completes last overwrites the stored tree, even when
/// it was started first.
#[derive(Clone)]
pub struct PermissionsStore {
    source: Arc<dyn UserRoleSource>,
    authentication: Arc<dyn AuthenticationState>,
    fetch_timeout: Option<Duration>,
    state: Arc<watch::Sender<PermissionsSnapshot>>,
}

impl PermissionsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(
        source: Arc<dyn UserRoleSource>,
        authentication: Arc<dyn AuthenticationState>,
    ) -> Self {
        let (state, _receiver) = watch::channel(PermissionsSnapshot::unauthenticated());
        Self {
            source,
            authentication,
            fetch_timeout: None,
            state: Arc::new(state),
        }
    }

    /// Bounds every fetch by `timeout`; a zero duration disables the bound.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn snapshot(&self) -> PermissionsSnapshot {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PermissionsSnapshot> {
        self.state.subscribe()
    }

    /// Returns the last good permission tree, if any.
    #[must_use]
    pub fn user_role(&self) -> Option<Arc<UserRole>> {
        self.state.borrow().user_role.clone()
    }

    /// Fetches the permission tree without touching stored state.
    ///
    /// Returns `Ok(None)` without calling the source when no user is signed in.
    pub async fn fetch_user_role(&self) -> AppResult<Option<UserRole>> {
        if !self.authentication.is_authenticated() {
            return Ok(None);
        }

        let fetch = self.source.fetch_user_role();
        let role = match self.fetch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| {
                    AppError::Unavailable(format!(
                        "permission fetch timed out after {} ms",
                        timeout.as_millis()
                    ))
                })??,
            None => fetch.await?,
        };

        Ok(Some(role))
    }

    /// Refetches the tree and replaces stored state with the outcome.
    ///
    /// Failures are recorded in the snapshot and never returned. A network
    /// failure keeps the previous tree; a malformed payload installs an empty
    /// tree.
    pub async fn refresh_permissions(&self) {
        if !self.authentication.is_authenticated() {
            self.clear();
            return;
        }

        self.state.send_modify(|snapshot| {
            snapshot.phase = PermissionsPhase::Loading;
        });
        debug!("loading permission tree");

        let outcome = self.fetch_user_role().await;
        if !self.authentication.is_authenticated() {
            debug!("discarding permission fetch completed after sign-out");
            self.clear();
            return;
        }

        match outcome {
            Ok(Some(role)) => {
                info!(
                    module_count = role.modules().len(),
                    "permission tree loaded"
                );
                self.install(role, PermissionsPhase::Ready, None);
            }
            Ok(None) => self.clear(),
            Err(error @ AppError::Malformed(_)) => {
                warn!(error = %error, "permission tree malformed, treating as empty");
                self.install(
                    UserRole::default(),
                    PermissionsPhase::Error,
                    Some(error.to_string()),
                );
            }
            Err(error) => {
                warn!(error = %error, "permission fetch failed, keeping previous tree");
                self.state.send_modify(|snapshot| {
                    snapshot.phase = PermissionsPhase::Error;
                    snapshot.error = Some(error.to_string());
                });
            }
        }
    }

    /// Spawns [`Self::refresh_permissions`] without waiting for it.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move { store.refresh_permissions().await })
    }

    /// Refetches after the routing layer reports a new path.
    pub async fn on_route_change(&self) {
        self.refresh_permissions().await;
    }

    /// Reacts to a sign-in or sign-out reported by the auth collaborator.
    pub async fn on_authentication_changed(&self) {
        if self.authentication.is_authenticated() {
            self.refresh_permissions().await;
        } else {
            self.clear();
        }
    }

    /// Drops the tree and cache.
    pub fn clear(&self) {
        let changed = self.state.send_if_modified(|snapshot| {
            let cleared = PermissionsSnapshot::unauthenticated();
            if *snapshot == cleared {
                return false;
            }
            *snapshot = cleared;
            true
        });

        if changed {
            debug!("permission tree cleared");
        }
    }

    fn install(&self, role: UserRole, phase: PermissionsPhase, error: Option<String>) {
        let cache = Arc::new(PermissionCache::from_role(&role));
        self.state.send_replace(PermissionsSnapshot {
            phase,
            error,
            user_role: Some(Arc::new(role)),
            cache,
        });
    }
}
