use std::sync::Arc;

use atrium_domain::{
    Function, Module, ResolvedNavigationState, UserRole, order_tab_modules, resolve_navigation,
};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::PermissionsStore;

/// Memoized [`resolve_navigation`].
///
/// The result is recomputed only when the role reference or the path differs
/// from the previous call. Two distinct `Arc`s holding equal trees count as a
/// change.
#[derive(Debug, Default)]
pub struct NavigationSelector {
    role: Option<Arc<UserRole>>,
    path: Option<String>,
    resolved: ResolvedNavigationState,
    recomputations: u64,
}

impl NavigationSelector {
    /// Creates a selector holding the cleared state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the navigation state for the inputs.
    pub fn recompute(
        &mut self,
        role: Option<&Arc<UserRole>>,
        path: &str,
    ) -> &ResolvedNavigationState {
        let same_role = match (self.role.as_ref(), role) {
            (Some(previous), Some(next)) => Arc::ptr_eq(previous, next),
            (None, None) => true,
            _ => false,
        };

        if same_role && self.path.as_deref() == Some(path) {
            return &self.resolved;
        }

        self.resolved = role
            .map(|role| resolve_navigation(role, path))
            .unwrap_or_default();
        self.role = role.cloned();
        self.path = Some(path.to_owned());
        self.recomputations = self.recomputations.saturating_add(1);
        &self.resolved
    }

    /// Returns how many times the state was actually recomputed.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

struct NavigationInner {
    path: String,
    selector: NavigationSelector,
}

/// Composes the permission store with the current path.
///
/// Consumers read [`ResolvedNavigationState`] through [`Self::state`] or
/// [`Self::subscribe`] and never see the raw tree.
#[derive(Clone)]
pub struct NavigationService {
    store: PermissionsStore,
    inner: Arc<Mutex<NavigationInner>>,
    state: Arc<watch::Sender<ResolvedNavigationState>>,
}

impl NavigationService {
    /// Creates a navigation service over a permission store.
    #[must_use]
    pub fn new(store: PermissionsStore) -> Self {
        let (state, _receiver) = watch::channel(ResolvedNavigationState::default());
        Self {
            store,
            inner: Arc::new(Mutex::new(NavigationInner {
                path: String::new(),
                selector: NavigationSelector::new(),
            })),
            state: Arc::new(state),
        }
    }

    /// Returns the underlying permission store.
    #[must_use]
    pub fn store(&self) -> &PermissionsStore {
        &self.store
    }

    /// Returns the current navigation state.
    #[must_use]
    pub fn state(&self) -> ResolvedNavigationState {
        self.state.borrow().clone()
    }

    /// Subscribes to navigation state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResolvedNavigationState> {
        self.state.subscribe()
    }

    /// Returns the last path reported by the routing layer.
    pub async fn current_path(&self) -> String {
        self.inner.lock().await.path.clone()
    }

    /// Handles a navigation to `path`.
    ///
    /// The state is first recomputed against the tree already loaded, then
    /// the tree is refetched and the state recomputed again.
    pub async fn navigate(&self, path: &str) -> ResolvedNavigationState {
        {
            let mut inner = self.inner.lock().await;
            inner.path = path.to_owned();
        }
        self.sync().await;

        self.store.on_route_change().await;
        self.sync().await
    }

    /// Refetches permissions and recomputes the state.
    pub async fn refresh_permissions(&self) -> ResolvedNavigationState {
        self.store.refresh_permissions().await;
        self.sync().await
    }

    /// Reacts to a sign-in or sign-out and recomputes the state.
    pub async fn on_authentication_changed(&self) -> ResolvedNavigationState {
        self.store.on_authentication_changed().await;
        self.sync().await
    }

    /// Recomputes the state from the stored tree and the current path.
    pub async fn sync(&self) -> ResolvedNavigationState {
        let role = self.store.user_role();
        let next = {
            let mut inner = self.inner.lock().await;
            let NavigationInner { path, selector } = &mut *inner;
            selector.recompute(role.as_ref(), path.as_str()).clone()
        };

        let published = next.clone();
        let changed = self.state.send_if_modified(|current| {
            if *current == published {
                return false;
            }
            *current = published;
            true
        });
        if changed {
            debug!(
                current_module = %next.current_module,
                current_function = %next.current_function,
                sidebar_visible = next.is_action_sidebar_visible,
                "navigation state changed"
            );
        }

        next
    }

    /// Recomputes the state whenever the permission store publishes.
    ///
    /// Lets refreshes started elsewhere, such as [`PermissionsStore::spawn_refresh`],
    /// reach navigation consumers. The task holds a clone of the service, so
    /// callers abort the returned handle when the session ends.
    pub fn spawn_permission_watch(&self) -> JoinHandle<()> {
        let service = self.clone();
        let mut receiver = self.store.subscribe();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                service.sync().await;
            }
        })
    }

    /// Returns available modules ordered for the main tab bar.
    #[must_use]
    pub fn tab_modules(&self) -> Vec<Module> {
        order_tab_modules(&self.state.borrow().available_modules)
    }

    /// Returns active functions of the module, matched case-insensitively.
    #[must_use]
    pub fn module_functions(&self, module_name: &str) -> Vec<Function> {
        self.store.module_functions(module_name)
    }

    /// Returns how many times the selector recomputed the state.
    pub async fn recomputations(&self) -> u64 {
        self.inner.lock().await.selector.recomputations()
    }
}
