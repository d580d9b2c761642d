use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use atrium_application::{NavigationService, PermissionsStore};
use atrium_core::AccessToken;
use atrium_infrastructure::{HttpUserRoleSource, SessionCredentials};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Navigation state owned by one bearer token.
pub struct ConsoleSession {
    credentials: Arc<SessionCredentials>,
    navigation: NavigationService,
    permission_watch: JoinHandle<()>,
    last_seen: Mutex<Instant>,
}

impl ConsoleSession {
    pub fn navigation(&self) -> &NavigationService {
        &self.navigation
    }

    pub fn store(&self) -> &PermissionsStore {
        self.navigation.store()
    }

    async fn touch(&self) {
        *self.last_seen.lock().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_seen.lock().await.elapsed()
    }

    async fn end(&self) {
        self.credentials.sign_out();
        self.navigation.on_authentication_changed().await;
        self.permission_watch.abort();
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        self.permission_watch.abort();
    }
}

/// Sessions keyed by bearer token.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<AccessToken, Arc<ConsoleSession>>>,
    http_client: reqwest::Client,
    permissions_endpoint: Url,
    fetch_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(
        http_client: reqwest::Client,
        permissions_endpoint: Url,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            http_client,
            permissions_endpoint,
            fetch_timeout,
        }
    }

    /// Returns the session for `access_token`, opening one on first use.
    ///
    /// Opening a session counts as a sign-in and starts the first fetch in the
    /// background.
    pub async fn session(&self, access_token: AccessToken) -> Arc<ConsoleSession> {
        let existing = self.sessions.read().await.get(&access_token).cloned();
        if let Some(session) = existing {
            session.touch().await;
            return session;
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(&access_token).cloned() {
            session.touch().await;
            return session;
        }

        let session = Arc::new(self.open(access_token.clone()));
        sessions.insert(access_token, session.clone());
        info!(session_count = sessions.len(), "console session opened");

        session
    }

    /// Signs the session out and forgets it.
    pub async fn end(&self, access_token: &AccessToken) -> bool {
        let (removed, session_count) = {
            let mut sessions = self.sessions.write().await;
            (sessions.remove(access_token), sessions.len())
        };
        match removed {
            Some(session) => {
                session.end().await;
                info!(session_count, "console session ended");
                true
            }
            None => false,
        }
    }

    /// Ends sessions idle for at least `max_idle`. Returns how many were ended.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut idle = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (access_token, session) in sessions.iter() {
                if session.idle_for().await >= max_idle {
                    idle.push(access_token.clone());
                }
            }
        }

        let mut ended = 0;
        for access_token in idle {
            if self.end(&access_token).await {
                ended += 1;
            }
        }

        if ended > 0 {
            debug!(ended, "pruned idle console sessions");
        }
        ended
    }

    fn open(&self, access_token: AccessToken) -> ConsoleSession {
        let credentials = Arc::new(SessionCredentials::signed_in(access_token));
        let source = Arc::new(HttpUserRoleSource::new(
            self.http_client.clone(),
            self.permissions_endpoint.clone(),
            credentials.clone(),
        ));
        let store = PermissionsStore::new(source, credentials.clone())
            .with_fetch_timeout(self.fetch_timeout);
        let navigation = NavigationService::new(store);
        let permission_watch = navigation.spawn_permission_watch();
        let _ = navigation.store().spawn_refresh();

        ConsoleSession {
            credentials,
            navigation,
            permission_watch,
            last_seen: Mutex::new(Instant::now()),
        }
    }
}

/// Ends idle sessions on a fixed interval until the task is aborted.
pub fn spawn_idle_pruning(registry: Arc<SessionRegistry>, max_idle: Duration) -> JoinHandle<()> {
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            registry.prune_idle(max_idle).await;
        }
    })
}
