/// Credential persistence. One JSON document holds the bearer token and the
/// cached operator identity under fixed keys, so a session survives process
/// restarts the same way it survived page reloads in the dashboard this
/// backend was built for.
pub mod claims;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::{broadcast, RwLock};

use crate::models::AdminIdentity;

/// Session lifecycle notifications. `LoggedOut` fires when the backend
/// rejects the stored credentials and the session is wiped; an embedding UI
/// maps it to its sign-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedOut,
}

#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        SessionEvents { tx }
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        SessionEvents::new()
    }
}

/// Persisted document. Key names are fixed; session files written by earlier
/// builds keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(rename = "adminUser", skip_serializing_if = "Option::is_none")]
    admin_user: Option<AdminIdentity>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> Option<String>;
    async fn store_token(&self, token: &str);
    async fn identity(&self) -> Option<AdminIdentity>;
    async fn store_identity(&self, identity: &AdminIdentity);
    /// Drops both the token and the cached identity.
    async fn clear(&self);
}

/// Volatile store for tests and short-lived embeddings.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    doc: RwLock<SessionDocument>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        MemorySessionStore {
            doc: RwLock::new(SessionDocument {
                token: Some(token.to_string()),
                admin_user: None,
            }),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> Option<String> {
        self.doc.read().await.token.clone()
    }

    async fn store_token(&self, token: &str) {
        self.doc.write().await.token = Some(token.to_string());
    }

    async fn identity(&self) -> Option<AdminIdentity> {
        self.doc.read().await.admin_user.clone()
    }

    async fn store_identity(&self, identity: &AdminIdentity) {
        self.doc.write().await.admin_user = Some(identity.clone());
    }

    async fn clear(&self) {
        *self.doc.write().await = SessionDocument::default();
    }
}

/// File-backed store: loaded once on open, written through on every
/// mutation. An unreadable or corrupt file loads as an empty session; write
/// failures are logged and the in-memory view stays authoritative.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    doc: RwLock<SessionDocument>,
}

impl FileSessionStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => SessionDocument::default(),
        };
        FileSessionStore {
            path,
            doc: RwLock::new(doc),
        }
    }

    async fn persist(&self, doc: &SessionDocument) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
        }
        match serde_json::to_vec_pretty(doc) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.path, bytes).await {
                    tracing::warn!("failed to persist session file {:?}: {}", self.path, e);
                }
            }
            Err(e) => tracing::warn!("failed to serialize session: {}", e),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn token(&self) -> Option<String> {
        self.doc.read().await.token.clone()
    }

    async fn store_token(&self, token: &str) {
        let mut doc = self.doc.write().await;
        doc.token = Some(token.to_string());
        self.persist(&doc).await;
    }

    async fn identity(&self) -> Option<AdminIdentity> {
        self.doc.read().await.admin_user.clone()
    }

    async fn store_identity(&self, identity: &AdminIdentity) {
        let mut doc = self.doc.write().await;
        doc.admin_user = Some(identity.clone());
        self.persist(&doc).await;
    }

    async fn clear(&self) {
        let mut doc = self.doc.write().await;
        *doc = SessionDocument::default();
        self.persist(&doc).await;
    }
}
