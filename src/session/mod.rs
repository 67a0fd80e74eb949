//! Per-session state carried across the redirect-after-post cycle.
//!
//! A session holds the signed-in user, the academic year the user is currently
//! working on, and a queue of one-shot flash notices. Sessions live in process
//! memory and are addressed by the id inside the signed session cookie
//! (see [`crate::middleware::session`]).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlashKind {
    Success,
    Error,
    /// Credential failures from the login form
    LoginFailure,
}

/// A one-shot notice shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn login_failure(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::LoginFailure,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub user: Option<SessionUser>,
    pub academic_year: Option<String>,
    pub flash: Vec<Flash>,
}

struct Entry {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

/// In-process session registry
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A session with no server-side entry yet. The entry is created by the
    /// first write, so requests that never touch the session leave nothing behind.
    pub fn detached(&self) -> Session {
        Session {
            id: Arc::new(RwLock::new(None)),
            store: self.clone(),
        }
    }

    /// Resume a live session, extending its expiry.
    pub async fn load(&self, id: Uuid) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(&id) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + self.ttl;
                Some(Session {
                    id: Arc::new(RwLock::new(Some(id))),
                    store: self.clone(),
                })
            }
            Some(_) => {
                sessions.remove(&id);
                None
            }
            None => None,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn read<R>(&self, id: Uuid, f: impl FnOnce(&SessionData) -> R) -> Option<R> {
        self.sessions.read().await.get(&id).map(|entry| f(&entry.data))
    }

    async fn write<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionData) -> R) -> Option<R> {
        self.sessions
            .write()
            .await
            .get_mut(&id)
            .map(|entry| f(&mut entry.data))
    }

    /// Apply `f` to the entry for `id`, or to a new entry when `id` is absent
    /// or gone. Expired sessions are swept whenever an entry is created.
    async fn upsert<R>(&self, id: Option<Uuid>, f: impl FnOnce(&mut SessionData) -> R) -> (Uuid, R) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let id = match id.filter(|id| sessions.contains_key(id)) {
            Some(id) => id,
            None => {
                sessions.retain(|_, entry| entry.expires_at > now);
                Uuid::new_v4()
            }
        };
        let entry = sessions.entry(id).or_insert_with(|| Entry {
            data: SessionData::default(),
            expires_at: now + self.ttl,
        });
        (id, f(&mut entry.data))
    }

    async fn remove(&self, id: Uuid) -> Option<SessionData> {
        self.sessions.write().await.remove(&id).map(|entry| entry.data)
    }
}

/// Handle to one session, inserted into request extensions by the session layer.
///
/// Clones share the id, so a rotation on sign-in is seen by the session layer
/// when it issues the cookie.
#[derive(Clone)]
pub struct Session {
    id: Arc<RwLock<Option<Uuid>>>,
    store: SessionStore,
}

impl Session {
    /// Server-side id, `None` until something is written
    pub async fn id(&self) -> Option<Uuid> {
        *self.id.read().await
    }

    async fn read<R>(&self, f: impl FnOnce(&SessionData) -> R) -> Option<R> {
        let id = self.id().await?;
        self.store.read(id, f).await
    }

    async fn write<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut id = self.id.write().await;
        let (current, result) = self.store.upsert(*id, f).await;
        *id = Some(current);
        result
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.read(|s| s.user.clone()).await.flatten()
    }

    pub async fn academic_year(&self) -> Option<String> {
        self.read(|s| s.academic_year.clone()).await.flatten()
    }

    /// Sign in under a fresh session id; the previous entry is dropped.
    /// Pending notices carry over, the current year does not.
    pub async fn sign_in(&self, user: SessionUser) {
        let mut id = self.id.write().await;
        let previous = match id.take() {
            Some(old) => self.store.remove(old).await,
            None => None,
        };
        let flash = previous.map(|data| data.flash).unwrap_or_default();

        let (fresh, ()) = self
            .store
            .upsert(None, |s| {
                s.user = Some(user);
                s.flash = flash;
            })
            .await;
        *id = Some(fresh);
    }

    pub async fn sign_out(&self) {
        self.write(|s| {
            s.user = None;
            s.academic_year = None;
        })
        .await;
    }

    pub async fn select_year(&self, year: impl Into<String>) {
        let year = year.into();
        self.write(|s| s.academic_year = Some(year)).await;
    }

    pub async fn flash(&self, notice: Flash) {
        self.write(|s| s.flash.push(notice)).await;
    }

    /// Snapshot the session for rendering, draining queued notices.
    pub async fn take(&self) -> SessionData {
        let Some(id) = self.id().await else {
            return SessionData::default();
        };
        self.store
            .write(id, |s| SessionData {
                user: s.user.clone(),
                academic_year: s.academic_year.clone(),
                flash: std::mem::take(&mut s.flash),
            })
            .await
            .unwrap_or_default()
    }
}
