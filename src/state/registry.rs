//! Directory of Active sessions.
//!
//! Both indexes live behind one `parking_lot::Mutex`, so register, rename,
//! remove, lookup, and enumeration form a single linearizable family. A
//! nickname is never visible in [`Registry::nicknames`] without also being
//! resolvable through [`Registry::lookup`].
//!
//! Lock order: registry, then a session's own locks. Session code never
//! calls back into the registry while holding its locks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::session::Session;
use super::uid::SessionId;

/// Registry operation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("nickname {0} is already taken")]
    NameTaken(String),
    #[error("session is not registered")]
    NotRegistered,
    #[error("session is already registered")]
    AlreadyRegistered,
    #[error("session is closing")]
    SessionClosed,
}

#[derive(Default)]
struct Directory {
    by_id: HashMap<SessionId, Arc<Session>>,
    by_nick: HashMap<String, SessionId>,
}

/// Authoritative directory of Active sessions.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Directory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `nick` for a session that is awaiting one.
    ///
    /// Check, insert, and the session's move to Active happen in one critical
    /// section: of two concurrent claims for the same name exactly one wins.
    pub fn register(&self, session: &Arc<Session>, nick: &str) -> Result<(), RegistryError> {
        let mut dir = self.inner.lock();
        if dir.by_id.contains_key(&session.id()) {
            return Err(RegistryError::AlreadyRegistered);
        }
        if dir.by_nick.contains_key(nick) {
            return Err(RegistryError::NameTaken(nick.to_owned()));
        }
        if !session.activate(nick.to_owned()) {
            return Err(RegistryError::SessionClosed);
        }
        dir.by_nick.insert(nick.to_owned(), session.id());
        dir.by_id.insert(session.id(), Arc::clone(session));
        Ok(())
    }

    /// Move a registered session to a new nickname. Returns the old one.
    ///
    /// Renaming to the current name succeeds without changes. On collision
    /// the old name stays in place.
    pub fn rename(&self, session: &Session, nick: &str) -> Result<String, RegistryError> {
        let mut dir = self.inner.lock();
        if !dir.by_id.contains_key(&session.id()) {
            return Err(RegistryError::NotRegistered);
        }
        let old = session.nickname();
        if old == nick {
            return Ok(old);
        }
        if dir.by_nick.contains_key(nick) {
            return Err(RegistryError::NameTaken(nick.to_owned()));
        }
        dir.by_nick.remove(&old);
        dir.by_nick.insert(nick.to_owned(), session.id());
        session.set_nickname(nick.to_owned());
        Ok(old)
    }

    /// Drop a session from both indexes. Absent IDs are a no-op.
    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        let mut dir = self.inner.lock();
        let session = dir.by_id.remove(&id)?;
        let nick = session.nickname();
        if dir.by_nick.get(&nick) == Some(&id) {
            dir.by_nick.remove(&nick);
        }
        Some(session)
    }

    pub fn lookup(&self, nick: &str) -> Option<Arc<Session>> {
        let dir = self.inner.lock();
        let id = dir.by_nick.get(nick)?;
        dir.by_id.get(id).cloned()
    }

    /// Snapshot of registered nicknames, in no particular order.
    pub fn nicknames(&self) -> Vec<String> {
        self.inner.lock().by_nick.keys().cloned().collect()
    }

    /// Snapshot of registered sessions for delivery outside the lock.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.inner.lock().by_id.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
