use std::{cell::RefCell, collections::HashMap, path::PathBuf};

use anyhow::Context;

use crate::api::{AuthToken, User};

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: AuthToken,
}

/// Simple string key-value persistence
pub trait SessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<HashMap<String, String>>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object on disk
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }

    /// A file that does not parse counts as empty, so the next write replaces it
    fn read(&self) -> anyhow::Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = ?self.path, error = %e, "discarding corrupt session file");
                HashMap::new()
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => {
                Err(e).with_context(|| format!("reading session file {:?}", self.path))
            }
        }
    }

    fn write(&self, data: &HashMap<String, String>) -> anyhow::Result<()> {
        let s = serde_json::to_string_pretty(data).context("serializing session")?;
        std::fs::write(&self.path, s)
            .with_context(|| format!("writing session file {:?}", self.path))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut data = self.read()?;
        data.insert(key.to_string(), value.to_string());
        self.write(&data)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut data = self.read()?;
        if data.remove(key).is_some() {
            self.write(&data)?;
        }
        Ok(())
    }
}

/// The logged-in user, if any, kept in sync with a [`SessionStore`].
///
/// Storage failures are logged and otherwise ignored: the in-memory session
/// is always the source of truth for the running program.
pub struct SessionContext<S> {
    store: S,
    current: Option<Session>,
}

impl<S: SessionStore> SessionContext<S> {
    pub fn new(store: S) -> SessionContext<S> {
        SessionContext {
            store,
            current: None,
        }
    }

    /// Restores the session persisted by a previous run
    pub fn hydrate(store: S) -> SessionContext<S> {
        let mut this = SessionContext::new(store);
        let user = this.store.get(USER_KEY);
        let token = this.store.get(TOKEN_KEY);
        match (user, token) {
            (Ok(Some(user)), Ok(Some(token))) => match serde_json::from_str::<User>(&user) {
                Ok(user) => {
                    tracing::debug!(user = %user.username, "restored session");
                    this.current = Some(Session {
                        user,
                        token: AuthToken(token),
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored user is corrupt, clearing session");
                    this.clear_store();
                }
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = ?e, "failed reading stored session");
            }
            _ => (),
        }
        this
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.current.as_ref().map(|s| &s.token)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn login(&mut self, user: User, token: AuthToken) {
        self.persist_user(&user);
        if let Err(e) = self.store.set(TOKEN_KEY, &token.0) {
            tracing::warn!(error = ?e, "failed persisting token");
        }
        self.current = Some(Session { user, token });
    }

    pub fn logout(&mut self) {
        self.current = None;
        self.clear_store();
    }

    /// Changes the logged-in user's data, eg. after an avatar upload.
    /// Does nothing when logged out.
    pub fn update_user(&mut self, f: impl FnOnce(&mut User)) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        f(&mut session.user);
        let user = session.user.clone();
        self.persist_user(&user);
    }

    fn persist_user(&self, user: &User) {
        let res = serde_json::to_string(user)
            .map_err(anyhow::Error::from)
            .and_then(|u| self.store.set(USER_KEY, &u));
        if let Err(e) = res {
            tracing::warn!(error = ?e, "failed persisting user");
        }
    }

    fn clear_store(&self) {
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.store.delete(key) {
                tracing::warn!(error = ?e, key, "failed clearing stored session");
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserId;

    fn alice() -> User {
        User {
            id: UserId(1),
            username: String::from("alice"),
            email: Some(String::from("alice@example.org")),
            avatar: None,
        }
    }

    #[test]
    fn hydrate_with_both_keys() {
        let store = MemoryStore::default();
        store
            .set(USER_KEY, &serde_json::to_string(&alice()).unwrap())
            .unwrap();
        store.set(TOKEN_KEY, "tok").unwrap();
        let ctx = SessionContext::hydrate(store);
        assert_eq!(ctx.user(), Some(&alice()));
        assert_eq!(ctx.token(), Some(&AuthToken(String::from("tok"))));
    }

    #[test]
    fn hydrate_needs_the_token_too() {
        let store = MemoryStore::default();
        store
            .set(USER_KEY, &serde_json::to_string(&alice()).unwrap())
            .unwrap();
        let ctx = SessionContext::hydrate(store);
        assert!(!ctx.is_logged_in());
    }

    #[test]
    fn corrupt_user_clears_everything() {
        let store = MemoryStore::default();
        store.set(USER_KEY, "{not json").unwrap();
        store.set(TOKEN_KEY, "tok").unwrap();
        let ctx = SessionContext::hydrate(store);
        assert!(!ctx.is_logged_in());
        assert_eq!(ctx.store().get(USER_KEY).unwrap(), None);
        assert_eq!(ctx.store().get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn login_update_logout() {
        let mut ctx = SessionContext::new(MemoryStore::default());
        ctx.login(alice(), AuthToken(String::from("tok")));
        ctx.update_user(|u| u.avatar = Some(String::from("/a.png")));

        let stored: User =
            serde_json::from_str(&ctx.store().get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.avatar.as_deref(), Some("/a.png"));

        ctx.logout();
        assert!(!ctx.is_logged_in());
        assert_eq!(ctx.store().get(USER_KEY).unwrap(), None);
        assert_eq!(ctx.store().get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut ctx = SessionContext::hydrate(FileStore::new(&path));
        assert!(!ctx.is_logged_in());
        ctx.login(alice(), AuthToken(String::from("tok")));

        let mut ctx = SessionContext::hydrate(FileStore::new(&path));
        assert_eq!(ctx.user().map(|u| u.id), Some(UserId(1)));
        ctx.logout();

        let ctx = SessionContext::hydrate(FileStore::new(&path));
        assert!(!ctx.is_logged_in());
    }

    #[test]
    fn file_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{truncated").unwrap();

        let mut ctx = SessionContext::hydrate(FileStore::new(&path));
        assert!(!ctx.is_logged_in());
        ctx.login(alice(), AuthToken(String::from("tok")));

        let mut ctx = SessionContext::hydrate(FileStore::new(&path));
        assert_eq!(ctx.user(), Some(&alice()));
        ctx.logout();

        let store = FileStore::new(&path);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(!SessionContext::hydrate(store).is_logged_in());
    }
}
