//! ログインID（メールアドレス）のストア
//!
//! プロセス全体で1つのメールアドレスを保持する。
//! 初期化は `load`、破棄は `clear`。値が変わるたびに購読者へ通知し、
//! 各画面が個別に読みに行かなくても同じ値を観測できるようにする。

use crate::error::{Error, Result};

/// 保存キー
pub const IDENTITY_KEY: &str = "email";

/// 永続化先（ブラウザのlocalStorage、設定ディレクトリのファイルなど）
pub trait IdentityStorage {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// メモリ上のストレージ（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
}

impl IdentityStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 変更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityChange {
    SignedIn(String),
    SignedOut,
}

impl IdentityChange {
    pub fn email(&self) -> Option<&str> {
        match self {
            IdentityChange::SignedIn(email) => Some(email),
            IdentityChange::SignedOut => None,
        }
    }
}

/// 購読ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&IdentityChange) + Send + Sync>;

pub struct IdentityStore<S> {
    storage: S,
    current: Option<String>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S: IdentityStorage> IdentityStore<S> {
    /// ストレージから読み込んで初期化
    pub fn load(storage: S) -> Self {
        let current = storage.read(IDENTITY_KEY).filter(|v| !v.trim().is_empty());
        Self {
            storage,
            current,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// 未ログインなら `MissingIdentity`（呼び出し側はサインイン画面へ）
    pub fn require(&self) -> Result<String> {
        self.current.clone().ok_or(Error::MissingIdentity)
    }

    pub fn set(&mut self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::MissingField("email"));
        }
        self.storage.write(IDENTITY_KEY, email)?;
        self.current = Some(email.to_string());
        tracing::info!(email, "identity stored");
        self.notify(&IdentityChange::SignedIn(email.to_string()));
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(IDENTITY_KEY)?;
        self.current = None;
        tracing::info!("identity cleared");
        self.notify(&IdentityChange::SignedOut);
        Ok(())
    }

    /// 他タブなど外部からの変更を取り込む（変化があった場合のみ通知）
    pub fn reload(&mut self) -> bool {
        let latest = self.storage.read(IDENTITY_KEY).filter(|v| !v.trim().is_empty());
        if latest == self.current {
            return false;
        }
        self.current = latest;
        let change = match &self.current {
            Some(email) => IdentityChange::SignedIn(email.clone()),
            None => IdentityChange::SignedOut,
        };
        tracing::debug!(?change, "identity changed externally");
        self.notify(&change);
        true
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&IdentityChange) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn notify(&self, change: &IdentityChange) {
        for (_, listener) in &self.listeners {
            listener(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<IdentityChange>>>, impl Fn(&IdentityChange) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |change: &IdentityChange| sink.lock().unwrap().push(change.clone()))
    }

    #[test]
    fn test_load_empty() {
        let store = IdentityStore::load(MemoryStorage::default());
        assert!(!store.is_signed_in());
        assert!(matches!(store.require(), Err(Error::MissingIdentity)));
    }

    #[test]
    fn test_load_existing() {
        let mut storage = MemoryStorage::default();
        storage.write(IDENTITY_KEY, "a@b.com").unwrap();
        let store = IdentityStore::load(storage);
        assert_eq!(store.current(), Some("a@b.com"));
        assert_eq!(store.require().unwrap(), "a@b.com");
    }

    #[test]
    fn test_set_and_clear_notify() {
        let mut store = IdentityStore::load(MemoryStorage::default());
        let (seen, listener) = recorder();
        store.subscribe(listener);

        store.set("  a@b.com ").unwrap();
        assert_eq!(store.current(), Some("a@b.com"));
        assert_eq!(store.storage().read(IDENTITY_KEY).as_deref(), Some("a@b.com"));

        store.clear().unwrap();
        assert_eq!(store.current(), None);
        assert_eq!(store.storage().read(IDENTITY_KEY), None);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![IdentityChange::SignedIn("a@b.com".into()), IdentityChange::SignedOut]
        );
    }

    #[test]
    fn test_set_empty_rejected() {
        let mut store = IdentityStore::load(MemoryStorage::default());
        assert!(matches!(store.set("   "), Err(Error::MissingField("email"))));
        assert!(!store.is_signed_in());
    }

    #[test]
    fn test_reload_detects_external_change() {
        let mut store = IdentityStore::load(MemoryStorage::default());
        let (seen, listener) = recorder();
        store.subscribe(listener);

        // 変化なし
        assert!(!store.reload());

        // 別タブで書き込まれた想定
        store.storage.write(IDENTITY_KEY, "x@y.com").unwrap();
        assert!(store.reload());
        assert_eq!(store.current(), Some("x@y.com"));

        store.storage.remove(IDENTITY_KEY).unwrap();
        assert!(store.reload());
        assert_eq!(store.current(), None);

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = IdentityStore::load(MemoryStorage::default());
        let (seen, listener) = recorder();
        let id = store.subscribe(listener);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.set("a@b.com").unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_change_email() {
        assert_eq!(IdentityChange::SignedIn("a@b.com".into()).email(), Some("a@b.com"));
        assert_eq!(IdentityChange::SignedOut.email(), None);
    }
}
