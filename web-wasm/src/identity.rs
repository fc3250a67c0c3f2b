//! localStorageに保存するログインID
//!
//! `IdentityStore` をコンテキストに1つだけ置き、メールアドレスはシグナルで配る。
//! 他タブでの変更は `storage` イベントで取り込む。

use gloo::events::EventListener;
use gloo::storage::{LocalStorage, Storage};
use leptos::prelude::*;
use resume_ai_common::identity::{IdentityStorage, IdentityStore};
use resume_ai_common::{Error, Result};

/// localStorageバックエンド
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl IdentityStorage for BrowserStorage {
    fn read(&self, key: &str) -> Option<String> {
        // gloo の get はJSONとして読むので生の値を取る
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| Error::Config(format!("localStorage write failed: {:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        LocalStorage::delete(key);
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub struct Identity {
    store: StoredValue<IdentityStore<BrowserStorage>>,
    email: RwSignal<Option<String>>,
}

impl Identity {
    /// ストアを初期化してコンテキストに登録
    pub fn provide() -> Self {
        let mut store = IdentityStore::load(BrowserStorage);
        let email = RwSignal::new(store.current().map(str::to_string));
        store.subscribe(move |change| email.set(change.email().map(str::to_string)));
        let store = StoredValue::new(store);

        EventListener::new(&window(), "storage", move |_| {
            store.update_value(|store| {
                store.reload();
            });
        })
        .forget();

        let identity = Self { store, email };
        provide_context(identity);
        identity
    }

    pub fn use_context() -> Self {
        expect_context::<Identity>()
    }

    /// 現在のメールアドレス（リアクティブ）
    pub fn email(&self) -> Option<String> {
        self.email.get()
    }

    pub fn is_signed_in(&self) -> bool {
        self.email.with(Option::is_some)
    }

    /// 未ログインなら `MissingIdentity`
    pub fn require(&self) -> Result<String> {
        self.email.get_untracked().ok_or(Error::MissingIdentity)
    }

    pub fn set(&self, email: &str) -> Result<()> {
        self.store
            .try_update_value(|store| store.set(email))
            .unwrap_or(Err(Error::MissingIdentity))
    }

    pub fn clear(&self) -> Result<()> {
        self.store
            .try_update_value(|store| store.clear())
            .unwrap_or(Ok(()))
    }
}
