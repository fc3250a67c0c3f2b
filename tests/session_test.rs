//! ログインIDのファイル保存テスト

use resume_ai_common::identity::{IdentityChange, IdentityStorage, IDENTITY_KEY};
use resume_ai_rust::session::{open_identity, FileStorage};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[test]
fn test_set_persists_across_processes() {
    let dir = tempdir().expect("一時ディレクトリ作成失敗");

    let mut store = open_identity(dir.path());
    assert!(!store.is_signed_in());
    store.set("a@b.com").expect("保存失敗");

    // 別プロセスで開き直した想定
    let reopened = open_identity(dir.path());
    assert_eq!(reopened.current(), Some("a@b.com"));
}

#[test]
fn test_clear_removes_entry() {
    let dir = tempdir().unwrap();
    let mut store = open_identity(dir.path());
    store.set("a@b.com").unwrap();
    store.clear().unwrap();

    let storage = FileStorage::open(dir.path().join("session.json"));
    assert_eq!(storage.read(IDENTITY_KEY), None);
}

#[test]
fn test_corrupt_file_is_signed_out() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("session.json"), "not json").unwrap();
    let store = open_identity(dir.path());
    assert!(!store.is_signed_in());
}

#[test]
fn test_listeners_observe_changes() {
    let dir = tempdir().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut store = open_identity(dir.path());
    store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
    store.set("a@b.com").unwrap();
    store.clear().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![IdentityChange::SignedIn("a@b.com".into()), IdentityChange::SignedOut]
    );
}
