//! ログインIDのファイル保存
//!
//! `~/.config/resume-ai/session.json` にキーと値のJSONとして書き出す。

use resume_ai_common::identity::{IdentityStorage, IdentityStore};
use resume_ai_common::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// 読み込み（ファイルがない・壊れている場合は空）
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(entries) => Some(entries),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "ignoring unreadable session file");
                    None
                }
            })
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Config(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content).map_err(|e| Error::Config(e.to_string()))
    }
}

impl IdentityStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// 既定パスのセッションを開く
pub fn open_identity(dir: &Path) -> IdentityStore<FileStorage> {
    IdentityStore::load(FileStorage::open(dir.join("session.json")))
}
