use crate::error::{ResumeAiError, Result};
use anyhow::Context;
use resume_ai_common::api::{API_BASE_URL_ENV, DEFAULT_API_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default_config());
        }
        Self::parse(path).map_err(|e| ResumeAiError::Config(format!("{:#}", e)))
    }

    fn parse(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("{} を読み込めません", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("{} の形式が不正です", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ResumeAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("resume-ai"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_base_url: None,
            timeout_seconds: 120,
        }
    }

    /// APIベースURL（環境変数 > 設定ファイル > 既定値）
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ResumeAiError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                trimmed
            )));
        }
        self.api_base_url = Some(trimmed.trim_end_matches('/').to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let config = Config::load_from(&dir.path().join("config.json")).expect("読み込み失敗");
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: Some("https://api.example.com".into()),
            timeout_seconds: 30,
        };
        config.save_to(&path).expect("保存失敗");
        assert_eq!(Config::load_from(&path).expect("読み込み失敗"), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base_url":"http://x"}"#).expect("書き込み失敗");
        let config = Config::load_from(&path).expect("読み込み失敗");
        assert_eq!(config.api_base_url.as_deref(), Some("http://x"));
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").expect("書き込み失敗");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ResumeAiError::Config(ref msg) if msg.contains("config.json")));
    }
}
