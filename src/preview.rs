//! プレビューファイル
//!
//! ブラウザのObject URLの代わりに一時ファイルを使う。解放でファイルを消す。

use resume_ai_common::api::ResumeContent;
use resume_ai_common::workspace::PreviewStore;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PreviewFiles {
    dir: PathBuf,
    next: u32,
}

impl PreviewFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), next: 0 }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// 内容の種類から拡張子を推定
pub fn extension_for(content: &ResumeContent) -> &'static str {
    match content.content_type.as_deref() {
        Some(ct) if ct.starts_with("application/pdf") => "pdf",
        Some(ct) if ct.contains("wordprocessingml") => "docx",
        _ => "html",
    }
}

impl PreviewStore for PreviewFiles {
    type Handle = PathBuf;

    fn create(&mut self, content: ResumeContent) -> PathBuf {
        self.next += 1;
        let path = self
            .dir
            .join(format!("preview_{}_{}.{}", std::process::id(), self.next, extension_for(&content)));
        let written = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, &content.bytes));
        if let Err(error) = written {
            tracing::warn!(path = %path.display(), %error, "failed to write preview");
        }
        path
    }

    fn release(&mut self, handle: PathBuf) {
        if let Err(error) = std::fs::remove_file(&handle) {
            tracing::debug!(path = %handle.display(), %error, "preview already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_release() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let mut previews = PreviewFiles::new(dir.path());
        let path = previews.create(ResumeContent::html("<p>x</p>"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        assert_eq!(std::fs::read_to_string(&path).expect("読み込み失敗"), "<p>x</p>");

        previews.release(path.clone());
        assert!(!path.exists());
    }

    #[test]
    fn test_extension_for() {
        let pdf = ResumeContent {
            bytes: vec![],
            content_type: Some("application/pdf".into()),
        };
        assert_eq!(extension_for(&pdf), "pdf");
        assert_eq!(extension_for(&ResumeContent::default()), "html");
    }
}
