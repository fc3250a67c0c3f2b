//! ダッシュボード: 保存済みレジュメの一覧・検索・削除

use crate::error::{Error, Result};

/// 一覧の1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSummary {
    pub id: String,
    pub title: String,
}

impl ResumeSummary {
    /// サーバーはタイトルを返さないのでIDから生成する
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: default_title(&id),
            id,
        }
    }
}

/// 既定タイトル `Resume <IDの先頭6文字>`
pub fn default_title(id: &str) -> String {
    let short: String = id.chars().take(6).collect();
    format!("Resume {}", short)
}

/// ダウンロード時のファイル名
pub fn download_file_name(id: &str) -> String {
    format!("resume_{}.html", id)
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    resumes: Vec<ResumeSummary>,
    query: String,
    loading: bool,
    deleting: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 取得したID一覧を設定
    pub fn set_resumes(&mut self, ids: Vec<String>) {
        self.set_summaries(ids.into_iter().map(ResumeSummary::from_id).collect());
    }

    /// タイトル付きの一覧を設定
    pub fn set_summaries(&mut self, resumes: Vec<ResumeSummary>) {
        self.loading = false;
        self.resumes = resumes;
    }

    pub fn fail_loading(&mut self, error: Error) -> Error {
        self.loading = false;
        error
    }

    pub fn resumes(&self) -> &[ResumeSummary] {
        &self.resumes
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// タイトルの部分一致（大文字小文字無視）で絞り込み。空白も含めてそのまま比較する
    pub fn visible(&self) -> Vec<&ResumeSummary> {
        let needle = self.query.to_lowercase();
        self.resumes
            .iter()
            .filter(|r| needle.is_empty() || r.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.as_deref() == Some(id)
    }

    /// 削除開始（確認済みであること）
    pub fn begin_delete(&mut self, id: &str) -> Result<()> {
        if self.deleting.is_some() {
            return Err(Error::Busy("delete"));
        }
        self.deleting = Some(id.to_string());
        Ok(())
    }

    /// 削除完了。成功したときだけ一覧から消す
    pub fn finish_delete(&mut self, outcome: Result<()>) -> Result<()> {
        let id = self.deleting.take();
        outcome?;
        if let Some(id) = id {
            self.resumes.retain(|r| r.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(ids: &[&str]) -> Dashboard {
        let mut d = Dashboard::new();
        d.set_resumes(ids.iter().map(|s| s.to_string()).collect());
        d
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title("abcdef123456"), "Resume abcdef");
        assert_eq!(default_title("ab"), "Resume ab");
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("r1"), "resume_r1.html");
    }

    #[test]
    fn test_empty_query_shows_all() {
        let d = dashboard(&["aaa111", "bbb222"]);
        assert_eq!(d.visible().len(), 2);
    }

    #[test]
    fn test_query_case_insensitive() {
        let mut d = dashboard(&["ABC123", "def456"]);
        d.set_query("abc");
        let visible = d.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "ABC123");

        d.set_query("RESUME");
        assert_eq!(d.visible().len(), 2);
    }

    #[test]
    fn test_query_without_match() {
        // 既定タイトルには "engineer" が含まれない
        let mut d = dashboard(&["r1aaaa", "r2bbbb"]);
        d.set_query("engineer");
        assert!(d.visible().is_empty());
    }

    #[test]
    fn test_query_matches_titles() {
        let mut d = Dashboard::new();
        d.begin_loading();
        d.set_summaries(vec![
            ResumeSummary { id: "r1".into(), title: "Senior Engineer".into() },
            ResumeSummary { id: "r2".into(), title: "ENGINEER cv".into() },
            ResumeSummary { id: "r3".into(), title: "Designer".into() },
        ]);
        assert!(!d.is_loading());

        d.set_query("engineer");
        let ids: Vec<&str> = d.visible().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        let mut d = dashboard(&["abc123"]);
        d.set_query("abc ");
        assert!(d.visible().is_empty());

        d.set_query("resume abc");
        assert_eq!(d.visible().len(), 1);
    }

    #[test]
    fn test_delete_success_removes() {
        let mut d = dashboard(&["x", "y"]);
        d.begin_delete("x").unwrap();
        assert!(d.is_deleting("x"));
        d.finish_delete(Ok(())).unwrap();
        assert_eq!(d.resumes().len(), 1);
        assert_eq!(d.resumes()[0].id, "y");
        assert!(!d.is_deleting("x"));
    }

    #[test]
    fn test_delete_failure_keeps() {
        let mut d = dashboard(&["x"]);
        d.begin_delete("x").unwrap();
        let err = d
            .finish_delete(Err(Error::Http { status: 500, message: "boom".into() }))
            .unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
        assert_eq!(d.resumes().len(), 1);
        assert!(!d.is_deleting("x"));
    }

    #[test]
    fn test_delete_busy() {
        let mut d = dashboard(&["x", "y"]);
        d.begin_delete("x").unwrap();
        assert!(matches!(d.begin_delete("y"), Err(Error::Busy(_))));
    }

    #[test]
    fn test_loading_flags() {
        let mut d = Dashboard::new();
        d.begin_loading();
        assert!(d.is_loading());
        let _ = d.fail_loading(Error::Transport("x".into()));
        assert!(!d.is_loading());
    }
}
