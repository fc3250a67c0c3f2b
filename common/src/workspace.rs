//! 入力パネル（アップロード済みレジュメの一覧とプレビュー）の状態
//!
//! 非同期処理は「開始（チケット発行）→ 取得 → コミット」に分ける。
//! 選択のたびに世代番号を進め、古い世代のレスポンスはコミット時に捨てる。
//! プレビューのハンドル（ブラウザではObject URL）は置き換え・破棄のたびに
//! 呼び出し側へ返し、必ず解放させる。

use crate::api::{ResumeApi, ResumeContent};
use crate::error::{Error, Result};
use crate::ids::{is_ai_id, new_resume_id, related_ai_id};
use crate::shared::{SharedState, SharedUpdate};
use crate::upload::validate_upload;

/// プレビューハンドルの生成と解放
pub trait PreviewStore {
    type Handle;

    fn create(&mut self, content: ResumeContent) -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);

    fn release_all(&mut self, handles: Vec<Self::Handle>) {
        for handle in handles {
            self.release(handle);
        }
    }
}

/// 表示中のサブビュー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubView {
    #[default]
    Original,
    Redefined,
}

/// 選択チケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectTicket {
    pub resume_id: String,
    generation: u64,
}

/// アップロードチケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub resume_id: String,
    pub file_name: String,
}

/// 削除チケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    pub resume_id: String,
}

/// コミット結果
#[derive(Debug, PartialEq)]
pub enum Commit<H> {
    /// 反映済み。置き換えられた古いハンドルを解放すること
    Applied { released: Vec<H> },
    /// 古い選択へのレスポンス。渡したハンドルを解放すること
    Stale(Vec<H>),
}

impl<H> Commit<H> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Commit::Applied { .. })
    }

    /// 解放すべきハンドル
    pub fn into_released(self) -> Vec<H> {
        match self {
            Commit::Applied { released } => released,
            Commit::Stale(handles) => handles,
        }
    }
}

/// 「AIリデファイン」タブを開いたときの処理方針
#[derive(Debug, Clone, PartialEq)]
pub enum RedefinedPlan {
    /// セッション中のAI HTMLをそのまま表示
    Session(String),
    /// 保存済みAI版を取得済み
    Loaded,
    /// 保存済みAI版を取得する
    Fetch(SelectTicket),
    /// 選択なし
    Nothing,
}

/// 選択時に取得した内容
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionFetch {
    pub original: ResumeContent,
    pub ai: Option<ResumeContent>,
}

struct Preview<H> {
    resume_id: String,
    handle: H,
}

/// 描画用のビュー
#[derive(Debug, PartialEq)]
pub enum WorkspaceView<'a, H> {
    /// 一覧が空: アップロードを促す
    UploadPrompt,
    /// 一覧はあるが未選択
    NothingSelected,
    Loading,
    /// 元文書の取得に失敗（再選択で再試行できる）
    PreviewFailed,
    Original(&'a H),
    RedefinedSession(&'a str),
    RedefinedLoaded(&'a H),
    /// AI版なし: 行動を促す空状態（エラーではない）
    RedefinedEmpty,
}

pub struct InputWorkspace<H> {
    catalog: Vec<String>,
    generation: u64,
    original: Option<Preview<H>>,
    redefined: Option<Preview<H>>,
    ai_available: bool,
    sub_view: SubView,
    listing: bool,
    uploading: bool,
    loading_preview: bool,
    loading_redefined: bool,
    /// 元文書の取得に失敗したID
    failed: Option<String>,
    deleting: Option<String>,
}

impl<H> Default for InputWorkspace<H> {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            generation: 0,
            original: None,
            redefined: None,
            ai_available: false,
            sub_view: SubView::Original,
            listing: false,
            uploading: false,
            loading_preview: false,
            loading_redefined: false,
            failed: None,
            deleting: None,
        }
    }
}

impl<H> InputWorkspace<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn sub_view(&self) -> SubView {
        self.sub_view
    }

    /// AIリデファイン タブを有効にするか
    pub fn ai_tab_enabled(&self, shared: &SharedState) -> bool {
        self.ai_available || shared.ai_content().is_some()
    }

    pub fn is_listing(&self) -> bool {
        self.listing
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_loading_preview(&self) -> bool {
        self.loading_preview
    }

    pub fn is_deleting(&self, resume_id: &str) -> bool {
        self.deleting.as_deref() == Some(resume_id)
    }

    pub fn original_handle(&self) -> Option<&H> {
        self.original.as_ref().map(|p| &p.handle)
    }

    // --- 一覧 ---

    pub fn begin_listing(&mut self) {
        self.listing = true;
    }

    /// 一覧を設定（AI版IDは派生物なので表示しない）
    pub fn set_catalog(&mut self, ids: Vec<String>) {
        self.listing = false;
        self.catalog = ids.into_iter().filter(|id| !is_ai_id(id)).collect();
    }

    pub fn fail_listing(&mut self, error: Error) -> Error {
        self.listing = false;
        error
    }

    // --- アップロード ---

    /// 拡張子検証と新IDの採番（ここで失敗したら通信しない）
    pub fn begin_upload(&mut self, file_name: &str) -> Result<UploadTicket> {
        validate_upload(file_name)?;
        if self.uploading {
            return Err(Error::Busy("upload"));
        }
        self.uploading = true;
        Ok(UploadTicket {
            resume_id: new_resume_id(),
            file_name: file_name.to_string(),
        })
    }

    /// アップロード完了。成功時は新IDの自動選択を要求する
    pub fn finish_upload(&mut self, ticket: UploadTicket, outcome: Result<()>) -> Result<SharedUpdate> {
        self.uploading = false;
        outcome?;
        tracing::info!(resume_id = %ticket.resume_id, file = %ticket.file_name, "resume uploaded");
        Ok(SharedUpdate::Select(ticket.resume_id))
    }

    // --- 選択 ---

    /// 選択開始。以前の選択に対する取得結果はこれ以降すべて無効
    pub fn begin_select(&mut self, resume_id: &str) -> SelectTicket {
        self.generation += 1;
        self.sub_view = SubView::Original;
        self.ai_available = false;
        self.loading_preview = true;
        self.loading_redefined = false;
        self.failed = None;
        SelectTicket {
            resume_id: resume_id.to_string(),
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &SelectTicket) -> bool {
        ticket.generation == self.generation
    }

    /// 取得結果をコミット
    pub fn commit_selection(&mut self, ticket: &SelectTicket, original: H, ai: Option<H>) -> Commit<H> {
        if !self.is_current(ticket) {
            tracing::debug!(resume_id = %ticket.resume_id, "discarding stale preview");
            let mut stale = vec![original];
            stale.extend(ai);
            return Commit::Stale(stale);
        }

        self.loading_preview = false;
        self.failed = None;
        self.ai_available = ai.is_some();
        let mut released = Vec::new();
        if let Some(old) = self.original.replace(Preview {
            resume_id: ticket.resume_id.clone(),
            handle: original,
        }) {
            released.push(old.handle);
        }
        let new_redefined = ai.map(|handle| Preview {
            resume_id: ticket.resume_id.clone(),
            handle,
        });
        if let Some(old) = std::mem::replace(&mut self.redefined, new_redefined) {
            released.push(old.handle);
        }
        Commit::Applied { released }
    }

    /// 取得失敗。現在の選択に対するものならエラーを返す（古いものは黙って捨てる）
    pub fn fail_selection(&mut self, ticket: &SelectTicket, error: Error) -> Option<Error> {
        if !self.is_current(ticket) {
            return None;
        }
        if self.loading_preview {
            self.failed = Some(ticket.resume_id.clone());
        }
        self.loading_preview = false;
        self.loading_redefined = false;
        Some(error)
    }

    // --- AIリデファイン ---

    pub fn show_original(&mut self) {
        self.sub_view = SubView::Original;
    }

    /// リデファイン表示へ切り替え、必要な処理を返す
    pub fn show_redefined(&mut self, shared: &SharedState) -> RedefinedPlan {
        let Some(selected) = shared.selected() else {
            return RedefinedPlan::Nothing;
        };
        self.sub_view = SubView::Redefined;
        if let Some(content) = shared.ai_content() {
            return RedefinedPlan::Session(content.html.clone());
        }
        if self.redefined.as_ref().is_some_and(|p| p.resume_id == selected) {
            return RedefinedPlan::Loaded;
        }
        self.loading_redefined = true;
        RedefinedPlan::Fetch(SelectTicket {
            resume_id: selected.to_string(),
            generation: self.generation,
        })
    }

    /// 保存済みAI版の取得結果をコミット（Noneなら空状態）
    pub fn commit_redefined(&mut self, ticket: &SelectTicket, handle: Option<H>) -> Commit<H> {
        if !self.is_current(ticket) {
            return Commit::Stale(handle.into_iter().collect());
        }
        self.loading_redefined = false;
        self.ai_available = handle.is_some();
        let new = handle.map(|handle| Preview {
            resume_id: ticket.resume_id.clone(),
            handle,
        });
        let released = std::mem::replace(&mut self.redefined, new)
            .map(|old| vec![old.handle])
            .unwrap_or_default();
        Commit::Applied { released }
    }

    /// 出力パネルからAIコンテンツが届いた
    pub fn on_ai_content(&mut self) {
        self.sub_view = SubView::Redefined;
        self.loading_redefined = false;
    }

    // --- 削除 ---

    pub fn begin_delete(&mut self, resume_id: &str) -> Result<DeleteTicket> {
        if self.deleting.is_some() {
            return Err(Error::Busy("delete"));
        }
        self.deleting = Some(resume_id.to_string());
        Ok(DeleteTicket {
            resume_id: resume_id.to_string(),
        })
    }

    /// 削除完了。選択中だった場合はプレビューを消して選択解除を要求する
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        outcome: Result<()>,
        shared: &SharedState,
    ) -> Result<(Option<SharedUpdate>, Vec<H>)> {
        self.deleting = None;
        outcome?;
        self.catalog.retain(|id| id != &ticket.resume_id);
        if shared.selected() == Some(ticket.resume_id.as_str()) {
            // 進行中の取得も無効にする
            self.generation += 1;
            self.loading_preview = false;
            self.loading_redefined = false;
            self.failed = None;
            self.ai_available = false;
            self.sub_view = SubView::Original;
            Ok((Some(SharedUpdate::ClearSelection), self.take_previews()))
        } else {
            Ok((None, Vec::new()))
        }
    }

    /// 破棄時: 保持しているすべてのハンドルを返す
    pub fn teardown(&mut self) -> Vec<H> {
        self.generation += 1;
        self.take_previews()
    }

    fn take_previews(&mut self) -> Vec<H> {
        self.original
            .take()
            .into_iter()
            .chain(self.redefined.take())
            .map(|p| p.handle)
            .collect()
    }

    /// 描画用ビュー
    pub fn view<'a>(&'a self, shared: &'a SharedState) -> WorkspaceView<'a, H> {
        if self.catalog.is_empty() && shared.selected().is_none() {
            return WorkspaceView::UploadPrompt;
        }
        let Some(selected) = shared.selected() else {
            return WorkspaceView::NothingSelected;
        };
        match self.sub_view {
            SubView::Original => {
                if self.loading_preview {
                    return WorkspaceView::Loading;
                }
                match &self.original {
                    Some(p) if p.resume_id == selected => WorkspaceView::Original(&p.handle),
                    _ if self.failed.as_deref() == Some(selected) => WorkspaceView::PreviewFailed,
                    _ => WorkspaceView::Loading,
                }
            }
            SubView::Redefined => {
                if let Some(content) = shared.ai_content() {
                    return WorkspaceView::RedefinedSession(&content.html);
                }
                if self.loading_redefined {
                    return WorkspaceView::Loading;
                }
                match &self.redefined {
                    Some(p) if p.resume_id == selected => WorkspaceView::RedefinedLoaded(&p.handle),
                    _ => WorkspaceView::RedefinedEmpty,
                }
            }
        }
    }
}

/// 元文書とAI版の有無を取得
///
/// AI版の404は「まだAI編集していない」通常状態。
/// AI版の通信エラーは警告ログのみで、AI版なしとして扱う。
pub async fn fetch_selection<A: ResumeApi>(api: &A, email: &str, resume_id: &str) -> Result<SelectionFetch> {
    let original = api.fetch_resume(resume_id, email).await?;
    let ai = probe_ai_counterpart(api, email, resume_id).await.unwrap_or_else(|error| {
        tracing::warn!(%resume_id, %error, "AI counterpart probe failed");
        None
    });
    Ok(SelectionFetch { original, ai })
}

/// AI版を取得（存在しなければNone）
pub async fn probe_ai_counterpart<A: ResumeApi>(
    api: &A,
    email: &str,
    resume_id: &str,
) -> Result<Option<ResumeContent>> {
    match api.fetch_resume(&related_ai_id(resume_id), email).await {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.is_expected_absence() => Ok(None),
        Err(error) => Err(error),
    }
}
