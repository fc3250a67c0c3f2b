//! 作成ページ: 共有状態と入力・出力パネルの組み立て
//!
//! 共有状態を所有するのはこの構造体だけ。パネルからの `SharedUpdate` は
//! `apply` で一括適用する。非同期フローはCLIと結合テストから使う
//! （ブラウザ版は同じ状態遷移をシグナル経由で駆動する）。

use crate::api::ResumeApi;
use crate::chat::OutputWorkspace;
use crate::error::{Error, Result};
use crate::shared::{LatexSource, SharedState, SharedUpdate};
use crate::upload::UploadFile;
use crate::workspace::{fetch_selection, probe_ai_counterpart, InputWorkspace, PreviewStore, RedefinedPlan};

pub struct CreatePage<P: PreviewStore> {
    shared: SharedState,
    input: InputWorkspace<P::Handle>,
    output: OutputWorkspace,
    previews: P,
}

impl<P: PreviewStore> CreatePage<P> {
    pub fn new(previews: P) -> Self {
        Self {
            shared: SharedState::new(),
            input: InputWorkspace::new(),
            output: OutputWorkspace::new(),
            previews,
        }
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn input(&self) -> &InputWorkspace<P::Handle> {
        &self.input
    }

    pub fn output(&self) -> &OutputWorkspace {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputWorkspace {
        &mut self.output
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// 変更要求を適用。選択が変わった場合はtrue
    pub fn apply(&mut self, updates: Vec<SharedUpdate>) -> bool {
        let mut selection_changed = false;
        for update in updates {
            // 別のレジュメを選び直した後に届いた応答では表示を切り替えない
            if let SharedUpdate::AiContent(content) = &update {
                if self.shared.selected() == Some(content.resume_id.as_str()) {
                    self.input.on_ai_content();
                }
            }
            selection_changed |= self.shared.apply(update);
        }
        selection_changed
    }

    /// 一覧を再取得
    pub async fn refresh<A: ResumeApi>(&mut self, api: &A, email: &str) -> Result<()> {
        self.input.begin_listing();
        match api.list_resumes(email).await {
            Ok(ids) => {
                self.input.set_catalog(ids);
                Ok(())
            }
            Err(error) => Err(self.input.fail_listing(error)),
        }
    }

    /// アップロードして、成功したら一覧を更新し新IDを選択する
    pub async fn upload<A: ResumeApi>(&mut self, api: &A, email: &str, file: UploadFile) -> Result<String> {
        let ticket = self.input.begin_upload(&file.file_name)?;
        let resume_id = ticket.resume_id.clone();
        let outcome = api.upload_resume(&resume_id, &file, email).await;
        let select = self.input.finish_upload(ticket, outcome)?;

        if let Err(error) = self.refresh(api, email).await {
            tracing::warn!(%error, "catalog refresh after upload failed");
        }
        self.apply(vec![select]);
        self.select(api, email, &resume_id).await?;
        Ok(resume_id)
    }

    /// レジュメを選択してプレビューを取得
    pub async fn select<A: ResumeApi>(&mut self, api: &A, email: &str, resume_id: &str) -> Result<()> {
        self.apply(vec![SharedUpdate::Select(resume_id.to_string())]);
        let ticket = self.input.begin_select(resume_id);

        match fetch_selection(api, email, resume_id).await {
            Ok(fetched) => {
                let original = self.previews.create(fetched.original);
                let ai = fetched.ai.map(|content| self.previews.create(content));
                let released = self.input.commit_selection(&ticket, original, ai).into_released();
                self.previews.release_all(released);
                Ok(())
            }
            Err(error) => match self.input.fail_selection(&ticket, error) {
                Some(error) => Err(error),
                None => Ok(()),
            },
        }
    }

    /// 「AIリデファイン」タブを開く
    pub async fn open_redefined<A: ResumeApi>(&mut self, api: &A, email: &str) -> Result<RedefinedPlan> {
        let plan = self.input.show_redefined(&self.shared);
        if let RedefinedPlan::Fetch(ticket) = &plan {
            let fetched = match probe_ai_counterpart(api, email, &ticket.resume_id).await {
                Ok(content) => content,
                Err(error) => {
                    return match self.input.fail_selection(ticket, error) {
                        Some(error) => Err(error),
                        None => Ok(plan),
                    }
                }
            };
            let handle = fetched.map(|content| self.previews.create(content));
            let released = self.input.commit_redefined(ticket, handle).into_released();
            self.previews.release_all(released);
        }
        Ok(plan)
    }

    pub fn show_original(&mut self) {
        self.input.show_original();
    }

    /// AIへ指示を送信
    pub async fn send_prompt<A: ResumeApi>(&mut self, api: &A, email: &str, text: &str) -> Result<()> {
        let request = self.output.begin_send(text, &self.shared, email)?;
        match api.generate(&request).await {
            Ok(response) => {
                let updates = self.output.complete(response, &self.shared);
                self.apply(updates);
                Ok(())
            }
            Err(error) => Err(self.output.fail(error)),
        }
    }

    /// LaTeXをサーバーから取得して共有状態に載せる
    pub async fn load_latex<A: ResumeApi>(&mut self, api: &A, email: &str) -> Result<()> {
        let resume_id = self
            .shared
            .selected()
            .ok_or(Error::NoResumeSelected)?
            .to_string();
        let source = api.fetch_latex(&resume_id, email).await?;
        self.apply(vec![SharedUpdate::Latex(LatexSource { resume_id, source })]);
        self.output.show_latex();
        Ok(())
    }

    /// 削除（成功後にのみ一覧から消える）
    pub async fn delete<A: ResumeApi>(&mut self, api: &A, email: &str, resume_id: &str) -> Result<()> {
        let ticket = self.input.begin_delete(resume_id)?;
        let outcome = api.delete_resume(resume_id, email).await;
        let (update, released) = self.input.finish_delete(ticket, outcome, &self.shared)?;
        self.previews.release_all(released);
        if let Some(update) = update {
            self.apply(vec![update]);
        }
        Ok(())
    }

    /// ページ破棄: すべてのプレビューを解放
    pub fn teardown(&mut self) {
        let handles = self.input.teardown();
        self.previews.release_all(handles);
    }
}

impl<P: PreviewStore> Drop for CreatePage<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! テスト用のフェイクAPIとプレビューストア

    use crate::api::{GenerateRequest, GenerateResponse, ResumeApi, ResumeContent};
    use crate::error::{Error, Result};
    use crate::upload::UploadFile;
    use crate::workspace::PreviewStore;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashSet};

    /// メモリ上のバックエンド
    #[derive(Default)]
    pub struct FakeApi {
        pub documents: RefCell<BTreeMap<String, String>>,
        pub users: RefCell<HashSet<String>>,
        pub generate_result: RefCell<Option<Result<GenerateResponse>>>,
        pub offline: RefCell<bool>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeApi {
        pub fn with_documents(docs: &[(&str, &str)]) -> Self {
            let api = Self::default();
            for (id, html) in docs {
                api.documents.borrow_mut().insert(id.to_string(), html.to_string());
            }
            api
        }

        fn check(&self, call: String) -> Result<()> {
            self.calls.borrow_mut().push(call);
            if *self.offline.borrow() {
                return Err(Error::Transport("offline".into()));
            }
            Ok(())
        }
    }

    impl ResumeApi for FakeApi {
        async fn register_user(&self, email: &str) -> Result<()> {
            self.check(format!("register {}", email))?;
            self.users.borrow_mut().insert(email.to_string());
            Ok(())
        }

        async fn list_resumes(&self, email: &str) -> Result<Vec<String>> {
            self.check(format!("list {}", email))?;
            Ok(self.documents.borrow().keys().cloned().collect())
        }

        async fn fetch_resume(&self, resume_id: &str, _email: &str) -> Result<ResumeContent> {
            self.check(format!("fetch {}", resume_id))?;
            self.documents
                .borrow()
                .get(resume_id)
                .map(|html| ResumeContent::html(html.clone()))
                .ok_or_else(|| Error::NotFound(resume_id.to_string()))
        }

        async fn fetch_latex(&self, resume_id: &str, _email: &str) -> Result<String> {
            self.check(format!("latex {}", resume_id))?;
            Ok(format!("\\section{{{}}}", resume_id))
        }

        async fn upload_resume(&self, resume_id: &str, file: &UploadFile, _email: &str) -> Result<()> {
            self.check(format!("upload {}", resume_id))?;
            let text = String::from_utf8_lossy(&file.bytes).to_string();
            self.documents.borrow_mut().insert(resume_id.to_string(), text);
            Ok(())
        }

        async fn delete_resume(&self, resume_id: &str, _email: &str) -> Result<()> {
            self.check(format!("delete {}", resume_id))?;
            self.documents.borrow_mut().remove(resume_id);
            Ok(())
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
            self.check(format!("generate {}", request.resume_id))?;
            self.generate_result
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok(GenerateResponse::default()))
        }
    }

    /// 生成・解放を数えるプレビューストア
    #[derive(Default)]
    pub struct CountingPreviews {
        next: u32,
        pub live: Vec<u32>,
        pub released: Vec<u32>,
    }

    impl PreviewStore for CountingPreviews {
        type Handle = u32;

        fn create(&mut self, _content: ResumeContent) -> u32 {
            self.next += 1;
            self.live.push(self.next);
            self.next
        }

        fn release(&mut self, handle: u32) {
            assert!(!self.released.contains(&handle), "二重解放: {}", handle);
            self.live.retain(|h| *h != handle);
            self.released.push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{CountingPreviews, FakeApi};
    use super::*;
    use crate::api::GenerateResponse;
    use crate::chat::{OutputView, APOLOGY_MESSAGE};
    use crate::workspace::{SubView, WorkspaceView};
    use futures::executor::block_on;

    const EMAIL: &str = "a@b.com";

    fn page() -> CreatePage<CountingPreviews> {
        CreatePage::new(CountingPreviews::default())
    }

    // ========================================
    // 一覧・選択
    // ========================================

    #[test]
    fn test_refresh_hides_ai_ids() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>"), ("r1_ai", "<p>ai</p>")]);
        let mut page = page();
        block_on(page.refresh(&api, EMAIL)).unwrap();
        assert_eq!(page.input().catalog(), ["r1".to_string()]);
    }

    #[test]
    fn test_select_without_ai_version() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>")]);
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();

        assert_eq!(page.shared().selected(), Some("r1"));
        assert!(!page.input().ai_tab_enabled(page.shared()));
        assert!(matches!(page.input().view(page.shared()), WorkspaceView::Original(_)));
        assert_eq!(page.previews().live.len(), 1);
    }

    #[test]
    fn test_select_with_ai_version() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>"), ("r1_ai", "<p>ai</p>")]);
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        assert!(page.input().ai_tab_enabled(page.shared()));

        let plan = block_on(page.open_redefined(&api, EMAIL)).unwrap();
        assert_eq!(plan, RedefinedPlan::Loaded);
        assert!(matches!(page.input().view(page.shared()), WorkspaceView::RedefinedLoaded(_)));
    }

    #[test]
    fn test_select_missing_original_is_error() {
        let api = FakeApi::default();
        let mut page = page();
        let err = block_on(page.select(&api, EMAIL, "ghost")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!page.input().is_loading_preview());
        assert_eq!(page.input().view(page.shared()), WorkspaceView::PreviewFailed);
    }

    #[test]
    fn test_select_offline_shows_failure() {
        let api = FakeApi::with_documents(&[("a", "A")]);
        let mut page = page();
        block_on(page.refresh(&api, EMAIL)).unwrap();
        *api.offline.borrow_mut() = true;

        let err = block_on(page.select(&api, EMAIL, "a")).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(page.input().view(page.shared()), WorkspaceView::PreviewFailed);

        *api.offline.borrow_mut() = false;
        block_on(page.select(&api, EMAIL, "a")).unwrap();
        assert!(matches!(page.input().view(page.shared()), WorkspaceView::Original(_)));
    }

    #[test]
    fn test_reselect_releases_handles_once() {
        let api = FakeApi::with_documents(&[("a", "A"), ("a_ai", "AI"), ("b", "B")]);
        let mut page = page();
        block_on(page.select(&api, EMAIL, "a")).unwrap();
        block_on(page.select(&api, EMAIL, "b")).unwrap();
        block_on(page.select(&api, EMAIL, "a")).unwrap();
        assert_eq!(page.previews().live.len(), 2);
        assert_eq!(page.previews().released.len(), 3);

        page.teardown();
        assert!(page.previews().live.is_empty());
        assert_eq!(page.previews().released.len(), 5);
    }

    // ========================================
    // アップロード
    // ========================================

    #[test]
    fn test_upload_selects_new_resume() {
        let api = FakeApi::default();
        let mut page = page();
        let file = UploadFile::new("cv.html", b"<p>cv</p>".to_vec()).unwrap();
        let id = block_on(page.upload(&api, EMAIL, file)).unwrap();

        assert_eq!(page.shared().selected(), Some(id.as_str()));
        assert_eq!(page.input().catalog(), [id.clone()]);
        assert!(!page.input().is_uploading());
        assert!(api.calls.borrow().contains(&format!("upload {}", id)));
    }

    #[test]
    fn test_upload_failure_reenables() {
        let api = FakeApi::default();
        *api.offline.borrow_mut() = true;
        let mut page = page();
        let file = UploadFile::new("cv.pdf", vec![1, 2, 3]).unwrap();
        let err = block_on(page.upload(&api, EMAIL, file)).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!page.input().is_uploading());
        assert!(page.shared().selected().is_none());
    }

    // ========================================
    // AIチャット
    // ========================================

    #[test]
    fn test_prompt_updates_redefined_view() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>")]);
        *api.generate_result.borrow_mut() = Some(Ok(GenerateResponse {
            updated_content: Some("<html>new</html>".into()),
            message: Some("Done".into()),
            ..Default::default()
        }));
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        block_on(page.send_prompt(&api, EMAIL, "make it concise")).unwrap();

        assert_eq!(page.input().sub_view(), SubView::Redefined);
        assert!(page.input().ai_tab_enabled(page.shared()));
        assert_eq!(
            page.input().view(page.shared()),
            WorkspaceView::RedefinedSession("<html>new</html>")
        );
        let texts: Vec<_> = page.output().transcript().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["make it concise", "Done"]);
    }

    #[test]
    fn test_prompt_latex_switches_output() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>")]);
        *api.generate_result.borrow_mut() = Some(Ok(GenerateResponse {
            latex_code: Some("\\documentclass{article}".into()),
            ..Default::default()
        }));
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        block_on(page.send_prompt(&api, EMAIL, "as latex")).unwrap();
        assert_eq!(page.output().view(), OutputView::Latex);
        assert_eq!(page.shared().latex().unwrap().source, "\\documentclass{article}");
    }

    #[test]
    fn test_late_response_keeps_new_selection_view() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>"), ("r2", "<p>2</p>")]);
        *api.generate_result.borrow_mut() = Some(Ok(GenerateResponse {
            updated_content: Some("<html>r1 new</html>".into()),
            latex_code: Some("\\section{r1}".into()),
            ..Default::default()
        }));
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        let shared = page.shared().clone();
        let request = page.output_mut().begin_send("make it concise", &shared, EMAIL).unwrap();

        // 応答が届く前に r2 を選択
        block_on(page.select(&api, EMAIL, "r2")).unwrap();
        let response = block_on(api.generate(&request)).unwrap();
        let shared = page.shared().clone();
        let updates = page.output_mut().complete(response, &shared);
        page.apply(updates);

        assert_eq!(page.shared().selected(), Some("r2"));
        assert_eq!(page.input().sub_view(), SubView::Original);
        assert!(matches!(page.input().view(page.shared()), WorkspaceView::Original(_)));
        assert_eq!(page.output().view(), OutputView::Chat);
        assert!(page.shared().latex().is_none());

        // r1 に戻ればそのAI版が見える
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        assert!(page.input().ai_tab_enabled(page.shared()));
        assert_eq!(page.shared().latex().unwrap().source, "\\section{r1}");
    }

    #[test]
    fn test_prompt_failure_appends_apology() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>")]);
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        *api.offline.borrow_mut() = true;

        let err = block_on(page.send_prompt(&api, EMAIL, "make it concise")).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        let turns = page.output().transcript();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text, APOLOGY_MESSAGE);
        assert!(!page.output().is_sending());
    }

    #[test]
    fn test_prompt_without_selection_sends_nothing() {
        let api = FakeApi::default();
        let mut page = page();
        let err = block_on(page.send_prompt(&api, EMAIL, "hello")).unwrap_err();
        assert!(matches!(err, Error::NoResumeSelected));
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn test_load_latex() {
        let api = FakeApi::with_documents(&[("r1", "<p>1</p>")]);
        let mut page = page();
        block_on(page.select(&api, EMAIL, "r1")).unwrap();
        block_on(page.load_latex(&api, EMAIL)).unwrap();
        assert_eq!(page.shared().latex().unwrap().source, "\\section{r1}");
        assert_eq!(page.output().view(), OutputView::Latex);
    }

    // ========================================
    // 削除
    // ========================================

    #[test]
    fn test_delete_selected_clears_everything() {
        let api = FakeApi::with_documents(&[("x", "X"), ("x_ai", "XA"), ("y", "Y")]);
        let mut page = page();
        block_on(page.refresh(&api, EMAIL)).unwrap();
        block_on(page.select(&api, EMAIL, "x")).unwrap();
        block_on(page.delete(&api, EMAIL, "x")).unwrap();

        assert!(page.shared().selected().is_none());
        assert_eq!(page.input().catalog(), ["y".to_string()]);
        assert!(page.previews().live.is_empty());
        assert_eq!(page.input().view(page.shared()), WorkspaceView::NothingSelected);
    }

    #[test]
    fn test_delete_failure_keeps_entry() {
        let api = FakeApi::with_documents(&[("x", "X")]);
        let mut page = page();
        block_on(page.refresh(&api, EMAIL)).unwrap();
        *api.offline.borrow_mut() = true;
        assert!(block_on(page.delete(&api, EMAIL, "x")).is_err());
        assert_eq!(page.input().catalog(), ["x".to_string()]);
    }
}
