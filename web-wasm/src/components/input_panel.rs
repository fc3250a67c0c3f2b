//! 入力パネル: アップロード・一覧・プレビュー / ゼロから作成
//!
//! 状態遷移は `InputWorkspace` に任せ、ここでは通信とObject URLの後始末だけを行う。
//! 非同期処理の結果はすべて `try_update` でコミットし、ページ破棄後に届いたものは
//! 作ったObject URLをその場で解放して捨てる。

use crate::api::BrowserApi;
use crate::components::resume_form::ResumeForm;
use crate::identity::Identity;
use crate::preview::ObjectUrls;
use crate::toast::Toasts;
use js_sys::Uint8Array;
use leptos::prelude::*;
use leptos::task::spawn_local;
use resume_ai_common::dashboard::default_title;
use resume_ai_common::upload::ALLOWED_EXTENSIONS;
use resume_ai_common::workspace::{fetch_selection, probe_ai_counterpart, SelectTicket};
use resume_ai_common::{
    Commit, Error, InputWorkspace, PreviewStore, RedefinedPlan, ResumeApi, Result, SharedState, SharedUpdate,
    SubView, UploadFile, WorkspaceView,
};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTab {
    Upload,
    Scratch,
}

async fn read_bytes(file: &File) -> Result<Vec<u8>> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| Error::Transport(format!("failed to read {}: {:?}", file.name(), e)))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// パネルの操作に必要なハンドル一式
#[derive(Clone, Copy)]
struct Panel {
    api: StoredValue<BrowserApi>,
    shared: ReadSignal<SharedState>,
    input: RwSignal<InputWorkspace<String>>,
    on_update: Callback<Vec<SharedUpdate>>,
    identity: Identity,
    toasts: Toasts,
}

impl Panel {
    fn email(&self) -> Option<String> {
        match self.identity.require() {
            Ok(email) => Some(email),
            Err(error) => {
                self.toasts.report(&error);
                None
            }
        }
    }

    fn alive(&self) -> bool {
        self.input.try_with_untracked(|_| ()).is_some()
    }

    /// ページ破棄後に届いた結果は捨てる
    fn emit(&self, updates: Vec<SharedUpdate>) {
        if self.alive() {
            self.on_update.run(updates);
        }
    }

    /// コミットして、差し替えられたObject URLを解放する
    fn commit_previews(
        &self,
        created: Vec<String>,
        commit: impl FnOnce(&mut InputWorkspace<String>) -> Commit<String>,
    ) {
        let released = self
            .input
            .try_update(commit)
            .map(Commit::into_released)
            .unwrap_or(created);
        ObjectUrls.release_all(released);
    }

    fn fail_selection(&self, ticket: &SelectTicket, error: Error) {
        if let Some(Some(error)) = self.input.try_update(|ws| ws.fail_selection(ticket, error)) {
            self.toasts.report(&error);
        }
    }

    async fn refresh(self, email: &str) {
        self.input.update(|ws| ws.begin_listing());
        let result = self.api.get_value().list_resumes(email).await;
        match result {
            Ok(ids) => self.input.update(|ws| ws.set_catalog(ids)),
            Err(error) => {
                if let Some(error) = self.input.try_update(|ws| ws.fail_listing(error)) {
                    self.toasts.report(&error);
                }
            }
        }
    }

    fn select(self, resume_id: String) {
        if self.alive() {
            self.emit(vec![SharedUpdate::Select(resume_id.clone())]);
            self.load_preview(resume_id);
        }
    }

    /// 元文書とAI版を取得してプレビューを差し替える
    fn load_preview(self, resume_id: String) {
        let Some(email) = self.email() else { return };
        let Some(ticket) = self.input.try_update(|ws| ws.begin_select(&resume_id)) else {
            return;
        };
        let api = self.api.get_value();
        spawn_local(async move {
            match fetch_selection(&api, &email, &resume_id).await {
                Ok(fetched) => {
                    let original = ObjectUrls.create(fetched.original);
                    let ai = fetched.ai.map(|content| ObjectUrls.create(content));
                    let created = std::iter::once(original.clone()).chain(ai.clone()).collect();
                    self.commit_previews(created, |ws| ws.commit_selection(&ticket, original, ai));
                }
                Err(error) => self.fail_selection(&ticket, error),
            }
        });
    }

    fn upload(self, file: File) {
        let Some(email) = self.email() else { return };
        let file_name = file.name();
        let ticket = match self.input.try_update(|ws| ws.begin_upload(&file_name)) {
            Some(Ok(ticket)) => ticket,
            Some(Err(error)) => return self.toasts.report(&error),
            None => return,
        };
        let api = self.api.get_value();
        spawn_local(async move {
            let outcome = match read_bytes(&file).await.and_then(|bytes| UploadFile::new(file_name, bytes)) {
                Ok(upload) => api.upload_resume(&ticket.resume_id, &upload, &email).await,
                Err(error) => Err(error),
            };
            let resume_id = ticket.resume_id.clone();
            match self.input.try_update(|ws| ws.finish_upload(ticket, outcome)) {
                Some(Ok(select)) => {
                    self.toasts.success("Resume uploaded successfully!");
                    self.emit(vec![select]);
                    self.refresh(&email).await;
                    self.load_preview(resume_id);
                }
                Some(Err(error)) => self.toasts.report(&error),
                None => {}
            }
        });
    }

    fn open_redefined(self) {
        let Some(email) = self.email() else { return };
        let plan = self
            .shared
            .with_untracked(|shared| self.input.try_update(|ws| ws.show_redefined(shared)));
        let Some(RedefinedPlan::Fetch(ticket)) = plan else { return };
        let api = self.api.get_value();
        spawn_local(async move {
            match probe_ai_counterpart(&api, &email, &ticket.resume_id).await {
                Ok(content) => {
                    let handle = content.map(|content| ObjectUrls.create(content));
                    self.commit_previews(handle.iter().cloned().collect(), |ws| {
                        ws.commit_redefined(&ticket, handle)
                    });
                }
                Err(error) => self.fail_selection(&ticket, error),
            }
        });
    }

    fn delete(self, resume_id: String) {
        if !gloo::dialogs::confirm("Are you sure you want to delete this resume?") {
            return;
        }
        let Some(email) = self.email() else { return };
        let ticket = match self.input.try_update(|ws| ws.begin_delete(&resume_id)) {
            Some(Ok(ticket)) => ticket,
            Some(Err(error)) => return self.toasts.report(&error),
            None => return,
        };
        let api = self.api.get_value();
        spawn_local(async move {
            let outcome = api.delete_resume(&resume_id, &email).await;
            let finished = self
                .shared
                .try_with_untracked(|shared| self.input.try_update(|ws| ws.finish_delete(ticket, outcome, shared)))
                .flatten();
            match finished {
                Some(Ok((update, released))) => {
                    ObjectUrls.release_all(released);
                    self.emit(update.into_iter().collect());
                    self.toasts.success("Resume deleted successfully");
                }
                Some(Err(error)) => self.toasts.report(&error),
                None => {}
            }
        });
    }
}

#[component]
pub fn InputPanel(
    shared: ReadSignal<SharedState>,
    input: RwSignal<InputWorkspace<String>>,
    on_update: Callback<Vec<SharedUpdate>>,
    preselect: Option<String>,
) -> impl IntoView {
    let panel = Panel {
        api: StoredValue::new(expect_context::<BrowserApi>()),
        shared,
        input,
        on_update,
        identity: Identity::use_context(),
        toasts: Toasts::use_context(),
    };
    let (tab, set_tab) = signal(InputTab::Upload);

    // 一覧を取得し、ダッシュボードから来た場合はそのレジュメを選択
    if let Some(email) = panel.email() {
        spawn_local(async move {
            panel.refresh(&email).await;
            if let Some(resume_id) = preselect {
                panel.select(resume_id);
            }
        });
    }

    let on_file_change = move |ev: leptos::ev::Event| {
        let element: HtmlInputElement = event_target(&ev);
        if let Some(file) = element.files().and_then(|files| files.get(0)) {
            panel.upload(file);
        }
        // 同じファイルを選び直せるように
        element.set_value("");
    };

    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");
    let ai_enabled = move || shared.with(|s| input.with(|ws| ws.ai_tab_enabled(s)));
    let sub_view = move || input.with(|ws| ws.sub_view());

    view! {
        <div class="panel input-panel">
            <div class="tabs">
                <button
                    class="tab"
                    class:active=move || tab.get() == InputTab::Upload
                    on:click=move |_| set_tab.set(InputTab::Upload)
                >
                    "Upload Resume"
                </button>
                <button
                    class="tab"
                    class:active=move || tab.get() == InputTab::Scratch
                    on:click=move |_| set_tab.set(InputTab::Scratch)
                >
                    "Create from Scratch"
                </button>
            </div>

            <Show when=move || tab.get() == InputTab::Upload fallback=|| view! { <ResumeForm /> }>
                <div class="upload-bar">
                    <label class="btn btn-primary" class:disabled=move || input.with(|ws| ws.is_uploading())>
                        {move || if input.with(|ws| ws.is_uploading()) { "Uploading..." } else { "Upload Resume" }}
                        <input
                            type="file"
                            class="hidden"
                            accept=accept.clone()
                            disabled=move || input.with(|ws| ws.is_uploading())
                            on:change=on_file_change
                        />
                    </label>
                    <span class="text-muted">"Supported formats: HTML, PDF, DOCX"</span>
                </div>

                <Show when=move || input.with(|ws| ws.is_listing())>
                    <div class="spinner">"Loading resumes..."</div>
                </Show>
                <ul class="resume-list">
                    <For
                        each=move || input.with(|ws| ws.catalog().to_vec())
                        key=|id| id.clone()
                        children=move |id| {
                            let id = StoredValue::new(id);
                            let selected = move || shared.with(|s| s.selected() == Some(id.get_value().as_str()));
                            let deleting = move || input.with(|ws| ws.is_deleting(&id.get_value()));
                            view! {
                                <li class="resume-item" class:selected=selected>
                                    <button class="resume-item-title" on:click=move |_| panel.select(id.get_value())>
                                        {default_title(&id.get_value())}
                                    </button>
                                    <button
                                        class="btn btn-small btn-danger"
                                        disabled=deleting
                                        on:click=move |ev| {
                                            ev.stop_propagation();
                                            panel.delete(id.get_value());
                                        }
                                    >
                                        {move || if deleting() { "Deleting..." } else { "Delete" }}
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>

                <div class="sub-tabs">
                    <button
                        class="tab"
                        class:active=move || sub_view() == SubView::Original
                        on:click=move |_| input.update(|ws| ws.show_original())
                    >
                        "Original"
                    </button>
                    <button
                        class="tab"
                        class:active=move || sub_view() == SubView::Redefined
                        disabled=move || !ai_enabled()
                        on:click=move |_| panel.open_redefined()
                    >
                        "AI Redefined"
                    </button>
                </div>

                <div class="preview">
                    {move || shared.with(|s| input.with(|ws| match ws.view(s) {
                        WorkspaceView::UploadPrompt => view! {
                            <div class="empty-state">
                                <div class="empty-icon">"📤"</div>
                                <h3>"No resumes uploaded yet"</h3>
                                <p class="text-muted">"Upload an HTML, PDF or DOCX resume to get started."</p>
                            </div>
                        }
                        .into_any(),
                        WorkspaceView::NothingSelected => view! {
                            <div class="empty-state">
                                <p class="text-muted">"Select a resume to preview it."</p>
                            </div>
                        }
                        .into_any(),
                        WorkspaceView::Loading => view! { <div class="spinner">"Loading preview..."</div> }.into_any(),
                        WorkspaceView::PreviewFailed => {
                            let retry = s.selected().map(str::to_string);
                            view! {
                                <div class="empty-state">
                                    <div class="empty-icon">"⚠"</div>
                                    <h3>"Could not load this resume"</h3>
                                    <button
                                        class="btn btn-secondary"
                                        on:click=move |_| {
                                            if let Some(resume_id) = retry.clone() {
                                                panel.load_preview(resume_id);
                                            }
                                        }
                                    >
                                        "Try again"
                                    </button>
                                </div>
                            }
                            .into_any()
                        }
                        WorkspaceView::Original(url) | WorkspaceView::RedefinedLoaded(url) => view! {
                            <iframe class="preview-frame" src=url.clone() title="Resume preview"></iframe>
                        }
                        .into_any(),
                        WorkspaceView::RedefinedSession(html) => view! {
                            <iframe class="preview-frame" srcdoc=html.to_string() title="AI redefined resume"></iframe>
                        }
                        .into_any(),
                        WorkspaceView::RedefinedEmpty => view! {
                            <div class="empty-state">
                                <div class="empty-icon">"🤖"</div>
                                <h3>"No AI version yet"</h3>
                                <p class="text-muted">"Ask the AI assistant to refine this resume."</p>
                            </div>
                        }
                        .into_any(),
                    }))}
                </div>
            </Show>
        </div>
    }
}
