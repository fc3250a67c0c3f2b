//! 作成ページ
//!
//! 共有状態（選択中ID・AIコンテンツ・LaTeX）を所有するのはこのコンポーネントだけ。
//! 入力パネル・出力パネルには読み取り専用で渡し、変更は `on_update` で受け取る。

use crate::components::input_panel::InputPanel;
use crate::components::output_panel::OutputPanel;
use crate::preview::ObjectUrls;
use leptos::prelude::*;
use resume_ai_common::{InputWorkspace, OutputWorkspace, PreviewStore, SharedState, SharedUpdate};

#[component]
pub fn CreatePage(preselect: Option<String>) -> impl IntoView {
    let shared = RwSignal::new(SharedState::new());
    let input = RwSignal::new(InputWorkspace::<String>::new());
    let output = RwSignal::new(OutputWorkspace::new());

    let on_update = Callback::new(move |updates: Vec<SharedUpdate>| {
        for update in updates {
            // 別のレジュメを選び直した後に届いた応答では表示を切り替えない
            if let SharedUpdate::AiContent(content) = &update {
                if shared.with_untracked(|s| s.selected() == Some(content.resume_id.as_str())) {
                    input.update(|ws| ws.on_ai_content());
                }
            }
            shared.update(|state| {
                state.apply(update);
            });
        }
    });

    // ページを離れたらObject URLをすべて解放
    on_cleanup(move || {
        if let Some(handles) = input.try_update(|ws| ws.teardown()) {
            ObjectUrls.release_all(handles);
        }
    });

    view! {
        <section class="create-page">
            <div class="create-header">
                <h1>"Create Resume"</h1>
                <p class="text-muted">"Upload a resume, then ask AI to refine it"</p>
            </div>
            <div class="create-grid">
                <InputPanel
                    shared=shared.read_only()
                    input=input
                    on_update=on_update
                    preselect=preselect
                />
                <OutputPanel shared=shared.read_only() output=output on_update=on_update />
            </div>
        </section>
    }
}
