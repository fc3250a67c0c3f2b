//! 出力パネル: AIチャット / LaTeX表示

use crate::api::BrowserApi;
use crate::identity::Identity;
use crate::preview;
use crate::toast::Toasts;
use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;
use resume_ai_common::{
    ChatRole, ChatTurn, DeliveryStatus, LatexSource, OutputView, OutputWorkspace, ResumeApi, ResumeContent,
    SharedState, SharedUpdate,
};

fn turn_class(turn: &ChatTurn) -> String {
    let role = match turn.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    let status = match turn.status {
        DeliveryStatus::Pending => "pending",
        DeliveryStatus::Confirmed => "confirmed",
        DeliveryStatus::Failed => "failed",
    };
    format!("chat-turn chat-{} status-{}", role, status)
}

fn save(content: &ResumeContent, file_name: &str, toasts: Toasts) {
    match preview::download(content, file_name) {
        Ok(()) => toasts.success(format!("Saved {}", file_name)),
        Err(e) => gloo::console::error!("download failed", e),
    }
}

#[component]
pub fn OutputPanel(
    shared: ReadSignal<SharedState>,
    output: RwSignal<OutputWorkspace>,
    on_update: Callback<Vec<SharedUpdate>>,
) -> impl IntoView {
    let api = StoredValue::new(expect_context::<BrowserApi>());
    let identity = Identity::use_context();
    let toasts = Toasts::use_context();
    let (draft, set_draft) = signal(String::new());
    let (loading_latex, set_loading_latex) = signal(false);

    let send = move || {
        let email = match identity.require() {
            Ok(email) => email,
            Err(error) => return toasts.report(&error),
        };
        let text = draft.get_untracked();
        let request = shared.with_untracked(|s| output.try_update(|o| o.begin_send(&text, s, &email)));
        let request = match request {
            Some(Ok(request)) => request,
            Some(Err(error)) => return toasts.report(&error),
            None => return,
        };
        set_draft.set(String::new());

        let api = api.get_value();
        spawn_local(async move {
            match api.generate(&request).await {
                Ok(response) => {
                    let updates = shared
                        .try_with_untracked(|s| output.try_update(|o| o.complete(response, s)))
                        .flatten();
                    if let Some(updates) = updates {
                        on_update.run(updates);
                    }
                }
                Err(error) => {
                    if let Some(error) = output.try_update(|o| o.fail(error)) {
                        toasts.report(&error);
                    }
                }
            }
        });
    };

    let load_latex = move |_| {
        let email = match identity.require() {
            Ok(email) => email,
            Err(error) => return toasts.report(&error),
        };
        let Some(resume_id) = shared.with_untracked(|s| s.selected().map(str::to_string)) else {
            return toasts.warning("Select a resume first");
        };
        set_loading_latex.set(true);
        let api = api.get_value();
        spawn_local(async move {
            let result = api.fetch_latex(&resume_id, &email).await;
            set_loading_latex.set(false);
            match result {
                Ok(source) => {
                    // 取得中に選択が変わっていたら表示は切り替えない
                    let current = shared.try_with_untracked(|s| s.selected() == Some(resume_id.as_str()));
                    let Some(current) = current else { return };
                    if current {
                        output.try_update(|o| o.show_latex());
                    }
                    on_update.run(vec![SharedUpdate::Latex(LatexSource { resume_id, source })]);
                }
                Err(error) => toasts.report(&error),
            }
        });
    };

    let download_html = move |_| {
        let Some((resume_id, html)) =
            shared.with_untracked(|s| s.ai_content().map(|c| (c.resume_id.clone(), c.html.clone())))
        else {
            return;
        };
        save(&ResumeContent::html(html), &format!("resume_{}_ai.html", resume_id), toasts);
    };

    let download_tex = move |_| {
        let Some(latex) = shared.with_untracked(|s| s.latex().cloned()) else { return };
        let content = ResumeContent {
            bytes: latex.source.into_bytes(),
            content_type: Some("application/x-tex".to_string()),
        };
        save(&content, &format!("resume_{}.tex", latex.resume_id), toasts);
    };

    let sending = move || output.with(|o| o.is_sending());
    let view_mode = move || output.with(|o| o.view());
    let has_selection = move || shared.with(|s| s.selected().is_some());

    view! {
        <div class="panel output-panel">
            <div class="tabs">
                <button
                    class="tab"
                    class:active=move || view_mode() == OutputView::Chat
                    on:click=move |_| output.update(|o| o.show_chat())
                >
                    "AI Chat"
                </button>
                <button
                    class="tab"
                    class:active=move || view_mode() == OutputView::Latex
                    on:click=move |_| output.update(|o| o.show_latex())
                >
                    "LaTeX"
                </button>
            </div>

            <Show
                when=move || view_mode() == OutputView::Chat
                fallback=move || view! {
                    <div class="latex-view">
                        {move || match shared.with(|s| s.latex().map(|l| l.source.clone())) {
                            Some(source) => view! {
                                <pre class="latex-source">{source}</pre>
                                <button class="btn btn-secondary" on:click=download_tex>"Download .tex"</button>
                            }
                            .into_any(),
                            None => view! {
                                <div class="empty-state">
                                    <p class="text-muted">"No LaTeX generated for this resume yet."</p>
                                    <button
                                        class="btn btn-primary"
                                        disabled=move || loading_latex.get() || !has_selection()
                                        on:click=load_latex
                                    >
                                        {move || if loading_latex.get() { "Loading..." } else { "Load LaTeX" }}
                                    </button>
                                </div>
                            }
                            .into_any(),
                        }}
                    </div>
                }
            >
                <div class="chat">
                    <div class="chat-log">
                        <Show when=move || output.with(|o| o.transcript().is_empty())>
                            <p class="text-muted chat-hint">
                                "Ask the AI to improve your resume, e.g. \"Make my summary more concise\"."
                            </p>
                        </Show>
                        <For
                            each=move || output.with(|o| o.transcript().to_vec())
                            key=|turn| (turn.id, turn.status)
                            children=|turn| {
                                let class = turn_class(&turn);
                                let time = turn.timestamp.with_timezone(&Local).format("%H:%M").to_string();
                                view! {
                                    <div class=class>
                                        <p>{turn.text}</p>
                                        <span class="chat-time">{time}</span>
                                    </div>
                                }
                            }
                        />
                        <Show when=sending>
                            <div class="chat-turn chat-assistant typing">"AI is thinking..."</div>
                        </Show>
                    </div>

                    <div class="chat-input">
                        <textarea
                            placeholder=move || {
                                if has_selection() {
                                    "Describe how to refine your resume..."
                                } else {
                                    "Select a resume to start chatting"
                                }
                            }
                            prop:value=draft
                            disabled=move || !has_selection()
                            on:input=move |ev| set_draft.set(event_target_value(&ev))
                            on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                                if ev.key() == "Enter" && !ev.shift_key() {
                                    ev.prevent_default();
                                    send();
                                }
                            }
                        ></textarea>
                        <button
                            class="btn btn-primary"
                            disabled=move || sending() || !has_selection() || draft.with(|d| d.trim().is_empty())
                            on:click=move |_| send()
                        >
                            {move || if sending() { "Sending..." } else { "Send" }}
                        </button>
                    </div>

                    <Show when=move || shared.with(|s| s.ai_content().is_some())>
                        <button class="btn btn-secondary" on:click=download_html>"Download AI HTML"</button>
                    </Show>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_turn_class() {
        let turn = ChatTurn {
            id: 0,
            role: ChatRole::User,
            text: "shorter".into(),
            timestamp: Utc::now(),
            status: DeliveryStatus::Failed,
        };
        assert_eq!(turn_class(&turn), "chat-turn chat-user status-failed");
    }
}
