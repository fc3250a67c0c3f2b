//! ダッシュボードのレジュメカード

use leptos::prelude::*;
use resume_ai_common::ResumeSummary;

#[component]
pub fn ResumeCard(
    summary: ResumeSummary,
    #[prop(into)] deleting: Signal<bool>,
    on_preview: Callback<String>,
    on_edit: Callback<String>,
    on_download: Callback<String>,
    on_delete: Callback<String>,
) -> impl IntoView {
    let ResumeSummary { id, title } = summary;
    let id = StoredValue::new(id);

    view! {
        <div class="resume-card" class:deleting=move || deleting.get()>
            <div class="resume-card-body">
                <div class="resume-icon">"📄"</div>
                <h3>{title}</h3>
                <p class="text-muted resume-id">{id.get_value()}</p>
            </div>
            <div class="resume-card-actions">
                <button class="btn btn-small" on:click=move |_| on_preview.run(id.get_value())>"Preview"</button>
                <button class="btn btn-small" on:click=move |_| on_edit.run(id.get_value())>"Edit"</button>
                <button class="btn btn-small" on:click=move |_| on_download.run(id.get_value())>"Download"</button>
                <button
                    class="btn btn-small btn-danger"
                    disabled=move || deleting.get()
                    on:click=move |_| on_delete.run(id.get_value())
                >
                    {move || if deleting.get() { "Deleting..." } else { "Delete" }}
                </button>
            </div>
        </div>
    }
}
