//! ダッシュボード: 保存済みレジュメの一覧

use crate::api::BrowserApi;
use crate::app::{Navigator, Route};
use crate::components::resume_card::ResumeCard;
use crate::identity::Identity;
use crate::preview;
use crate::toast::Toasts;
use leptos::prelude::*;
use leptos::task::spawn_local;
use resume_ai_common::{download_file_name, Dashboard, ResumeApi};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = expect_context::<BrowserApi>();
    let identity = Identity::use_context();
    let navigator = Navigator::use_context();
    let toasts = Toasts::use_context();
    let dashboard = RwSignal::new(Dashboard::new());

    // 初回読み込み
    {
        let api = api.clone();
        match identity.require() {
            Ok(email) => {
                dashboard.update(Dashboard::begin_loading);
                spawn_local(async move {
                    let result = api.list_resumes(&email).await;
                    let failed = dashboard.try_update(|d| match result {
                        Ok(ids) => {
                            d.set_resumes(ids);
                            None
                        }
                        Err(error) => Some(d.fail_loading(error)),
                    });
                    if let Some(Some(error)) = failed {
                        toasts.report(&error);
                    }
                });
            }
            Err(error) => toasts.report(&error),
        }
    }

    let on_preview = {
        let api = api.clone();
        Callback::new(move |id: String| {
            let Ok(email) = identity.require() else { return };
            let url = api.resume_url(&id, &email);
            if window().open_with_url_and_target(&url, "_blank").is_err() {
                toasts.warning("Could not open a new tab");
            }
        })
    };

    let on_edit = Callback::new(move |id: String| navigator.go(Route::Create { resume: Some(id) }));

    let on_download = {
        let api = api.clone();
        Callback::new(move |id: String| {
            let api = api.clone();
            spawn_local(async move {
                let result = match identity.require() {
                    Ok(email) => api.fetch_resume(&id, &email).await,
                    Err(error) => Err(error),
                };
                match result {
                    Ok(content) => match preview::download(&content, &download_file_name(&id)) {
                        Ok(()) => toasts.success("Download started"),
                        Err(e) => gloo::console::error!("download failed", e),
                    },
                    Err(error) => toasts.report(&error),
                }
            });
        })
    };

    let on_delete = {
        let api = api.clone();
        Callback::new(move |id: String| {
            if !gloo::dialogs::confirm("Are you sure you want to delete this resume?") {
                return;
            }
            let email = match identity.require() {
                Ok(email) => email,
                Err(error) => return toasts.report(&error),
            };
            if let Some(Err(error)) = dashboard.try_update(|d| d.begin_delete(&id)) {
                return toasts.report(&error);
            }
            let api = api.clone();
            spawn_local(async move {
                let outcome = api.delete_resume(&id, &email).await;
                match dashboard.try_update(|d| d.finish_delete(outcome)) {
                    Some(Ok(())) => toasts.success("Resume deleted successfully"),
                    Some(Err(error)) => toasts.report(&error),
                    None => {}
                }
            });
        })
    };

    view! {
        <section class="dashboard">
            <div class="dashboard-header">
                <div>
                    <h1>"My Resumes"</h1>
                    <p class="text-muted">"Manage and edit your saved resumes"</p>
                </div>
                <button class="btn btn-primary" on:click=move |_| navigator.go(Route::Create { resume: None })>
                    "Create New Resume"
                </button>
            </div>

            <input
                class="search"
                type="search"
                placeholder="Search resumes..."
                prop:value=move || dashboard.with(|d| d.query().to_string())
                on:input=move |ev| dashboard.update(|d| d.set_query(event_target_value(&ev)))
            />

            {move || {
                if dashboard.with(Dashboard::is_loading) {
                    return view! { <div class="spinner">"Loading resumes..."</div> }.into_any();
                }
                let visible: Vec<_> = dashboard.with(|d| d.visible().into_iter().cloned().collect());
                if visible.is_empty() {
                    let searching = dashboard.with(|d| !d.query().trim().is_empty());
                    return view! {
                        <div class="empty-state">
                            <div class="empty-icon">"📄"</div>
                            <h3>{if searching { "No matching resumes" } else { "No resumes yet" }}</h3>
                            <p class="text-muted">
                                {if searching {
                                    "Try a different search term."
                                } else {
                                    "Upload your first resume to get started."
                                }}
                            </p>
                            <button
                                class="btn btn-primary"
                                on:click=move |_| navigator.go(Route::Create { resume: None })
                            >
                                "Create Resume"
                            </button>
                        </div>
                    }
                    .into_any();
                }
                view! {
                    <div class="resume-grid">
                        {visible
                            .into_iter()
                            .map(|summary| {
                                let id = summary.id.clone();
                                let deleting = Signal::derive(move || dashboard.with(|d| d.is_deleting(&id)));
                                view! {
                                    <ResumeCard
                                        summary=summary
                                        deleting=deleting
                                        on_preview=on_preview
                                        on_edit=on_edit
                                        on_download=on_download
                                        on_delete=on_delete
                                    />
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}
        </section>
    }
}
