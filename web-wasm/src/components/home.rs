//! トップページ

use crate::app::{Navigator, Route};
use crate::identity::Identity;
use leptos::prelude::*;

#[component]
pub fn Home() -> impl IntoView {
    let navigator = Navigator::use_context();
    let identity = Identity::use_context();

    let start = move |_| {
        if identity.is_signed_in() {
            navigator.go(Route::Create { resume: None });
        } else {
            navigator.go(Route::SignUp);
        }
    };

    view! {
        <section class="hero">
            <h1>"Build your resume with AI"</h1>
            <p class="text-muted">
                "Upload an existing resume, then refine it by chatting with AI. "
                "Preview the original and the AI-redefined version side by side, and export LaTeX."
            </p>
            <div class="hero-actions">
                <button class="btn btn-primary btn-large" on:click=start>"Get Started"</button>
                <Show when=move || identity.is_signed_in()>
                    <button class="btn btn-secondary btn-large" on:click=move |_| navigator.go(Route::Dashboard)>
                        "View Dashboard"
                    </button>
                </Show>
            </div>
        </section>
    }
}
