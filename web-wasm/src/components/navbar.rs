//! ナビゲーションバー

use crate::app::{Navigator, Route};
use crate::identity::Identity;
use crate::toast::Toasts;
use leptos::prelude::*;

/// アバター表示用の頭文字
fn avatar_initial(email: &str) -> String {
    email.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default()
}

#[component]
pub fn Navbar() -> impl IntoView {
    let identity = Identity::use_context();
    let navigator = Navigator::use_context();
    let toasts = Toasts::use_context();

    let sign_out = move |_| match identity.clear() {
        Ok(()) => {
            toasts.success("Successfully signed out!");
            navigator.go(Route::Home);
        }
        Err(error) => toasts.report(&error),
    };

    view! {
        <nav class="navbar">
            <a class="brand" on:click=move |_| navigator.go(Route::Home)>"ResumeAI"</a>
            <Show
                when=move || identity.is_signed_in()
                fallback=move || view! {
                    <div class="nav-actions">
                        <button class="btn btn-ghost" on:click=move |_| navigator.go(Route::SignIn)>
                            "Sign In"
                        </button>
                        <button class="btn btn-primary" on:click=move |_| navigator.go(Route::SignUp)>
                            "Get Started"
                        </button>
                    </div>
                }
            >
                <div class="nav-actions">
                    <button class="btn btn-ghost" on:click=move |_| navigator.go(Route::Dashboard)>
                        "Dashboard"
                    </button>
                    <button
                        class="btn btn-primary"
                        on:click=move |_| navigator.go(Route::Create { resume: None })
                    >
                        "Create Resume"
                    </button>
                    <span class="avatar" title=move || identity.email().unwrap_or_default()>
                        {move || identity.email().as_deref().map(avatar_initial).unwrap_or_default()}
                    </span>
                    <button class="btn btn-tertiary" on:click=sign_out>"Sign Out"</button>
                </div>
            </Show>
        </nav>
    }
}
