//! サインイン / サインアップ フォーム

use crate::api::BrowserApi;
use crate::app::{Navigator, Route};
use crate::identity::Identity;
use crate::toast::Toasts;
use leptos::prelude::*;
use leptos::task::spawn_local;
use resume_ai_common::{sign_in, AuthMode, Credentials};

#[component]
pub fn AuthForm(mode: AuthMode) -> impl IntoView {
    let api = expect_context::<BrowserApi>();
    let identity = Identity::use_context();
    let navigator = Navigator::use_context();
    let toasts = Toasts::use_context();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (name, set_name) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let mut credentials = Credentials::new(email.get_untracked()).with_password(password.get_untracked());
        let display_name = name.get_untracked();
        if !display_name.trim().is_empty() {
            credentials = credentials.with_display_name(display_name);
        }

        set_submitting.set(true);
        let api = api.clone();
        spawn_local(async move {
            let result = sign_in(&api, mode, &credentials)
                .await
                .and_then(|email| identity.set(&email));
            set_submitting.set(false);
            match result {
                Ok(()) => {
                    let text = match mode {
                        AuthMode::SignIn => "Successfully signed in!",
                        AuthMode::SignUp => "Account created successfully!",
                    };
                    toasts.success(text);
                    navigator.go(Route::Dashboard);
                }
                Err(error) => toasts.report(&error),
            }
        });
    };

    let (switch_text, switch_label, switch_route) = match mode {
        AuthMode::SignIn => ("Don't have an account?", "Sign up", Route::SignUp),
        AuthMode::SignUp => ("Already have an account?", "Sign in", Route::SignIn),
    };

    view! {
        <div class="auth-card">
            <h2>{mode.title()}</h2>
            <form class="auth-form" on:submit=on_submit>
                {(mode == AuthMode::SignUp).then(|| view! {
                    <label class="field">
                        <span>"Full name"</span>
                        <input
                            type="text"
                            placeholder="Jane Doe"
                            prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                    </label>
                })}
                <label class="field">
                    <span>"Email"</span>
                    <input
                        type="email"
                        placeholder="you@example.com"
                        prop:value=email
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </label>
                <label class="field">
                    <span>"Password"</span>
                    <input
                        type="password"
                        prop:value=password
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit" class="btn btn-primary btn-block" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Please wait..." } else { mode.title() }}
                </button>
            </form>
            <p class="text-muted auth-switch">
                {switch_text}" "
                <a on:click=move |_| navigator.go(switch_route.clone())>{switch_label}</a>
            </p>
        </div>
    }
}
