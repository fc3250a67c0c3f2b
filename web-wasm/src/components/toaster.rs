//! トースト表示

use crate::toast::Toasts;
use leptos::prelude::*;

#[component]
pub fn Toaster() -> impl IntoView {
    let toasts = Toasts::use_context();

    view! {
        <div class="toaster">
            <For
                each=move || toasts.items().get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=format!("toast toast-{}", toast.level.as_str())>
                            <span>{toast.text}</span>
                            <button class="toast-close" on:click=move |_| toasts.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
