//! メインアプリケーションコンポーネント

use crate::api::BrowserApi;
use crate::components::{
    auth_form::AuthForm, create_page::CreatePage, dashboard::DashboardPage, home::Home, navbar::Navbar,
    toaster::Toaster,
};
use crate::identity::Identity;
use crate::toast::Toasts;
use leptos::prelude::*;
use resume_ai_common::AuthMode;

/// 画面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Dashboard,
    /// 作成画面（ダッシュボードの「編集」からはIDを選択済みで開く）
    Create { resume: Option<String> },
}

impl Route {
    /// サインインが必要な画面か
    pub fn requires_identity(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Create { .. })
    }
}

/// 画面遷移
#[derive(Clone, Copy)]
pub struct Navigator(RwSignal<Route>);

impl Navigator {
    fn provide() -> Self {
        let navigator = Self(RwSignal::new(Route::Home));
        provide_context(navigator);
        navigator
    }

    pub fn use_context() -> Self {
        expect_context::<Navigator>()
    }

    pub fn current(&self) -> Route {
        self.0.get()
    }

    pub fn go(&self, route: Route) {
        self.0.set(route);
    }
}

#[component]
pub fn App() -> impl IntoView {
    Toasts::provide();
    let identity = Identity::provide();
    let navigator = Navigator::provide();
    provide_context(BrowserApi::default());

    // 未サインインで保護画面にいたらサインインへ（他タブでのサインアウトも含む）
    Effect::new(move |_| {
        if navigator.current().requires_identity() && !identity.is_signed_in() {
            navigator.go(Route::SignIn);
        }
    });

    view! {
        <div class="app">
            <Navbar />
            <main class="main">
                {move || match navigator.current() {
                    Route::Home => view! { <Home /> }.into_any(),
                    Route::SignIn => view! { <AuthForm mode=AuthMode::SignIn /> }.into_any(),
                    Route::SignUp => view! { <AuthForm mode=AuthMode::SignUp /> }.into_any(),
                    Route::Dashboard => view! { <DashboardPage /> }.into_any(),
                    Route::Create { resume } => view! { <CreatePage preselect=resume /> }.into_any(),
                }}
            </main>
            <Toaster />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_routes() {
        assert!(Route::Dashboard.requires_identity());
        assert!(Route::Create { resume: Some("r1".into()) }.requires_identity());
        assert!(!Route::Home.requires_identity());
        assert!(!Route::SignIn.requires_identity());
    }
}
