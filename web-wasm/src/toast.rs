//! トースト通知

use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use resume_ai_common::Error;

const TOAST_MILLIS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastLevel::Success => "success",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub text: String,
}

#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    pub fn provide() -> Self {
        let toasts = Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        };
        provide_context(toasts);
        toasts
    }

    pub fn use_context() -> Self {
        expect_context::<Toasts>()
    }

    pub fn items(&self) -> RwSignal<Vec<Toast>> {
        self.items
    }

    pub fn push(&self, level: ToastLevel, text: impl Into<String>) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|items| {
            items.push(Toast {
                id,
                level,
                text: text.into(),
            })
        });

        let items = self.items;
        Timeout::new(TOAST_MILLIS, move || items.update(|items| items.retain(|t| t.id != id))).forget();
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|t| t.id != id));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(ToastLevel::Success, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(ToastLevel::Info, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(ToastLevel::Warning, text);
    }

    /// エラーを種類に応じて通知
    ///
    /// 存在しないのが正常なケースは呼び出し側で `Ok(None)` などに変換済みなので、
    /// ここに届いた NotFound は失敗として扱う。
    pub fn report(&self, error: &Error) {
        self.push(level_for(error), error.to_string());
    }
}

fn level_for(error: &Error) -> ToastLevel {
    if error.is_validation() {
        ToastLevel::Warning
    } else {
        ToastLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_validation_is_warning() {
        assert_eq!(level_for(&Error::EmptyMessage), ToastLevel::Warning);
        assert_eq!(level_for(&Error::NoResumeSelected), ToastLevel::Warning);
    }

    #[test]
    fn test_level_for_missing_document_is_error() {
        // 選択したレジュメが消えていた場合などは利用者に見せる
        assert_eq!(level_for(&Error::NotFound("r1".into())), ToastLevel::Error);
        assert_eq!(level_for(&Error::Transport("offline".into())), ToastLevel::Error);
    }
}
