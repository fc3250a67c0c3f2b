//! サインイン / サインアップ
//!
//! バックエンドにパスワード認証はなく、メールアドレスでユーザーを登録するだけ。
//! 既存ユーザー（409）も成功として扱う。

use crate::api::ResumeApi;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Create account",
        }
    }
}

/// 入力された資格情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// 必須項目の検証。正規化したメールアドレスを返す
    pub fn validate(&self, mode: AuthMode) -> Result<String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(Error::MissingField("email"));
        }
        if !email.contains('@') {
            return Err(Error::InvalidEmail(email.to_string()));
        }
        if mode == AuthMode::SignUp
            && self.password.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(Error::MissingField("password"));
        }
        Ok(email.to_string())
    }
}

/// 検証してユーザーを登録し、識別子として保存するメールアドレスを返す
pub async fn sign_in<A: ResumeApi>(api: &A, mode: AuthMode, credentials: &Credentials) -> Result<String> {
    let email = credentials.validate(mode)?;
    api.register_user(&email).await?;
    tracing::info!(%email, ?mode, "signed in");
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::testing::FakeApi;
    use futures::executor::block_on;

    #[test]
    fn test_validate_requires_email() {
        let err = Credentials::new("  ").validate(AuthMode::SignIn).unwrap_err();
        assert!(matches!(err, Error::MissingField("email")));
    }

    #[test]
    fn test_validate_requires_at_sign() {
        let err = Credentials::new("ab.com").validate(AuthMode::SignIn).unwrap_err();
        assert!(matches!(err, Error::InvalidEmail(_)));
    }

    #[test]
    fn test_signup_requires_password() {
        let creds = Credentials::new("a@b.com");
        assert!(matches!(
            creds.validate(AuthMode::SignUp),
            Err(Error::MissingField("password"))
        ));
        let creds = creds.with_password("secret").with_display_name("Ann");
        assert_eq!(creds.validate(AuthMode::SignUp).unwrap(), "a@b.com");
    }

    #[test]
    fn test_sign_in_registers_trimmed_email() {
        let api = FakeApi::default();
        let email = block_on(sign_in(&api, AuthMode::SignIn, &Credentials::new(" a@b.com "))).unwrap();
        assert_eq!(email, "a@b.com");
        assert!(api.users.borrow().contains("a@b.com"));
    }

    #[test]
    fn test_sign_in_invalid_sends_nothing() {
        let api = FakeApi::default();
        assert!(block_on(sign_in(&api, AuthMode::SignIn, &Credentials::new("nope"))).is_err());
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn test_sign_in_backend_failure() {
        let api = FakeApi::default();
        *api.offline.borrow_mut() = true;
        let err = block_on(sign_in(&api, AuthMode::SignIn, &Credentials::new("a@b.com"))).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
