//! エラー型定義
//!
//! 入力検証エラー・通信エラー・「存在しないのが正常」な状態を区別する

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not signed in: no identity is stored")]
    MissingIdentity,

    #[error("No resume selected")]
    NoResumeSelected,

    #[error("Unsupported file type: {0} (allowed: html, pdf, docx)")]
    UnsupportedFileType(String),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Another {0} is already in progress")]
    Busy(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// エラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// ローカルで処理し、通信しない
    Validation,
    /// 通信・サーバーエラー（通知して操作を再有効化）
    Backend,
    /// 存在しないことが正常な場合がある状態（判断は呼び出し側）
    ExpectedAbsence,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingIdentity
            | Error::NoResumeSelected
            | Error::UnsupportedFileType(_)
            | Error::EmptyMessage
            | Error::MissingField(_)
            | Error::InvalidEmail(_)
            | Error::Busy(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::ExpectedAbsence,
            Error::Http { .. } | Error::Transport(_) | Error::Json(_) | Error::Config(_) => {
                ErrorKind::Backend
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_expected_absence(&self) -> bool {
        self.kind() == ErrorKind::ExpectedAbsence
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_http() {
        let error = Error::Http { status: 500, message: "boom".to_string() };
        assert_eq!(format!("{}", error), "Server error (status 500): boom");
    }

    #[test]
    fn test_error_display_unsupported_file() {
        let error = Error::UnsupportedFileType("resume.txt".to_string());
        let display = format!("{}", error);
        assert!(display.contains("resume.txt"));
        assert!(display.contains("html, pdf, docx"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
        assert_eq!(error.kind(), ErrorKind::Backend);
    }

    #[test]
    fn test_error_kind_validation() {
        for error in [
            Error::MissingIdentity,
            Error::NoResumeSelected,
            Error::EmptyMessage,
            Error::MissingField("email"),
            Error::InvalidEmail("ab.com".into()),
            Error::Busy("upload"),
            Error::UnsupportedFileType("a.png".into()),
        ] {
            assert!(error.is_validation(), "検証エラーのはず: {:?}", error);
        }
    }

    #[test]
    fn test_error_kind_not_found_is_expected_absence() {
        let error = Error::NotFound("r1_ai".to_string());
        assert!(error.is_expected_absence());
        assert!(!error.is_validation());
    }

    #[test]
    fn test_error_kind_transport() {
        let error = Error::Transport("connection refused".to_string());
        assert_eq!(error.kind(), ErrorKind::Backend);
    }
}
