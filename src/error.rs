use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeAiError {
    #[error(transparent)]
    Common(#[from] resume_ai_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("サインインしていません。`resume-ai signin` でサインインしてください")]
    NotSignedIn,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl ResumeAiError {
    /// 共通エラーの「サインインしていない」をCLI向けのメッセージに寄せる
    pub fn normalize(self) -> Self {
        match self {
            ResumeAiError::Common(resume_ai_common::Error::MissingIdentity) => ResumeAiError::NotSignedIn,
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResumeAiError>;
