//! バックエンドAPIの契約
//!
//! ブラウザ版（web-sys fetch）とネイティブ版（reqwest）の両クライアントが
//! 同じトレイト・同じワイヤ型・同じステータス判定を共有する。

use crate::error::{Error, Result};
use crate::upload::UploadFile;
use serde::{Deserialize, Serialize};

/// APIベースURLの既定値
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";

/// ベースURLを上書きする環境変数
pub const API_BASE_URL_ENV: &str = "RESUME_AI_API_BASE_URL";

/// POST /api/user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserRequest {
    pub email: String,
}

/// GET /api/resumes のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeList {
    #[serde(default)]
    pub resume_ids: Vec<String>,
}

/// POST /api/ai/generate のリクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub email: String,
    pub prompt: String,
    pub resume_id: String,
}

/// POST /api/ai/generate のレスポンス（AI生成結果）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    #[serde(default)]
    pub updated_content: Option<String>,
    #[serde(default)]
    pub latex_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub resume_id: Option<String>,
}

/// エラーボディ `{error}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// 取得した文書
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeContent {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ResumeContent {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            content_type: Some("text/html".to_string()),
        }
    }

    /// UTF-8として読めればテキストを返す
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// APIパス生成
///
/// クエリ（`email`）は各クライアントがプラットフォームの方法でエンコードして付与する
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRoutes {
    base_url: String,
}

impl ApiRoutes {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self) -> String {
        format!("{}/api/user", self.base_url)
    }

    pub fn resumes(&self) -> String {
        format!("{}/api/resumes", self.base_url)
    }

    pub fn resume(&self, resume_id: &str) -> String {
        format!("{}/api/resumes/{}", self.base_url, resume_id)
    }

    pub fn latex(&self, resume_id: &str) -> String {
        format!("{}/api/resumes/{}/latex", self.base_url, resume_id)
    }

    pub fn generate(&self) -> String {
        format!("{}/api/ai/generate", self.base_url)
    }
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// HTTPステータスとボディから結果を判定
///
/// - 2xx: 成功
/// - 404: `NotFound`（呼び出し側で「存在しない」を正常扱いできる）
/// - それ以外: `Http`（ボディの `error` があればそれをメッセージにする）
pub fn classify_status(status: u16, body: &str, what: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    if status == 404 {
        return Err(Error::NotFound(what.to_string()));
    }
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("{} failed", what)
            } else {
                trimmed.to_string()
            }
        });
    Err(Error::Http { status, message })
}

/// ユーザー登録の判定（409 = 既存ユーザーは成功扱い）
pub fn classify_user_status(status: u16, body: &str) -> Result<()> {
    if status == 409 {
        tracing::debug!("user already exists, treating as sign-in");
        return Ok(());
    }
    classify_status(status, body, "user registration")
}

/// バックエンドAPI
///
/// ブラウザではシングルスレッドで動くため `Send` は要求しない
#[allow(async_fn_in_trait)]
pub trait ResumeApi {
    /// ユーザーを作成（既存でも成功）
    async fn register_user(&self, email: &str) -> Result<()>;

    /// レジュメID一覧
    async fn list_resumes(&self, email: &str) -> Result<Vec<String>>;

    /// 文書本体（存在しなければ `NotFound`）
    async fn fetch_resume(&self, resume_id: &str, email: &str) -> Result<ResumeContent>;

    /// LaTeXソース
    async fn fetch_latex(&self, resume_id: &str, email: &str) -> Result<String>;

    /// アップロード（同じIDなら上書き）
    async fn upload_resume(&self, resume_id: &str, file: &UploadFile, email: &str) -> Result<()>;

    /// 削除
    async fn delete_resume(&self, resume_id: &str, email: &str) -> Result<()>;

    /// AI生成
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        let routes = ApiRoutes::new("http://api.example.com/");
        assert_eq!(routes.user(), "http://api.example.com/api/user");
        assert_eq!(routes.resumes(), "http://api.example.com/api/resumes");
        assert_eq!(routes.resume("r1"), "http://api.example.com/api/resumes/r1");
        assert_eq!(routes.latex("r1"), "http://api.example.com/api/resumes/r1/latex");
        assert_eq!(routes.generate(), "http://api.example.com/api/ai/generate");
    }

    #[test]
    fn test_routes_default() {
        assert_eq!(ApiRoutes::default().base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_classify_success() {
        assert!(classify_status(200, "", "list").is_ok());
        assert!(classify_status(204, "", "delete").is_ok());
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify_status(404, "", "resume r1_ai").unwrap_err();
        assert!(err.is_expected_absence());
    }

    #[test]
    fn test_classify_error_body() {
        let err = classify_status(400, r#"{"error":"Resume not owned by user"}"#, "delete").unwrap_err();
        match err {
            Error::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Resume not owned by user");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_classify_plain_body_and_empty_body() {
        let err = classify_status(502, "Bad gateway", "list").unwrap_err();
        assert!(format!("{}", err).contains("Bad gateway"));

        let err = classify_status(500, "  ", "list").unwrap_err();
        assert!(format!("{}", err).contains("list failed"));
    }

    #[test]
    fn test_classify_user_conflict_is_success() {
        assert!(classify_user_status(409, r#"{"error":"exists"}"#).is_ok());
        assert!(classify_user_status(201, "").is_ok());
        assert!(classify_user_status(500, "").is_err());
    }

    #[test]
    fn test_generate_response_partial() {
        let json = r#"{"updated_content":"<html>x</html>","message":"Done"}"#;
        let response: GenerateResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.updated_content.as_deref(), Some("<html>x</html>"));
        assert_eq!(response.message.as_deref(), Some("Done"));
        assert!(response.latex_code.is_none());
        assert!(response.resume_id.is_none());
    }

    #[test]
    fn test_resume_list_missing_field() {
        let list: ResumeList = serde_json::from_str("{}").expect("デシリアライズ失敗");
        assert!(list.resume_ids.is_empty());
    }

    #[test]
    fn test_generate_request_wire_names() {
        let request = GenerateRequest {
            email: "a@b.com".into(),
            prompt: "make it concise".into(),
            resume_id: "r1".into(),
        };
        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"resume_id\":\"r1\""));
        assert!(json.contains("\"prompt\":\"make it concise\""));
    }
}
