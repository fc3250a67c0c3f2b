//! バックエンドAPIクライアント（reqwest）

use crate::config::Config;
use crate::error::Result;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use resume_ai_common::api::{
    classify_status, classify_user_status, ApiRoutes, CreateUserRequest, GenerateRequest, GenerateResponse,
    ResumeApi, ResumeContent, ResumeList,
};
use resume_ai_common::upload::UploadFile;
use resume_ai_common::Error;
use std::time::Duration;

type ApiResult<T> = resume_ai_common::Result<T>;

fn transport(error: reqwest::Error) -> Error {
    Error::Transport(error.to_string())
}

/// HTTPレスポンスの生データ
struct RawResponse {
    status: u16,
    content: ResumeContent,
}

impl RawResponse {
    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.content.bytes).into_owned()
    }

    fn classify(self, what: &str) -> ApiResult<ResumeContent> {
        classify_status(self.status, &self.body_text(), what)?;
        Ok(self.content)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResumeApi {
    client: reqwest::Client,
    routes: ApiRoutes,
}

impl HttpResumeApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            routes: ApiRoutes::new(base_url),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url(), Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        self.routes.base_url()
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<RawResponse> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport)?;
        tracing::debug!(status, len = bytes.len(), "response received");
        Ok(RawResponse {
            status,
            content: ResumeContent {
                bytes: bytes.to_vec(),
                content_type,
            },
        })
    }
}

impl ResumeApi for HttpResumeApi {
    async fn register_user(&self, email: &str) -> ApiResult<()> {
        let request = self
            .client
            .post(self.routes.user())
            .json(&CreateUserRequest { email: email.to_string() });
        let raw = self.send(request).await?;
        classify_user_status(raw.status, &raw.body_text())
    }

    async fn list_resumes(&self, email: &str) -> ApiResult<Vec<String>> {
        let request = self.client.get(self.routes.resumes()).query(&[("email", email)]);
        let content = self.send(request).await?.classify("resume listing")?;
        let list: ResumeList = serde_json::from_slice(&content.bytes)?;
        Ok(list.resume_ids)
    }

    async fn fetch_resume(&self, resume_id: &str, email: &str) -> ApiResult<ResumeContent> {
        let request = self.client.get(self.routes.resume(resume_id)).query(&[("email", email)]);
        self.send(request).await?.classify(&format!("resume {}", resume_id))
    }

    async fn fetch_latex(&self, resume_id: &str, email: &str) -> ApiResult<String> {
        let request = self.client.get(self.routes.latex(resume_id)).query(&[("email", email)]);
        let content = self.send(request).await?.classify(&format!("latex {}", resume_id))?;
        Ok(String::from_utf8_lossy(&content.bytes).into_owned())
    }

    async fn upload_resume(&self, resume_id: &str, file: &UploadFile, email: &str) -> ApiResult<()> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type())
            .map_err(transport)?;
        let request = self
            .client
            .put(self.routes.resume(resume_id))
            .query(&[("email", email)])
            .multipart(Form::new().part("file", part));
        self.send(request).await?.classify("upload")?;
        Ok(())
    }

    async fn delete_resume(&self, resume_id: &str, email: &str) -> ApiResult<()> {
        let request = self.client.delete(self.routes.resume(resume_id)).query(&[("email", email)]);
        self.send(request).await?.classify("delete")?;
        Ok(())
    }

    async fn generate(&self, request: &GenerateRequest) -> ApiResult<GenerateResponse> {
        let builder = self.client.post(self.routes.generate()).json(request);
        let content = self.send(builder).await?.classify("AI generation")?;
        Ok(serde_json::from_slice(&content.bytes)?)
    }
}
