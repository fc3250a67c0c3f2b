//! fetchによる `ResumeApi` 実装

use crate::preview::bytes_to_blob;
use js_sys::{encode_uri_component, Uint8Array};
use resume_ai_common::api::{
    classify_status, classify_user_status, ApiRoutes, CreateUserRequest, GenerateRequest, GenerateResponse,
    ResumeApi, ResumeContent, ResumeList, DEFAULT_API_BASE_URL,
};
use resume_ai_common::upload::UploadFile;
use resume_ai_common::{Error, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestInit, RequestMode, Response};

/// ビルド時の `RESUME_AI_API_BASE_URL`（未設定なら既定値）
pub fn api_base_url() -> &'static str {
    option_env!("RESUME_AI_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL)
}

fn js_error(value: JsValue) -> Error {
    Error::Transport(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

enum Body {
    Json(String),
    Form(FormData),
}

struct RawResponse {
    status: u16,
    content: ResumeContent,
}

impl RawResponse {
    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.content.bytes).into_owned()
    }

    fn classify(self, what: &str) -> Result<ResumeContent> {
        classify_status(self.status, &self.body_text(), what)?;
        Ok(self.content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserApi {
    routes: ApiRoutes,
}

impl Default for BrowserApi {
    fn default() -> Self {
        Self::new(api_base_url())
    }
}

impl BrowserApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            routes: ApiRoutes::new(base_url),
        }
    }

    fn with_email(url: String, email: &str) -> String {
        let encoded: String = encode_uri_component(email).into();
        format!("{}?email={}", url, encoded)
    }

    /// 新しいタブで開くための文書URL
    pub fn resume_url(&self, resume_id: &str, email: &str) -> String {
        Self::with_email(self.routes.resume(resume_id), email)
    }

    async fn send(&self, method: &str, url: &str, body: Option<Body>) -> Result<RawResponse> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        let is_json = matches!(body, Some(Body::Json(_)));
        match &body {
            Some(Body::Json(text)) => opts.set_body(&JsValue::from_str(text)),
            Some(Body::Form(form)) => opts.set_body(form),
            None => {}
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        if is_json {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let window = web_sys::window().ok_or_else(|| Error::Transport("window is not available".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;

        let status = resp.status();
        let content_type = resp.headers().get("content-type").ok().flatten();
        let buffer = JsFuture::from(resp.array_buffer().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(RawResponse {
            status,
            content: ResumeContent {
                bytes: Uint8Array::new(&buffer).to_vec(),
                content_type,
            },
        })
    }
}

impl ResumeApi for BrowserApi {
    async fn register_user(&self, email: &str) -> Result<()> {
        let body = serde_json::to_string(&CreateUserRequest { email: email.to_string() })?;
        let raw = self.send("POST", &self.routes.user(), Some(Body::Json(body))).await?;
        classify_user_status(raw.status, &raw.body_text())
    }

    async fn list_resumes(&self, email: &str) -> Result<Vec<String>> {
        let url = Self::with_email(self.routes.resumes(), email);
        let content = self.send("GET", &url, None).await?.classify("resume listing")?;
        let list: ResumeList = serde_json::from_slice(&content.bytes)?;
        Ok(list.resume_ids)
    }

    async fn fetch_resume(&self, resume_id: &str, email: &str) -> Result<ResumeContent> {
        let url = Self::with_email(self.routes.resume(resume_id), email);
        self.send("GET", &url, None).await?.classify(&format!("resume {}", resume_id))
    }

    async fn fetch_latex(&self, resume_id: &str, email: &str) -> Result<String> {
        let url = Self::with_email(self.routes.latex(resume_id), email);
        let content = self.send("GET", &url, None).await?.classify(&format!("latex {}", resume_id))?;
        Ok(String::from_utf8_lossy(&content.bytes).into_owned())
    }

    async fn upload_resume(&self, resume_id: &str, file: &UploadFile, email: &str) -> Result<()> {
        let blob = bytes_to_blob(&file.bytes, file.mime_type()).map_err(js_error)?;
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename("file", &blob, &file.file_name)
            .map_err(js_error)?;

        let url = Self::with_email(self.routes.resume(resume_id), email);
        self.send("PUT", &url, Some(Body::Form(form))).await?.classify("upload")?;
        Ok(())
    }

    async fn delete_resume(&self, resume_id: &str, email: &str) -> Result<()> {
        let url = Self::with_email(self.routes.resume(resume_id), email);
        self.send("DELETE", &url, None).await?.classify("delete")?;
        Ok(())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let body = serde_json::to_string(request)?;
        let content = self
            .send("POST", &self.routes.generate(), Some(Body::Json(body)))
            .await?
            .classify("AI generation")?;
        Ok(serde_json::from_slice(&content.bytes)?)
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_resume_url_encodes_email() {
        let api = BrowserApi::new("http://localhost:8080/");
        assert_eq!(
            api.resume_url("r1", "a+b@example.com"),
            "http://localhost:8080/api/resumes/r1?email=a%2Bb%40example.com"
        );
    }

    #[wasm_bindgen_test]
    fn test_bytes_to_blob_keeps_type() {
        let blob = bytes_to_blob(b"<p>hi</p>", "text/html").expect("Blob作成失敗");
        assert_eq!(blob.type_(), "text/html");
        assert_eq!(blob.size(), 9.0);
    }
}
