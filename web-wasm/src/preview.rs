//! Object URLによるプレビューとダウンロード

use gloo::timers::callback::Timeout;
use js_sys::{Array, Uint8Array};
use resume_ai_common::api::ResumeContent;
use resume_ai_common::workspace::PreviewStore;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

const REVOKE_DELAY_MILLIS: u32 = 1_000;

/// バイト列をBlobに
pub fn bytes_to_blob(bytes: &[u8], mime_type: &str) -> Result<Blob, JsValue> {
    let array = Uint8Array::from(bytes);
    let parts = Array::of1(&array);
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

fn content_type(content: &ResumeContent) -> &str {
    content.content_type.as_deref().unwrap_or("text/html")
}

/// Object URLの発行・破棄
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectUrls;

impl PreviewStore for ObjectUrls {
    type Handle = String;

    fn create(&mut self, content: ResumeContent) -> String {
        bytes_to_blob(&content.bytes, content_type(&content))
            .and_then(|blob| Url::create_object_url_with_blob(&blob))
            .unwrap_or_else(|e| {
                gloo::console::error!("preview URL creation failed", e);
                String::new()
            })
    }

    fn release(&mut self, handle: String) {
        if !handle.is_empty() {
            let _ = Url::revoke_object_url(&handle);
        }
    }
}

/// ブラウザのダウンロードを開始
pub fn download(content: &ResumeContent, file_name: &str) -> Result<(), JsValue> {
    let blob = bytes_to_blob(&content.bytes, content_type(content))?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = leptos::prelude::document();
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    revoke_later(url);
    Ok(())
}

/// クリック直後に解放するとダウンロードが始まらないブラウザがあるので遅らせて解放
fn revoke_later(url: String) {
    Timeout::new(REVOKE_DELAY_MILLIS, move || {
        let _ = Url::revoke_object_url(&url);
    })
    .forget();
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::Response;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_download_url_still_readable_after_click() {
        let blob = bytes_to_blob(b"<p>hi</p>", "text/html").expect("Blob作成失敗");
        let url = Url::create_object_url_with_blob(&blob).expect("URL作成失敗");
        revoke_later(url.clone());

        let window = web_sys::window().expect("window取得失敗");
        let response: Response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .expect("fetch失敗")
            .dyn_into()
            .expect("Response変換失敗");
        assert!(response.ok());
    }
}
