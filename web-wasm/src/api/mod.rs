//! バックエンドAPI（ブラウザfetch）

mod client;

pub use client::{api_base_url, BrowserApi};
