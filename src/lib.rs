//! Resume AI CLI
//!
//! ブラウザ版と同じバックエンド・同じ状態遷移を端末から使うクライアント

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod preview;
pub mod session;
