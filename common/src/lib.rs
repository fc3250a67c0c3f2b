//! Resume AI Common Library
//!
//! ブラウザ版(WASM)とCLIで共有される型・状態遷移・APIの契約

pub mod api;
pub mod auth;
pub mod chat;
pub mod create;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod ids;
pub mod resume_data;
pub mod shared;
pub mod upload;
pub mod workspace;

pub use api::{ApiRoutes, GenerateRequest, GenerateResponse, ResumeApi, ResumeContent};
pub use auth::{sign_in, AuthMode, Credentials};
pub use chat::{ChatRole, ChatTurn, DeliveryStatus, OutputView, OutputWorkspace};
pub use create::CreatePage;
pub use dashboard::{download_file_name, Dashboard, ResumeSummary};
pub use error::{Error, ErrorKind, Result};
pub use identity::{IdentityChange, IdentityStorage, IdentityStore, MemoryStorage};
pub use ids::{is_ai_id, new_resume_id, original_id_of, related_ai_id};
pub use resume_data::ResumeData;
pub use shared::{AiContent, LatexSource, SharedState, SharedUpdate};
pub use upload::{validate_upload, DocumentKind, UploadFile};
pub use workspace::{Commit, InputWorkspace, PreviewStore, RedefinedPlan, SubView, WorkspaceView};
