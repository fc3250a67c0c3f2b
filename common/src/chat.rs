//! 出力パネル（AIチャット / LaTeX表示）の状態
//!
//! 送信: Idle → Sending → Idle（成功・失敗どちらでも戻る）
//! 会話ログは追記のみで、失敗したやり取りも残す。

use crate::api::{GenerateRequest, GenerateResponse};
use crate::error::{Error, Result};
use crate::shared::{AiContent, LatexSource, SharedState, SharedUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// サーバーがメッセージを返さなかった場合の応答
pub const DEFAULT_ACKNOWLEDGEMENT: &str = "I've updated your resume based on your request.";

/// 通信失敗時の応答
pub const APOLOGY_MESSAGE: &str =
    "Sorry, something went wrong while updating your resume. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// 送信状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
}

/// 出力パネルの表示モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputView {
    #[default]
    Chat,
    Latex,
}

/// 送信中のプロンプト
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    turn_id: u64,
    resume_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct OutputWorkspace {
    transcript: Vec<ChatTurn>,
    pending: Option<Pending>,
    view: OutputView,
    next_turn: u64,
}

impl OutputWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> OutputView {
        self.view
    }

    pub fn show_chat(&mut self) {
        self.view = OutputView::Chat;
    }

    pub fn show_latex(&mut self) {
        self.view = OutputView::Latex;
    }

    /// 送信開始
    ///
    /// 空文字・送信中・未選択の場合はリクエストを作らずにエラーを返す。
    /// 成功時はユーザー発言を即座にログへ追加する。
    pub fn begin_send(
        &mut self,
        text: &str,
        shared: &SharedState,
        email: &str,
    ) -> Result<GenerateRequest> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(Error::EmptyMessage);
        }
        if self.pending.is_some() {
            return Err(Error::Busy("AI request"));
        }
        let resume_id = shared.selected().ok_or(Error::NoResumeSelected)?.to_string();

        let turn_id = self.push_turn(ChatRole::User, prompt.to_string(), DeliveryStatus::Pending);
        self.pending = Some(Pending {
            turn_id,
            resume_id: resume_id.clone(),
        });
        tracing::debug!(%resume_id, "sending refinement prompt");

        Ok(GenerateRequest {
            email: email.to_string(),
            prompt: prompt.to_string(),
            resume_id,
        })
    }

    /// 応答を反映し、共有状態への変更要求を返す
    ///
    /// LaTeX表示への切り替えは、送信時のレジュメがまだ選択中の場合だけ
    pub fn complete(&mut self, response: GenerateResponse, shared: &SharedState) -> Vec<SharedUpdate> {
        let Some(pending) = self.pending.take() else {
            tracing::warn!("AI response arrived with no pending request");
            return Vec::new();
        };
        self.set_status(pending.turn_id, DeliveryStatus::Confirmed);

        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACKNOWLEDGEMENT.to_string());
        self.push_turn(ChatRole::Assistant, message, DeliveryStatus::Confirmed);

        let mut updates = Vec::new();
        if let Some(html) = response.updated_content {
            updates.push(SharedUpdate::AiContent(AiContent {
                resume_id: pending.resume_id.clone(),
                html,
                persisted_as: response.resume_id,
            }));
        }
        if let Some(source) = response.latex_code {
            if shared.selected() == Some(pending.resume_id.as_str()) {
                self.view = OutputView::Latex;
            }
            updates.push(SharedUpdate::Latex(LatexSource {
                resume_id: pending.resume_id,
                source,
            }));
        }
        updates
    }

    /// 失敗を記録（ログは巻き戻さない）
    pub fn fail(&mut self, error: Error) -> Error {
        if let Some(pending) = self.pending.take() {
            self.set_status(pending.turn_id, DeliveryStatus::Failed);
        }
        tracing::warn!(%error, "AI request failed");
        self.push_turn(ChatRole::Assistant, APOLOGY_MESSAGE.to_string(), DeliveryStatus::Failed);
        error
    }

    fn push_turn(&mut self, role: ChatRole, text: String, status: DeliveryStatus) -> u64 {
        let id = self.next_turn;
        self.next_turn += 1;
        self.transcript.push(ChatTurn {
            id,
            role,
            text,
            timestamp: Utc::now(),
            status,
        });
        id
    }

    fn set_status(&mut self, turn_id: u64, status: DeliveryStatus) {
        if let Some(turn) = self.transcript.iter_mut().find(|t| t.id == turn_id) {
            turn.status = status;
        }
    }
}
