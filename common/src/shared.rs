//! 作成ページが唯一所有する共有状態
//!
//! 入力パネル・出力パネルはこの状態を参照のみで受け取り、
//! 変更したいときは `SharedUpdate` を返してページに適用してもらう。

/// セッション中にAIが生成したHTML
#[derive(Debug, Clone, PartialEq)]
pub struct AiContent {
    /// 対象の元レジュメID
    pub resume_id: String,
    pub html: String,
    /// サーバーが保存先として返したID
    pub persisted_as: Option<String>,
}

/// 最新のLaTeXソース
#[derive(Debug, Clone, PartialEq)]
pub struct LatexSource {
    pub resume_id: String,
    pub source: String,
}

/// 共有状態への変更要求
#[derive(Debug, Clone, PartialEq)]
pub enum SharedUpdate {
    Select(String),
    ClearSelection,
    AiContent(AiContent),
    Latex(LatexSource),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedState {
    selected: Option<String>,
    ai_content: Option<AiContent>,
    latex: Option<LatexSource>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// 選択中レジュメのAIコンテンツ（別レジュメのものは返さない）
    pub fn ai_content(&self) -> Option<&AiContent> {
        let selected = self.selected.as_deref()?;
        self.ai_content.as_ref().filter(|c| c.resume_id == selected)
    }

    /// 選択中レジュメのLaTeX
    pub fn latex(&self) -> Option<&LatexSource> {
        let selected = self.selected.as_deref()?;
        self.latex.as_ref().filter(|l| l.resume_id == selected)
    }

    /// 変更を適用。選択が変わった場合はtrue
    pub fn apply(&mut self, update: SharedUpdate) -> bool {
        match update {
            SharedUpdate::Select(id) => {
                let changed = self.selected.as_deref() != Some(id.as_str());
                self.selected = Some(id);
                changed
            }
            SharedUpdate::ClearSelection => self.selected.take().is_some(),
            SharedUpdate::AiContent(content) => {
                // 新しいAIコンテンツは古いものを置き換える
                self.ai_content = Some(content);
                false
            }
            SharedUpdate::Latex(latex) => {
                self.latex = Some(latex);
                false
            }
        }
    }
}
