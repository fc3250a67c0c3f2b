//! レジュメIDの規約
//!
//! AI版のIDは元IDに固定サフィックスを付けたもの。
//! 親子関係はフィールドとして保持せず、ここの関数で導出する。
//! AI版が存在しないのは通常状態（まだAI編集していない）。

/// AI版IDのサフィックス
pub const AI_SUFFIX: &str = "_ai";

/// 元IDに対応するAI版IDを返す
///
/// # Examples
/// ```
/// use resume_ai_common::related_ai_id;
///
/// assert_eq!(related_ai_id("r1"), "r1_ai");
/// ```
pub fn related_ai_id(original_id: &str) -> String {
    format!("{}{}", original_id, AI_SUFFIX)
}

/// AI版IDかどうか
pub fn is_ai_id(id: &str) -> bool {
    id.len() > AI_SUFFIX.len() && id.ends_with(AI_SUFFIX)
}

/// AI版IDから元IDを取り出す（AI版でなければNone）
pub fn original_id_of(id: &str) -> Option<&str> {
    if is_ai_id(id) {
        id.strip_suffix(AI_SUFFIX)
    } else {
        None
    }
}

/// 新しいレジュメIDを生成
pub fn new_resume_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
