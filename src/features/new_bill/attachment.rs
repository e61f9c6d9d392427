use crate::shared::utils::is_allowed_attachment;

/// 拡張子が不正な場合に表示するメッセージ
pub const INVALID_ATTACHMENT_MESSAGE: &str = "L'image doit être au format jpg, jpeg ou png";

/// 添付ファイル名の拡張子を検証する
///
/// jpg / jpeg / png（大文字小文字は区別しない）以外は拒否し、表示用メッセージを返す。
pub fn check_attachment_name(file_name: &str) -> Result<(), &'static str> {
    if is_allowed_attachment(file_name) {
        Ok(())
    } else {
        Err(INVALID_ATTACHMENT_MESSAGE)
    }
}
