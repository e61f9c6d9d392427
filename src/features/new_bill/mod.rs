/// 新規経費ノート登録機能モジュール
///
/// 添付ファイルの検証と、アップロード → メタデータ保存の2段階の登録ワークフロー。
pub mod attachment;
pub mod controller;


pub use attachment::{check_attachment_name, INVALID_ATTACHMENT_MESSAGE};
pub use controller::{NewBillController, SubmissionError, SubmissionState};
