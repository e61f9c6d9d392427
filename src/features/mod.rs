/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・リポジトリ・コントローラーを含む。
pub mod bills;
pub mod new_bill;
