/// 経費ノート機能モジュール
///
/// - 経費ノートのモデルと不変条件
/// - リモートストアのリポジトリ（REST / インメモリ）
/// - 一覧表示（並び替え・ステータス表示・日付フォーマット）
/// - リポジトリエラーの表示文字列
pub mod api_repository;
pub mod commands;
pub mod error_presenter;
pub mod models;
pub mod presenter;
pub mod repository;

pub use api_repository::ApiBillsRepository;
pub use commands::{BillsListController, BillsView};
pub use error_presenter::present_error;
pub use models::{
    BillCategory, BillRecord, BillStatus, DraftFields, NewBillDraft, RawFile, UploadedFile,
};
pub use presenter::{present_bills, BillRow};
pub use repository::{BillsRepository, InMemoryBillsRepository, RepositoryOperation};
