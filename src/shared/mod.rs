/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// APIサーバー用HTTPクライアント
pub mod api_client;

/// セッション情報
pub mod session;

/// 画面遷移・モーダルのコラボレーター
pub mod navigation;

/// 共有ユーティリティ関数
pub mod utils;

#[cfg(test)]
pub(crate) mod fake_api_server;

// 便利な再エクスポート
pub use config::{initialize_logging_system, load_environment_variables, ApiConfig};
pub use errors::{AppError, AppResult, RepositoryError};
pub use navigation::{AttachmentViewer, Navigator, Route};
pub use session::{Session, UserType};
