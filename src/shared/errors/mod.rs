use thiserror::Error;

/// リモートストア（BillsRepository）が返すエラー
///
/// どの操作も同じ2種類のエラーで失敗する。部分的な結果は返さない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// トランスポート層で到達できなかった
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// リモートが4xx/5xxで拒否した
    #[error("サーバーエラー: HTTP {code} - {message}")]
    Server { code: u16, message: String },
}

impl RepositoryError {
    /// ネットワークエラーを作成するヘルパー関数
    pub fn network<S: Into<String>>(message: S) -> Self {
        RepositoryError::Network(message.into())
    }

    /// サーバーエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `code` - HTTPステータスコード
    /// * `message` - サーバーが返したメッセージ
    pub fn server<S: Into<String>>(code: u16, message: S) -> Self {
        RepositoryError::Server {
            code,
            message: message.into(),
        }
    }
}

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Configuration(_) => "Erreur de configuration".to_string(),
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
