use crate::shared::errors::RepositoryError;

/// ネットワーク障害時に表示するメッセージ
pub const NETWORK_ERROR_MESSAGE: &str = "Erreur réseau : impossible de joindre le serveur";

/// リポジトリのエラーを画面に表示する文字列に変換する
///
/// サーバーエラーは `Erreur <code>`、ネットワークエラーは汎用の接続エラーメッセージ。
pub fn present_error(error: &RepositoryError) -> String {
    match error {
        RepositoryError::Server { code, .. } => format!("Erreur {code}"),
        RepositoryError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
    }
}
