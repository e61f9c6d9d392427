// 機能モジュール構造
pub mod features;
pub mod shared;

use features::bills::{present_bills, present_error, ApiBillsRepository, BillsRepository};
use log::{info, warn};
use shared::api_client::ApiClient;
use shared::config::environment::{initialize_logging_system, load_environment_variables};
use shared::errors::AppResult;
use shared::session::Session;

pub use features::bills::{BillRecord, BillsListController, BillsView, InMemoryBillsRepository};
pub use features::new_bill::{NewBillController, SubmissionError, SubmissionState};
pub use shared::{AppError, RepositoryError, Route};

/// 環境変数にセッションが無い場合に使う従業員アカウント
const FALLBACK_EMAIL: &str = "employee@test.tld";

/// コマンドラインのエントリーポイント
///
/// 環境変数とログを初期化し、APIサーバーから経費ノート一覧を取得して表示する。
/// 取得に失敗した場合は画面と同じエラーメッセージを表示する。
pub async fn run() -> AppResult<()> {
    // 環境変数を読み込み（ログシステム初期化前に実行）
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let session = Session::from_env().unwrap_or_else(|| {
        warn!("BILLED_USER_EMAILが未設定のため、{FALLBACK_EMAIL}として実行します");
        Session::employee(FALLBACK_EMAIL)
    });

    let client = ApiClient::from_env()?;
    info!("APIサーバー: {}", client.config().base_url);

    let repository = ApiBillsRepository::new(client, session);
    match repository.list().await {
        Ok(bills) => {
            for row in present_bills(&bills) {
                println!(
                    "{}  {}  {}  {}  {}",
                    row.formatted_date, row.bill.category, row.bill.name, row.bill.amount, row.status_label
                );
            }
        }
        Err(e) => println!("{}", present_error(&e)),
    }

    info!("処理が完了しました");
    Ok(())
}
