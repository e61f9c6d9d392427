/// 経費ノート一覧画面のコントローラー
///
/// ビュー層から呼ばれ、リポジトリから一覧を取得して表示用の状態を返す。
use super::error_presenter::present_error;
use super::presenter::{present_bills, BillRow};
use super::repository::BillsRepository;
use crate::shared::navigation::{AttachmentViewer, Navigator, Route};
use log::{error, info, warn};

/// 領収書モーダルのタイトル
pub const ATTACHMENT_MODAL_TITLE: &str = "Justificatif";

/// 一覧画面の表示状態
#[derive(Debug, Clone, PartialEq)]
pub enum BillsView {
    /// 表示用の行（日付の降順）
    Bills(Vec<BillRow>),
    /// 一覧部分を置き換えるエラーメッセージ
    Error(String),
}

/// 一覧画面のコントローラー
pub struct BillsListController<R, N, V> {
    repository: R,
    navigator: N,
    viewer: V,
}

impl<R, N, V> BillsListController<R, N, V>
where
    R: BillsRepository,
    N: Navigator,
    V: AttachmentViewer,
{
    pub fn new(repository: R, navigator: N, viewer: V) -> Self {
        Self {
            repository,
            navigator,
            viewer,
        }
    }

    /// 一覧を取得して表示状態を返す
    ///
    /// 失敗した場合は部分的な結果を使わず、エラーメッセージだけを返す。
    pub async fn load(&self) -> BillsView {
        match self.repository.list().await {
            Ok(bills) => {
                info!("経費ノート一覧を表示します: count={}", bills.len());
                BillsView::Bills(present_bills(&bills))
            }
            Err(e) => {
                error!("経費ノート一覧の取得に失敗しました: {e}");
                BillsView::Error(present_error(&e))
            }
        }
    }

    /// 「新しいノート」ボタン
    pub fn on_new_bill_clicked(&self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// 目のアイコン（領収書の表示）
    pub fn on_icon_eye_clicked(&self, row: &BillRow) {
        match row.bill.file_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => self.viewer.show(url, ATTACHMENT_MODAL_TITLE),
            None => warn!("領収書が添付されていません: id={}", row.bill.id),
        }
    }
}
