/// 画面遷移の論理パス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Bills,
    NewBill,
    Dashboard,
}

impl Route {
    /// ルーターが扱うパス文字列
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "",
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
            Route::Dashboard => "#admin/dashboard",
        }
    }

    /// パス文字列からルートを取得
    pub fn from_path(path: &str) -> Option<Self> {
        [Route::Login, Route::Bills, Route::NewBill, Route::Dashboard]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// 画面遷移を行うコラボレーター
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// 領収書（添付ファイル）を表示するモーダル
///
/// 実装はビュー層が持つ。コアは「URLの画像をタイトル付きで表示する」ことだけを要求する。
pub trait AttachmentViewer {
    fn show(&self, url: &str, title: &str);
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route)
    }
}

impl<T: AttachmentViewer + ?Sized> AttachmentViewer for std::sync::Arc<T> {
    fn show(&self, url: &str, title: &str) {
        (**self).show(url, title)
    }
}
