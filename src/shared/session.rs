use serde::{Deserialize, Serialize};

/// ログイン中のユーザー種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

/// ログイン中のユーザーのセッション情報
///
/// コントローラーの生成時に明示的に渡す。グローバルなストレージからは読まない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// メールアドレス（経費ノートの提出者）
    pub email: String,
    /// ユーザー種別
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// APIサーバー用のJWT（無い場合は認証ヘッダーを付けない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl Session {
    /// 従業員セッションを作成
    pub fn employee<S: Into<String>>(email: S) -> Self {
        Self {
            email: email.into(),
            user_type: UserType::Employee,
            jwt: None,
        }
    }

    /// JWTを付与したセッションを返す
    pub fn with_jwt<S: Into<String>>(mut self, jwt: S) -> Self {
        self.jwt = Some(jwt.into());
        self
    }

    /// 環境変数からセッションを読み込む
    ///
    /// * `BILLED_USER_EMAIL` - 必須
    /// * `BILLED_USER_TYPE` - `Admin` 以外は従業員扱い
    /// * `BILLED_JWT` - 任意
    pub fn from_env() -> Option<Self> {
        let email = crate::get_env_var_optional!("BILLED_USER_EMAIL")?;
        let user_type = match crate::get_env_var_or_default!("BILLED_USER_TYPE", "Employee").as_str()
        {
            "Admin" => UserType::Admin,
            _ => UserType::Employee,
        };
        let jwt = crate::get_env_var_optional!("BILLED_JWT");

        log::debug!("セッションを環境変数から読み込みました: email={email}, type={user_type:?}");

        Some(Self {
            email,
            user_type,
            jwt,
        })
    }
}
