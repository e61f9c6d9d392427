/// 汎用APIクライアント
///
/// 経費ノートのAPIサーバーとの通信を行う。リトライは行わず、1回の往復で結果を返す。
use crate::shared::config::ApiConfig;
use crate::shared::errors::{AppError, RepositoryError};
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// APIサーバーからのエラーレスポンス（`{"message": "..."}`）
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 環境設定からAPIクライアントを作成
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(ApiConfig::from_env())
    }

    /// 接続先の設定
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = self.client.get(self.config.endpoint_url(endpoint));
        self.send(with_auth(request, auth_token), "GET", endpoint)
            .await
    }

    /// 個別リソースへのPATCHリクエストを送信
    ///
    /// `id` はパスセグメントとしてエンコードされ、`{collection}/{id}` に送信される。
    pub async fn patch_resource<B, T>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<T, RepositoryError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.config.resource_url(collection, id).map_err(|e| {
            warn!("リソースURLの構築に失敗しました: collection={collection}, id={id}, error={e}");
            RepositoryError::server(400, format!("リソースURLの構築に失敗しました: {e}"))
        })?;
        let endpoint = url.path().to_string();
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request = self.client.patch(url).json(body);
        self.send(with_auth(request, auth_token), "PATCH", &endpoint)
            .await
    }

    /// マルチパートのPOSTリクエストを送信
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        form: multipart::Form,
        auth_token: Option<&str>,
    ) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned,
    {
        info!("POST(multipart)リクエスト送信: endpoint={endpoint}");

        let request = self
            .client
            .post(self.config.endpoint_url(endpoint))
            .multipart(form);
        self.send(with_auth(request, auth_token), "POST", endpoint)
            .await
    }

    /// リクエストを1回だけ送信し、レスポンスを解析する
    async fn send<T>(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            warn!("{method}リクエスト送信失敗: endpoint={endpoint}, error={e}");
            RepositoryError::network(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let body = response.bytes().await.map_err(|e| {
            RepositoryError::network(format!("レスポンスの読み取りに失敗しました: {e}"))
        })?;

        let result = serde_json::from_slice(&body).map_err(|e| {
            warn!("レスポンス解析エラー: endpoint={endpoint}, error={e}");
            RepositoryError::server(status.as_u16(), format!("レスポンス解析エラー: {e}"))
        })?;

        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(result)
    }

    /// エラーレスポンスをサーバーエラーに変換
    async fn handle_error_response(&self, response: Response) -> RepositoryError {
        let status_code = response.status().as_u16();
        let response_text = response.text().await.unwrap_or_default();

        // JSONエラーレスポンスの解析を試行
        let message = match serde_json::from_str::<ErrorResponse>(&response_text) {
            Ok(error_response) => {
                debug!(
                    "APIサーバーから構造化エラーレスポンスを受信: status={status_code}, message={}",
                    error_response.message
                );
                error_response.message
            }
            Err(_) => {
                warn!(
                    "APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}"
                );
                response_text
            }
        };

        RepositoryError::server(status_code, message)
    }
}

/// 認証トークンがある場合はヘッダーを追加
fn with_auth(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
    match auth_token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}
