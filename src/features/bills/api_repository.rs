/// APIサーバー経由の経費ノートリポジトリ
///
/// * `GET /bills` - 一覧取得
/// * `POST /bills` - 添付ファイルのアップロード（multipart）
/// * `PATCH /bills/{id}` - メタデータの保存
use super::models::{BillRecord, RawFile, UploadedFile};
use super::repository::BillsRepository;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::RepositoryError;
use crate::shared::session::Session;
use log::{info, warn};
use reqwest::multipart;

const BILLS_ENDPOINT: &str = "/bills";

/// APIサーバー経由のリポジトリ
#[derive(Debug, Clone)]
pub struct ApiBillsRepository {
    client: ApiClient,
    session: Session,
}

impl ApiBillsRepository {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }

    fn auth_token(&self) -> Option<&str> {
        self.session.jwt.as_deref()
    }

    /// アップロード用のマルチパートフォームを構築
    fn upload_form(&self, attachment: &RawFile) -> multipart::Form {
        let part = multipart::Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone());

        // 宣言されたメディアタイプが不正な場合はバイナリとして送る
        let part = match part.mime_str(&attachment.media_type) {
            Ok(part) => part,
            Err(e) => {
                warn!(
                    "メディアタイプが不正です: media_type={}, error={e}",
                    attachment.media_type
                );
                multipart::Part::bytes(attachment.bytes.clone())
                    .file_name(attachment.file_name.clone())
            }
        };

        multipart::Form::new()
            .part("file", part)
            .text("email", self.session.email.clone())
    }
}

impl BillsRepository for ApiBillsRepository {
    async fn list(&self) -> Result<Vec<BillRecord>, RepositoryError> {
        let bills: Vec<BillRecord> = self.client.get(BILLS_ENDPOINT, self.auth_token()).await?;
        info!("経費ノート一覧取得成功: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, attachment: &RawFile) -> Result<UploadedFile, RepositoryError> {
        info!(
            "添付ファイルのアップロード開始: file_name={}, size={}",
            attachment.file_name,
            attachment.bytes.len()
        );

        let uploaded: UploadedFile = self
            .client
            .post_multipart(BILLS_ENDPOINT, self.upload_form(attachment), self.auth_token())
            .await?;

        info!(
            "添付ファイルのアップロード成功: file_id={}, url={}",
            uploaded.file_id, uploaded.file_url
        );
        Ok(uploaded)
    }

    async fn update(&self, record: &BillRecord) -> Result<BillRecord, RepositoryError> {
        if matches!(record.id.as_str(), "" | "." | "..") {
            // 更新先を特定できないため送信しない
            return Err(RepositoryError::server(
                400,
                "レコードIDが指定されていません",
            ));
        }

        let saved: BillRecord = self
            .client
            .patch_resource(BILLS_ENDPOINT, &record.id, record, self.auth_token())
            .await?;

        info!("経費ノート保存成功: id={}", saved.id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::models::{fixtures, BillStatus};
    use crate::shared::config::ApiConfig;
    use crate::shared::fake_api_server::FakeApiServer;
    use hyper::StatusCode;

    fn repository_for(server: &FakeApiServer, session: Session) -> ApiBillsRepository {
        let config = ApiConfig {
            base_url: server.base_url(),
            timeout_seconds: 5,
        };
        ApiBillsRepository::new(ApiClient::new(config).unwrap(), session)
    }

    #[tokio::test]
    async fn test_list() {
        let body = serde_json::to_string(&fixtures::bills()).unwrap();
        let server = FakeApiServer::start(move |_| (StatusCode::OK, body.clone())).await;
        let repository = repository_for(&server, Session::employee("a@a").with_jwt("jwt-token"));

        let bills = repository.list().await.unwrap();
        assert_eq!(bills, fixtures::bills());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/bills");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer jwt-token"));
    }

    #[tokio::test]
    async fn test_list_error_statuses() {
        for code in [404u16, 500] {
            let server = FakeApiServer::start(move |_| {
                (
                    StatusCode::from_u16(code).unwrap(),
                    r#"{"message": "boom"}"#.to_string(),
                )
            })
            .await;
            let repository = repository_for(&server, Session::employee("a@a"));

            let result = repository.list().await;
            assert_eq!(result, Err(RepositoryError::server(code, "boom")));
        }
    }

    #[tokio::test]
    async fn test_invalid_body_is_server_error() {
        let server =
            FakeApiServer::start(|_| (StatusCode::OK, "not json".to_string())).await;
        let repository = repository_for(&server, Session::employee("a@a"));

        let result = repository.list().await;
        assert!(matches!(
            result,
            Err(RepositoryError::Server { code: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_uploads_multipart() {
        let server = FakeApiServer::start(|_| {
            (
                StatusCode::OK,
                r#"{"fileUrl": "https://localhost:3456/images/test.jpg", "key": "1234"}"#
                    .to_string(),
            )
        })
        .await;
        let repository = repository_for(&server, Session::employee("a@a"));
        let file = RawFile::new("receipt.png", b"PNGDATA".to_vec(), "image/png");

        let uploaded = repository.create(&file).await.unwrap();
        assert_eq!(uploaded.file_id, "1234");
        assert_eq!(uploaded.file_url, "https://localhost:3456/images/test.jpg");

        let request = &server.requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/bills");
        assert!(request.authorization.is_none());
        assert!(request
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data"));

        let body = request.body_text();
        assert!(body.contains("filename=\"receipt.png\""));
        assert!(body.contains("image/png"));
        assert!(body.contains("PNGDATA"));
        assert!(body.contains("name=\"email\""));
        assert!(body.contains("a@a"));
    }

    #[tokio::test]
    async fn test_update_patches_record() {
        let server = FakeApiServer::start(|request| {
            // 受け取ったレコードにIDを確定させて返す
            let mut record: BillRecord = serde_json::from_slice(&request.body).unwrap();
            record.id = "b1".to_string();
            (StatusCode::OK, serde_json::to_string(&record).unwrap())
        })
        .await;
        let repository = repository_for(&server, Session::employee("a@a"));
        let record = fixtures::bill("f1", "2023-05-01", BillStatus::Pending);

        let saved = repository.update(&record).await.unwrap();
        assert_eq!(saved.id, "b1");
        assert_eq!(saved.status, BillStatus::Pending);

        let request = &server.requests()[0];
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.path, "/bills/f1");
        assert!(request.body_text().contains("\"fileUrl\":"));
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected_locally() {
        let server = FakeApiServer::start(|_| (StatusCode::OK, "{}".to_string())).await;
        let repository = repository_for(&server, Session::employee("a@a"));
        let mut record = fixtures::bill("f1", "2023-05-01", BillStatus::Pending);
        record.id.clear();

        let result = repository.update(&record).await;
        assert!(matches!(result, Err(RepositoryError::Server { code: 400, .. })));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_escapes_id_in_path() {
        let server = FakeApiServer::start(|request| {
            (StatusCode::OK, request.body_text())
        })
        .await;
        let repository = repository_for(&server, Session::employee("a@a"));

        for id in ["folder/f1", "f1?x=1", "f1#frag"] {
            let record = fixtures::bill(id, "2023-05-01", BillStatus::Pending);
            let saved = repository.update(&record).await.unwrap();
            assert_eq!(saved.id, id);
        }

        let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec!["/bills/folder%2Ff1", "/bills/f1%3Fx=1", "/bills/f1%23frag"]
        );
    }

    #[tokio::test]
    async fn test_update_with_dot_segment_id_is_rejected_locally() {
        let server = FakeApiServer::start(|_| (StatusCode::OK, "{}".to_string())).await;
        let repository = repository_for(&server, Session::employee("a@a"));

        for id in [".", ".."] {
            let record = fixtures::bill(id, "2023-05-01", BillStatus::Pending);
            let result = repository.update(&record).await;
            assert!(matches!(result, Err(RepositoryError::Server { code: 400, .. })));
        }
        assert!(server.requests().is_empty());
    }
}
