/// 経費ノートのリポジトリ
///
/// リモートストアの list / create / update を抽象化する。
/// 実装（REST、インメモリなど）はこの3操作と2種類のエラーだけを満たせばよい。
use super::models::{BillRecord, RawFile, UploadedFile};
use crate::shared::errors::RepositoryError;
use crate::shared::utils::nanoid::generate_id;
use log::{debug, info};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// リモートストアに対する操作
///
/// どの操作も内部でリトライせず、1回の往復で完了する。
#[allow(async_fn_in_trait)]
pub trait BillsRepository {
    /// 現在のユーザーが参照できる全レコードを取得する
    async fn list(&self) -> Result<Vec<BillRecord>, RepositoryError>;

    /// 添付ファイルだけをアップロードする（メタデータは保存しない）
    async fn create(&self, attachment: &RawFile) -> Result<UploadedFile, RepositoryError>;

    /// レコードのメタデータを保存し、サーバーで確定したレコードを返す
    ///
    /// `record.id` には create で得たファイルIDを入れて呼び出す。
    async fn update(&self, record: &BillRecord) -> Result<BillRecord, RepositoryError>;
}

impl<T: BillsRepository> BillsRepository for std::sync::Arc<T> {
    async fn list(&self) -> Result<Vec<BillRecord>, RepositoryError> {
        (**self).list().await
    }

    async fn create(&self, attachment: &RawFile) -> Result<UploadedFile, RepositoryError> {
        (**self).create(attachment).await
    }

    async fn update(&self, record: &BillRecord) -> Result<BillRecord, RepositoryError> {
        (**self).update(record).await
    }
}

/// リポジトリ操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    List,
    Create,
    Update,
}

#[derive(Debug, Default)]
struct InMemoryState {
    records: Vec<BillRecord>,
    files: HashMap<String, RawFile>,
    calls: Vec<RepositoryOperation>,
    failures: HashMap<RepositoryOperation, VecDeque<RepositoryError>>,
}

/// インメモリのリポジトリ
///
/// テストやAPIサーバーが無い環境で使う。操作ごとに失敗を予約でき、呼び出し順を記録する。
#[derive(Debug)]
pub struct InMemoryBillsRepository {
    state: Mutex<InMemoryState>,
    file_base_url: String,
    latency: Option<Duration>,
}

impl Default for InMemoryBillsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBillsRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
            file_base_url: "memory://files".to_string(),
            latency: None,
        }
    }

    /// 初期レコード付きで作成
    pub fn with_records(records: Vec<BillRecord>) -> Self {
        let repository = Self::new();
        repository.lock().records = records;
        repository
    }

    /// 各操作に遅延を入れる（非同期の往復を模擬する）
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 次の該当操作を指定したエラーで失敗させる
    pub fn fail_next(&self, operation: RepositoryOperation, error: RepositoryError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// これまでに呼ばれた操作（呼び出し順）
    pub fn calls(&self) -> Vec<RepositoryOperation> {
        self.lock().calls.clone()
    }

    /// 保存済みのレコード
    pub fn records(&self) -> Vec<BillRecord> {
        self.lock().records.clone()
    }

    /// アップロード済みのファイル
    pub fn uploaded_file(&self, file_id: &str) -> Option<RawFile> {
        self.lock().files.get(file_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 呼び出しを記録し、予約された失敗があれば返す
    async fn begin(&self, operation: RepositoryOperation) -> Result<(), RepositoryError> {
        let failure = {
            let mut state = self.lock();
            state.calls.push(operation);
            state
                .failures
                .get_mut(&operation)
                .and_then(VecDeque::pop_front)
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match failure {
            Some(error) => {
                debug!("予約された失敗を返します: operation={operation:?}, error={error}");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl BillsRepository for InMemoryBillsRepository {
    async fn list(&self) -> Result<Vec<BillRecord>, RepositoryError> {
        self.begin(RepositoryOperation::List).await?;
        Ok(self.records())
    }

    async fn create(&self, attachment: &RawFile) -> Result<UploadedFile, RepositoryError> {
        self.begin(RepositoryOperation::Create).await?;

        let file_id = generate_id();
        let file_url = format!("{}/{file_id}/{}", self.file_base_url, attachment.file_name);
        self.lock().files.insert(file_id.clone(), attachment.clone());

        info!("ファイルを保存しました: file_id={file_id}, size={}", attachment.bytes.len());
        Ok(UploadedFile { file_url, file_id })
    }

    async fn update(&self, record: &BillRecord) -> Result<BillRecord, RepositoryError> {
        self.begin(RepositoryOperation::Update).await?;

        let mut stored = record.clone();
        if stored.id.is_empty() {
            stored.id = generate_id();
        }

        let mut state = self.lock();
        match state.records.iter().position(|r| r.id == stored.id) {
            Some(index) => state.records[index] = stored.clone(),
            None => state.records.push(stored.clone()),
        }

        info!("レコードを保存しました: id={}", stored.id);
        Ok(stored)
    }
}
