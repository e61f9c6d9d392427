/// 新規経費ノート登録画面のコントローラー
///
/// 下書きの編集、添付ファイルの検証、2段階の書き込み（アップロード → メタデータ保存）、
/// 成功時の画面遷移を担当する。ビュー層からは各イベントに対応するメソッドを呼ぶ。
use super::attachment::{check_attachment_name, INVALID_ATTACHMENT_MESSAGE};
use crate::features::bills::error_presenter::present_error;
use crate::features::bills::models::{BillRecord, DraftFields, NewBillDraft, RawFile};
use crate::features::bills::repository::BillsRepository;
use crate::shared::errors::{AppError, RepositoryError};
use crate::shared::navigation::{Navigator, Route};
use crate::shared::session::Session;
use crate::shared::utils::{validate_amount, validate_date};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// 登録ワークフローの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// 入力中（初期状態）
    Editing,
    /// アップロード・保存の実行中
    Submitting,
    /// 保存完了
    Submitted,
    /// 直前の送信が失敗した（下書きは保持されている）
    Failed,
}

/// 登録ワークフローのエラー
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 添付ファイルの拡張子が不正
    #[error("L'image doit être au format jpg, jpeg ou png")]
    InvalidAttachment,

    /// 有効な添付ファイルが選択されていない
    #[error("添付ファイルが選択されていません")]
    MissingAttachment,

    /// 別の送信が実行中
    #[error("送信処理が既に実行中です")]
    AlreadySubmitting,

    /// 入力項目が不正
    #[error("入力内容が不正です: {0}")]
    InvalidDraft(AppError),

    /// リモートストアでの失敗
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SubmissionError {
    /// 画面に表示するメッセージ
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::InvalidAttachment => INVALID_ATTACHMENT_MESSAGE.to_string(),
            SubmissionError::MissingAttachment => {
                "Veuillez sélectionner un justificatif".to_string()
            }
            SubmissionError::AlreadySubmitting => "Envoi en cours".to_string(),
            SubmissionError::InvalidDraft(e) => e.user_message(),
            SubmissionError::Repository(e) => present_error(e),
        }
    }
}

#[derive(Debug)]
struct FormState {
    draft: NewBillDraft,
    state: SubmissionState,
    attachment_error: Option<String>,
    form_error: Option<String>,
}

/// 送信中フラグを解放するガード（Future がキャンセルされた場合も解放される）
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 新規経費ノート登録画面のコントローラー
pub struct NewBillController<R, N> {
    session: Session,
    repository: R,
    navigator: N,
    form: Mutex<FormState>,
    in_flight: AtomicBool,
}

impl<R, N> NewBillController<R, N>
where
    R: BillsRepository,
    N: Navigator,
{
    /// フォームを開いた時点の空の下書きで作成
    pub fn new(session: Session, repository: R, navigator: N) -> Self {
        Self {
            session,
            repository,
            navigator,
            form: Mutex::new(FormState {
                draft: NewBillDraft::default(),
                state: SubmissionState::Editing,
                attachment_error: None,
                form_error: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 現在の下書き
    pub fn draft(&self) -> NewBillDraft {
        self.lock().draft.clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    /// 添付ファイル欄に表示するエラー
    pub fn attachment_error(&self) -> Option<String> {
        self.lock().attachment_error.clone()
    }

    /// フォーム部分を置き換えるエラー（リポジトリの失敗）
    pub fn form_error(&self) -> Option<String> {
        self.lock().form_error.clone()
    }

    /// 入力項目を編集する（通信は行わない）
    pub fn edit<F>(&self, update: F)
    where
        F: FnOnce(&mut DraftFields),
    {
        let mut form = self.lock();
        update(&mut form.draft.fields);
        if form.state != SubmissionState::Submitting {
            form.state = SubmissionState::Editing;
        }
    }

    /// 添付ファイルが選択された
    ///
    /// 拡張子が不正な場合は以前の添付ファイルを残したままエラーを返す。
    /// 送信中は添付ファイルを差し替えられない。
    pub fn on_attachment_selected(&self, file: RawFile) -> Result<(), SubmissionError> {
        let mut form = self.lock();
        if self.in_flight.load(Ordering::Acquire) {
            warn!("送信中のため添付ファイルを変更できません: file_name={}", file.file_name);
            return Err(SubmissionError::AlreadySubmitting);
        }
        form.state = SubmissionState::Editing;

        if let Err(message) = check_attachment_name(&file.file_name) {
            warn!("添付ファイルの形式が不正です: file_name={}", file.file_name);
            form.attachment_error = Some(message.to_string());
            return Err(SubmissionError::InvalidAttachment);
        }

        debug!(
            "添付ファイルを選択しました: file_name={}, media_type={}",
            file.file_name, file.media_type
        );
        form.attachment_error = None;
        form.draft.raw_file = Some(file);
        Ok(())
    }

    /// フォームが送信された
    ///
    /// # 処理内容
    /// 1. 入力項目を下書きに反映
    /// 2. 添付ファイルのアップロード（create）
    /// 3. 下書きとアップロード結果からレコードを組み立てて保存（update）
    /// 4. 成功時は下書きを破棄して一覧画面へ遷移
    ///
    /// 失敗時は下書きをそのまま残し、画面遷移は行わない。
    pub async fn on_submit(&self, snapshot: DraftFields) -> Result<BillRecord, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("送信処理が実行中のため、新しい送信を拒否しました");
            return Err(SubmissionError::AlreadySubmitting);
        };

        let draft = {
            let mut form = self.lock();
            form.draft.fields = snapshot;

            if form.draft.raw_file.is_none() {
                warn!("添付ファイルが無いため送信できません");
                form.state = SubmissionState::Editing;
                return Err(SubmissionError::MissingAttachment);
            }

            if let Err(e) = validate_fields(&form.draft.fields) {
                warn!("入力内容が不正なため送信できません: {e}");
                form.state = SubmissionState::Editing;
                return Err(SubmissionError::InvalidDraft(e));
            }

            form.state = SubmissionState::Submitting;
            form.form_error = None;
            form.draft.clone()
        };

        match self.write(&draft).await {
            Ok(saved) => {
                {
                    let mut form = self.lock();
                    form.draft = NewBillDraft::default();
                    form.state = SubmissionState::Submitted;
                }
                info!("経費ノートを登録しました: id={}", saved.id);
                self.navigator.navigate(Route::Bills);
                Ok(saved)
            }
            Err(e) => {
                error!("経費ノートの登録に失敗しました: {e}");
                let mut form = self.lock();
                form.state = SubmissionState::Failed;
                form.form_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// 2段階の書き込み（アップロード → メタデータ保存）
    async fn write(&self, draft: &NewBillDraft) -> Result<BillRecord, SubmissionError> {
        let raw_file = draft
            .raw_file
            .as_ref()
            .ok_or(SubmissionError::MissingAttachment)?;

        let uploaded = self.repository.create(raw_file).await?;
        debug!(
            "添付ファイルをアップロードしました: file_id={}, url={}",
            uploaded.file_id, uploaded.file_url
        );

        let record = draft
            .to_record(&self.session.email, &uploaded)
            .ok_or(SubmissionError::MissingAttachment)?;

        Ok(self.repository.update(&record).await?)
    }
}

/// 送信前に入力項目を検証する（リポジトリを呼ぶ前に弾く）
fn validate_fields(fields: &DraftFields) -> Result<(), AppError> {
    validate_date(&fields.date)?;
    validate_amount(fields.amount)?;
    Ok(())
}
