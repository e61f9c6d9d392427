use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{validate_amount, validate_date};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// TVA（付加価値税）率のデフォルト値（%）
pub const DEFAULT_PCT: f64 = 20.0;

/// 経費カテゴリ
///
/// 既知の値以外は `Unknown` として保持し、書き戻す時も元の文字列を使う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillCategory {
    #[default]
    Transports,
    RestaurantsEtBars,
    HotelEtLogement,
    ServicesEnLigne,
    ItEtElectronique,
    EquipementEtMateriel,
    FournituresDeBureau,
    Unknown(String),
}

impl BillCategory {
    /// APIサーバーとやり取りする文字列
    pub fn as_str(&self) -> &str {
        match self {
            BillCategory::Transports => "Transports",
            BillCategory::RestaurantsEtBars => "Restaurants et bars",
            BillCategory::HotelEtLogement => "Hôtel et logement",
            BillCategory::ServicesEnLigne => "Services en ligne",
            BillCategory::ItEtElectronique => "IT et électronique",
            BillCategory::EquipementEtMateriel => "Equipement et matériel",
            BillCategory::FournituresDeBureau => "Fournitures de bureau",
            BillCategory::Unknown(raw) => raw,
        }
    }
}

impl From<String> for BillCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Transports" => BillCategory::Transports,
            "Restaurants et bars" => BillCategory::RestaurantsEtBars,
            "Hôtel et logement" => BillCategory::HotelEtLogement,
            "Services en ligne" => BillCategory::ServicesEnLigne,
            "IT et électronique" => BillCategory::ItEtElectronique,
            "Equipement et matériel" => BillCategory::EquipementEtMateriel,
            "Fournitures de bureau" => BillCategory::FournituresDeBureau,
            _ => BillCategory::Unknown(value),
        }
    }
}

impl From<&str> for BillCategory {
    fn from(value: &str) -> Self {
        BillCategory::from(value.to_string())
    }
}

impl From<BillCategory> for String {
    fn from(category: BillCategory) -> Self {
        match category {
            BillCategory::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 承認ステータス
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
    Unknown(String),
}

impl BillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
            BillStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for BillStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => BillStatus::Pending,
            "accepted" => BillStatus::Accepted,
            "refused" => BillStatus::Refused,
            _ => BillStatus::Unknown(value),
        }
    }
}

impl From<BillStatus> for String {
    fn from(status: BillStatus) -> Self {
        match status {
            BillStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// 経費ノート（APIサーバーに保存されたレコード）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub category: BillCategory,
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    pub date: String, // YYYY-MM-DD形式（並び替えのため文字列のまま保持）
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub vat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub pct: Option<f64>,
    #[serde(default)]
    pub commentary: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub comment_admin: Option<String>,
}

impl BillRecord {
    /// 添付ファイルが設定されているか
    pub fn has_attachment(&self) -> bool {
        self.file_url.is_some() && self.file_name.is_some()
    }

    /// レコードの不変条件を検証する
    ///
    /// # バリデーション規則
    /// - 日付がYYYY-MM-DD形式の実在する日付であること
    /// - 金額が0以上であること
    /// - fileUrl と fileName が両方とも設定済み、または両方とも空であること
    pub fn validate(&self) -> AppResult<()> {
        validate_date(&self.date)?;
        validate_amount(self.amount)?;

        let url_set = self.file_url.as_deref().is_some_and(|s| !s.is_empty());
        let name_set = self.file_name.as_deref().is_some_and(|s| !s.is_empty());
        if url_set != name_set {
            return Err(AppError::validation(
                "fileUrl et fileName doivent être renseignés ensemble",
            ));
        }

        Ok(())
    }
}

/// フォーム入力から得られる経費ノートの項目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftFields {
    pub category: BillCategory,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub vat: Option<f64>,
    pub pct: Option<f64>,
    pub commentary: Option<String>,
}

/// 選択された添付ファイル（検証前のバイナリと宣言されたメディアタイプ）
#[derive(Clone, PartialEq, Eq)]
pub struct RawFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl RawFile {
    pub fn new<N: Into<String>, M: Into<String>>(file_name: N, bytes: Vec<u8>, media_type: M) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            media_type: media_type.into(),
        }
    }
}

impl std::fmt::Debug for RawFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// 新規登録フォームの下書き
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewBillDraft {
    pub fields: DraftFields,
    pub raw_file: Option<RawFile>,
}

/// 添付ファイルのアップロード結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "fileId", alias = "key")]
    pub file_id: String,
}

impl NewBillDraft {
    /// 下書きとアップロード結果から保存用のレコードを組み立てる
    ///
    /// ステータスは常に `pending`、TVA率が空の場合は20%とする。
    /// 添付ファイルが無い場合はNone。
    pub fn to_record(&self, email: &str, uploaded: &UploadedFile) -> Option<BillRecord> {
        let raw_file = self.raw_file.as_ref()?;
        let fields = &self.fields;

        Some(BillRecord {
            id: uploaded.file_id.clone(),
            email: email.to_string(),
            category: fields.category.clone(),
            name: fields.name.clone(),
            amount: fields.amount,
            date: fields.date.clone(),
            vat: fields.vat,
            pct: Some(fields.pct.unwrap_or(DEFAULT_PCT)),
            commentary: fields.commentary.clone(),
            file_url: Some(uploaded.file_url.clone()),
            file_name: Some(raw_file.file_name.clone()),
            status: BillStatus::Pending,
            comment_admin: None,
        })
    }
}

/// 数値または数値文字列を受け付ける（空文字列はNone）
fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("数値として解析できません: {text} ({e})"))),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// テスト用のレコードを作成する
    pub fn bill(id: &str, date: &str, status: BillStatus) -> BillRecord {
        BillRecord {
            id: id.to_string(),
            email: "a@a".to_string(),
            category: BillCategory::Transports,
            name: format!("bill {id}"),
            amount: 100.0,
            date: date.to_string(),
            vat: Some(20.0),
            pct: Some(20.0),
            commentary: None,
            file_url: Some(format!("https://example.com/{id}.png")),
            file_name: Some(format!("{id}.png")),
            status,
            comment_admin: None,
        }
    }

    /// 一覧表示のテストで使う4件のレコード
    pub fn bills() -> Vec<BillRecord> {
        vec![
            bill("47qAXb6fIm2zOKkLzMro", "2004-04-04", BillStatus::Pending),
            bill("BeKy5Mo4jkmdfPGYpTxZ", "2001-01-01", BillStatus::Refused),
            bill("UIUZtnPQvnbFnB0ozvJh", "2003-03-03", BillStatus::Accepted),
            bill("qcCK3SzECmaZAGRrHjaC", "2002-02-02", BillStatus::Refused),
        ]
    }
}
