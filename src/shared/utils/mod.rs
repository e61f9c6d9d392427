pub mod nanoid;

use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// 日付の固定フォーマット
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 添付ファイルとして受け付ける拡張子
pub const ALLOWED_ATTACHMENT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 表示用の月の略称（1月始まり）
const FRENCH_MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// 日付文字列のバリデーション
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること（固定長10文字）
/// - 実在する日付であること
pub fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    if date_str.len() != 10 {
        return Err(AppError::validation(
            "La date doit être au format AAAA-MM-JJ",
        ));
    }

    // 区切り以外はすべてASCII数字（符号付きの年は不可）
    let well_formed = date_str.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return Err(AppError::validation(
            "La date doit être au format AAAA-MM-JJ",
        ));
    }

    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Date invalide : {date_str}")))
}

/// 金額のバリデーション
///
/// 0以上の有限な数値であること
pub fn validate_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() {
        return Err(AppError::validation("Montant invalide"));
    }

    if amount < 0.0 {
        return Err(AppError::validation("Le montant doit être positif"));
    }

    Ok(())
}

/// ファイル名から拡張子を取得する（小文字化済み）
///
/// 最後のドット以降を拡張子とみなす。ドットが無い場合はNone。
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() && extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// 添付ファイルとして受け付ける拡張子かどうか
pub fn is_allowed_attachment(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// 日付を一覧表示用の形式にフォーマットする
///
/// `2004-04-04` → `4 Avr. 04`（日、月の略称、西暦下2桁）
pub fn format_date(date_str: &str) -> AppResult<String> {
    let date = validate_date(date_str)?;
    let month = FRENCH_MONTHS[date.month0() as usize];
    let year = date.year().rem_euclid(100);
    Ok(format!("{} {month}. {year:02}", date.day()))
}
