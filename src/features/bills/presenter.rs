use super::models::{BillRecord, BillStatus};
use crate::shared::utils::format_date;
use log::warn;
use serde::Serialize;

/// 一覧表示用の行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillRow {
    /// 元のレコード
    pub bill: BillRecord,
    /// 表示用の日付（例: `4 Avr. 04`）
    pub formatted_date: String,
    /// ステータスの表示名
    pub status_label: String,
    /// ステータスの表示クラス
    pub status_class: &'static str,
}

/// ステータスの表示名と表示クラス
pub fn status_presentation(status: &BillStatus) -> (String, &'static str) {
    match status {
        BillStatus::Pending => ("En attente".to_string(), "status-pending"),
        BillStatus::Accepted => ("Accepté".to_string(), "status-accepted"),
        BillStatus::Refused => ("Refused".to_string(), "status-refused"),
        BillStatus::Unknown(raw) => (raw.clone(), "status-unknown"),
    }
}

/// レコードを日付の降順に並べ替える
///
/// 日付は固定長のISO形式なので文字列比較で時系列順になる。
pub fn sort_by_date_desc(bills: &mut [BillRecord]) {
    bills.sort_by(|a, b| b.date.cmp(&a.date));
}

/// レコード一覧を表示用の行に変換する
///
/// 並び替えは生の日付で行い、その後で表示用にフォーマットする。
/// 日付が壊れているレコードは生の文字列のまま表示する。
pub fn present_bills(bills: &[BillRecord]) -> Vec<BillRow> {
    let mut sorted = bills.to_vec();
    sort_by_date_desc(&mut sorted);

    sorted
        .into_iter()
        .map(|bill| {
            let formatted_date = format_date(&bill.date).unwrap_or_else(|e| {
                warn!("日付のフォーマットに失敗しました: id={}, error={e}", bill.id);
                bill.date.clone()
            });
            let (status_label, status_class) = status_presentation(&bill.status);

            BillRow {
                bill,
                formatted_date,
                status_label,
                status_class,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::models::fixtures;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    /// 任意の日付（一部は壊れた値）を持つレコード
    #[derive(Debug, Clone)]
    struct ArbitraryBill(BillRecord);

    impl Arbitrary for ArbitraryBill {
        fn arbitrary(g: &mut Gen) -> Self {
            let date = if bool::arbitrary(g) {
                format!(
                    "{:04}-{:02}-{:02}",
                    1990 + u32::arbitrary(g) % 40,
                    1 + u32::arbitrary(g) % 12,
                    1 + u32::arbitrary(g) % 28
                )
            } else {
                String::arbitrary(g)
            };
            let status = g
                .choose(&[BillStatus::Pending, BillStatus::Accepted, BillStatus::Refused])
                .cloned()
                .unwrap_or_default();
            let id = u32::arbitrary(g).to_string();
            ArbitraryBill(fixtures::bill(&id, &date, status))
        }
    }

    fn records(bills: &[ArbitraryBill]) -> Vec<BillRecord> {
        bills.iter().map(|b| b.0.clone()).collect()
    }

    #[test]
    fn test_bills_ordered_from_latest_to_earliest() {
        let rows = present_bills(&fixtures::bills());
        let dates: Vec<&str> = rows.iter().map(|r| r.bill.date.as_str()).collect();

        assert_eq!(
            dates,
            vec!["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]
        );
    }

    #[test]
    fn test_status_labels() {
        let rows = present_bills(&fixtures::bills());
        let labels: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.status_label.as_str(), r.status_class))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("En attente", "status-pending"),
                ("Accepté", "status-accepted"),
                ("Refused", "status-refused"),
                ("Refused", "status-refused"),
            ]
        );
    }

    #[test]
    fn test_unknown_status_shows_raw_value() {
        let (label, class) = status_presentation(&BillStatus::Unknown("archived".to_string()));
        assert_eq!(label, "archived");
        assert_eq!(class, "status-unknown");
    }

    #[test]
    fn test_formatted_dates() {
        let rows = present_bills(&fixtures::bills());
        assert_eq!(rows[0].formatted_date, "4 Avr. 04");
        assert_eq!(rows[3].formatted_date, "1 Jan. 01");
    }

    #[test]
    fn test_corrupted_date_is_kept_raw() {
        let bills = vec![fixtures::bill("x", "corrupted", BillStatus::Pending)];
        let rows = present_bills(&bills);
        assert_eq!(rows[0].formatted_date, "corrupted");
    }

    #[test]
    fn test_empty_input() {
        assert!(present_bills(&[]).is_empty());
    }

    #[quickcheck]
    fn prop_output_sorted_by_date_desc(bills: Vec<ArbitraryBill>) -> bool {
        let rows = present_bills(&records(&bills));
        rows.windows(2).all(|w| w[0].bill.date >= w[1].bill.date)
    }

    #[quickcheck]
    fn prop_presenting_twice_is_idempotent(bills: Vec<ArbitraryBill>) -> bool {
        let once = present_bills(&records(&bills));
        let again: Vec<BillRecord> = once.iter().map(|r| r.bill.clone()).collect();
        present_bills(&again) == once
    }

    #[quickcheck]
    fn prop_preserves_every_record(bills: Vec<ArbitraryBill>) -> bool {
        let input = records(&bills);
        let rows = present_bills(&input);
        rows.len() == input.len() && input.iter().all(|b| rows.iter().any(|r| &r.bill == b))
    }
}
