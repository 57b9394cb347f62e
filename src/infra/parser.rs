use chrono::{DateTime, SecondsFormat, Utc};

/// json-serverが件数を返すヘッダー名
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// ISO 8601文字列を日付型に変換する
///
/// オフセット付きの文字列はUTCに変換する。
///
/// # サポート形式の例
/// - "2025-01-15T10:00:00Z"
/// - "2025-01-15T10:00:00.123Z"
/// - "2025-01-15T19:00:00+09:00"
pub fn parse_date(date_str: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(date_str.trim()).map(|dt| dt.with_timezone(&Utc))
}

/// 日付をミリ秒精度・`Z`終端のISO 8601文字列にする
///
/// 例: `2025-01-15T10:00:00.000Z`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 件数ヘッダーの値を解析する
///
/// ヘッダーがない場合や数値でない場合は`None`を返す。
pub fn parse_total_count(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

/// `DateTime<Utc>`をISO 8601文字列として読み書きするserdeヘルパー
///
/// `#[serde(with = "crate::infra::parser::iso8601")]` として使う。
pub mod iso8601 {
    use super::{format_date, parse_date};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(|e| de::Error::custom(format!("不正な日付形式: {} ({})", raw, e)))
    }
}
