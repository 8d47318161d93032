use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::path::Path;

use crate::error::BlogError;
use crate::models::types::CONTENT_EXTENSIONS;

pub mod markdown;

/// 从标题生成 URL 友好的别名
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// 检查文件是否为内容文件
pub fn is_content_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| CONTENT_EXTENSIONS.contains(&ext))
}

/// 解析前置数据中的日期
///
/// 带时区的格式保留原始偏移；不带时区的按 UTC 处理。
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, BlogError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    for format in ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M %z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    let utc = FixedOffset::east_opt(0).ok_or_else(|| BlogError::InvalidDate {
        value: value.to_string(),
    })?;
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(utc.from_utc_datetime(&dt));
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(utc.from_utc_datetime(&dt));
    }

    Err(BlogError::InvalidDate {
        value: value.to_string(),
    })
}

/// 格式化为前置数据中使用的日期
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%d %H:%M:%S %z").to_string()
}

/// 当前时间
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_written_offset() {
        let dt = parse_date("2016-03-20 23:30:00 +0100").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2016, 3, 20).unwrap());
        assert_eq!(format_date(&dt), "2016-03-20 23:30:00 +0100");
    }

    #[test]
    fn accepts_common_forms() {
        for value in [
            "2016-03-20T10:00:00+02:00",
            "2016-03-20 10:00 +0200",
            "2016-03-20 10:00:00",
            "2016-03-20",
        ] {
            assert!(parse_date(value).is_ok(), "{} should parse", value);
        }
        assert!(parse_date("March 20th").is_err());
    }

    #[test]
    fn content_extensions() {
        assert!(is_content_file("a/2016-01-01-x.md"));
        assert!(is_content_file("x.markdown"));
        assert!(is_content_file("x.html"));
        assert!(!is_content_file("x.png"));
        assert!(!is_content_file("README"));
    }
}
