use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// `YYYY-MM-DD`, optionally followed by `T` or a space and `HH:MM`.
pub fn is_valid_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    let date_ok = |b: &[u8]| {
        b.len() >= 10
            && b[..4].iter().all(u8::is_ascii_digit)
            && b[4] == b'-'
            && b[5..7].iter().all(u8::is_ascii_digit)
            && b[7] == b'-'
            && b[8..10].iter().all(u8::is_ascii_digit)
    };
    match b.len() {
        10 => date_ok(b),
        16 => {
            date_ok(b)
                && (b[10] == b'T' || b[10] == b' ')
                && b[11..13].iter().all(u8::is_ascii_digit)
                && b[13] == b':'
                && b[14..16].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Parses what the dashboard date pickers send: RFC 3339, `YYYY-MM-DD`
/// (midnight UTC) or `YYYY-MM-DD[T ]HH:MM` (UTC).
pub fn parse_dashboard_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if !is_valid_iso_date(s) {
        return None;
    }
    if s.len() == 10 {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    let normalized = s.replacen(' ', "T", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Serde helper for optional dashboard dates; use with `#[serde(default)]`.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_dashboard_datetime(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_iso_date_shapes() {
        assert!(is_valid_iso_date("2026-10-20"));
        assert!(is_valid_iso_date("2026-10-20T14:30"));
        assert!(is_valid_iso_date("2026-10-20 14:30"));
        assert!(!is_valid_iso_date("2026-1-20"));
        assert!(!is_valid_iso_date("2026-10-20T14:30:00"));
        assert!(!is_valid_iso_date("20/10/2026"));
        assert!(!is_valid_iso_date(""));
    }

    #[test]
    fn test_parse_dashboard_datetime() {
        let d = parse_dashboard_datetime("2026-10-20").unwrap();
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2026, 10, 20, 0));

        let t = parse_dashboard_datetime("2026-10-20 09:15").unwrap();
        assert_eq!((t.hour(), t.minute()), (9, 15));

        let rfc = parse_dashboard_datetime("2026-10-20T09:15:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 7);

        assert!(parse_dashboard_datetime("2026-13-40").is_none());
        assert!(parse_dashboard_datetime("next week").is_none());
    }
}
