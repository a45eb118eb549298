//! Minimal iCalendar export of the event.
//!
//! Date and time are free text in the config, so parsing is best effort:
//! German month names, `dd.mm.yyyy`, ISO dates, `HH:MM` and `18 Uhr` are
//! understood, and bare digits are tried last. Lines end in CRLF.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::model::EventConfig;

pub const FILENAME: &str = "weihnachtsfeier.ics";
pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const EVENT_LENGTH_HOURS: i64 = 4;

const MONTHS: [(&str, u32); 13] = [
    ("jan", 1),
    ("feb", 2),
    ("mär", 3),
    ("mae", 3),
    ("mar", 3),
    ("apr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("okt", 10),
    ("nov", 11),
];

fn month_number(word: &str) -> Option<u32> {
    let word = word.trim_end_matches('.').to_lowercase();
    if word.starts_with("dez") || word.starts_with("dec") {
        return Some(12);
    }
    if word.starts_with("oct") {
        return Some(10);
    }
    if word.chars().count() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .find(|(prefix, _)| word.starts_with(prefix))
        .map(|(_, n)| *n)
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn year_from(value: i32) -> i32 {
    if value < 100 { 2000 + value } else { value }
}

/// Understands "18. Dezember 2025", "Do, 18. Dez 2025", "18.12.2025",
/// "18.12.25" and "2025-12-18". Falls back to eight bare digits
/// (`DDMMYYYY`, then `YYYYMMDD`).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    let numeric: Vec<&str> = text.split('.').map(str::trim).collect();
    if numeric.len() == 3 && numeric.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
        let day = numeric[0].parse().ok()?;
        let month = numeric[1].parse().ok()?;
        let year = year_from(numeric[2].parse().ok()?);
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let words: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();
    if let Some(pos) = words.iter().position(|w| month_number(w).is_some()) {
        let month = month_number(words[pos])?;
        let day = pos
            .checked_sub(1)
            .and_then(|i| words[i].trim_end_matches('.').parse::<u32>().ok());
        let year = words
            .get(pos + 1)
            .and_then(|w| w.trim_end_matches('.').parse::<i32>().ok())
            .map(year_from);
        if let (Some(day), Some(year)) = (day, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    let raw = digits(text);
    if raw.len() == 8 {
        let parse = |fmt: &str| NaiveDate::parse_from_str(&raw, fmt).ok();
        return parse("%d%m%Y").or_else(|| parse("%Y%m%d"));
    }
    None
}

/// Understands "17:00 Uhr", "ab 19.30", "18 Uhr" and bare "1800".
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let words: Vec<&str> = text.split_whitespace().collect();

    for word in &words {
        let word = word.trim_end_matches(|c: char| !c.is_ascii_digit());
        if let Some((h, m)) = word.split_once([':', '.']) {
            if let (Ok(h), Ok(m)) = (h.parse::<u32>(), m.parse::<u32>()) {
                if let Some(time) = NaiveTime::from_hms_opt(h, m, 0) {
                    return Some(time);
                }
            }
        }
    }

    if let Some(pos) = words.iter().position(|w| w.eq_ignore_ascii_case("uhr")) {
        if let Some(hour) = pos.checked_sub(1).and_then(|i| words[i].parse::<u32>().ok()) {
            return NaiveTime::from_hms_opt(hour, 0, 0);
        }
    }

    let raw = digits(text);
    match raw.len() {
        1 | 2 => NaiveTime::from_hms_opt(raw.parse().ok()?, 0, 0),
        3 | 4 => {
            let value: u32 = raw.parse().ok()?;
            NaiveTime::from_hms_opt(value / 100, value % 100, 0)
        }
        _ => None,
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

fn stamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%dT%H%M%S").to_string()
}

fn slug(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Times are floating local times; an unreadable time makes an all-day
/// event, an unreadable date falls back to the raw digits.
pub fn ics(config: &EventConfig, now: DateTime<Utc>) -> String {
    let date = parse_date(&config.date);
    let time = parse_time(&config.time);

    let (start, end) = match (date, time) {
        (Some(date), Some(time)) => {
            let start = date.and_time(time);
            let end = start + Duration::hours(EVENT_LENGTH_HOURS);
            (format!("DTSTART:{}", stamp(start)), format!("DTEND:{}", stamp(end)))
        }
        (Some(date), None) => {
            let next = date.succ_opt().unwrap_or(date);
            (
                format!("DTSTART;VALUE=DATE:{}", date.format("%Y%m%d")),
                format!("DTEND;VALUE=DATE:{}", next.format("%Y%m%d")),
            )
        }
        (None, _) => {
            let time_digits = format!("{:0<4}", digits(&config.time));
            (
                format!("DTSTART:{}T{}00", digits(&config.date), &time_digits[..4]),
                String::new(),
            )
        }
    };

    let uid_date = date.map(|d| format!("{:04}{:02}{:02}", d.year(), d.month(), d.day()));
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//guestlist-rs//DE".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!(
            "UID:{}-{}@guestlist",
            uid_date.unwrap_or_else(|| digits(&config.date)),
            slug(&config.title)
        ),
        format!("DTSTAMP:{}Z", stamp(now.naive_utc())),
        format!("SUMMARY:{}", escape(&config.title)),
        format!("DESCRIPTION:{}", escape(&config.subtitle)),
        start,
        end,
        format!("LOCATION:{}", escape(&config.location)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\r\n");
    out.push_str("\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn german_dates() {
        assert_eq!(parse_date("18. Dezember 2025"), date(2025, 12, 18));
        assert_eq!(parse_date("Donnerstag, 18. Dez. 2025"), date(2025, 12, 18));
        assert_eq!(parse_date("3. März 2026"), date(2026, 3, 3));
        assert_eq!(parse_date("3. Maerz 2026"), date(2026, 3, 3));
        assert_eq!(parse_date("1 Mai 26"), date(2026, 5, 1));
        assert_eq!(parse_date("18.12.2025"), date(2025, 12, 18));
        assert_eq!(parse_date("2025-12-18"), date(2025, 12, 18));
        assert_eq!(parse_date("18/12/2025"), date(2025, 12, 18));
        assert_eq!(parse_date("irgendwann"), None);
    }

    #[test]
    fn times() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        assert_eq!(parse_time("17:00 Uhr"), t(17, 0));
        assert_eq!(parse_time("ab 19.30"), t(19, 30));
        assert_eq!(parse_time("18 Uhr"), t(18, 0));
        assert_eq!(parse_time("1845"), t(18, 45));
        assert_eq!(parse_time("abends"), None);
    }

    #[test]
    fn default_event_has_four_hour_slot() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let ics = ics(&EventConfig::default(), now);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("DTSTART:20251218T170000\r\n"));
        assert!(ics.contains("DTEND:20251218T210000\r\n"));
        assert!(ics.contains("LOCATION:Judiths Gasthof\\, Weissenstadt\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn missing_time_gives_all_day_event() {
        let config = EventConfig {
            time: "abends".into(),
            ..EventConfig::default()
        };
        let ics = ics(&config, Utc::now());
        assert!(ics.contains("DTSTART;VALUE=DATE:20251218\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20251219\r\n"));
    }
}
