use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use crate::roster::{CellValue, RosterError};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const CUTOFF_FORMAT: &str = "%d.%m.%Y";

/// Text is tried as `YYYY-MM-DD HH:MM:SS`, then `YYYY-MM-DD`.
pub fn parse_cell_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(text) => parse_date_text(text),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    // chrono skips leading whitespace and takes signed or long years; require `YYYY-` up front
    let bytes = text.as_bytes();
    if bytes.len() < 5 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(NaiveDateTime);

impl Cutoff {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    // strict: an event at the cutoff itself is not a change
    pub fn is_before(&self, date: &NaiveDateTime) -> bool {
        *date > self.0
    }
}

impl Display for Cutoff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(CUTOFF_FORMAT))
    }
}

pub fn parse_cutoff(text: &str) -> Result<Cutoff, RosterError> {
    let invalid = || RosterError::InvalidCutoff(text.to_string());
    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(text, CUTOFF_FORMAT)
        .map(Cutoff::from_date)
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::roster::date::{parse_cell_date, parse_cutoff};
    use crate::roster::{CellValue, RosterError};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .expect("valid test date")
    }

    #[test]
    fn structured_dates_pass_through() {
        let dt = at(2024, 3, 1, 14, 30, 0);
        assert_eq!(parse_cell_date(&CellValue::DateTime(dt)), Some(dt));
    }

    #[test]
    fn both_text_forms_match_the_structured_value() {
        let with_time = at(2024, 3, 1, 9, 15, 42);
        let rendered = with_time.format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(
            parse_cell_date(&CellValue::text(rendered)),
            parse_cell_date(&CellValue::DateTime(with_time))
        );

        let midnight = at(2024, 3, 1, 0, 0, 0);
        assert_eq!(
            parse_cell_date(&CellValue::text("2024-03-01")),
            Some(midnight)
        );
    }

    #[test]
    fn unparseable_cells_yield_none() {
        assert_eq!(parse_cell_date(&CellValue::text("not a date")), None);
        assert_eq!(parse_cell_date(&CellValue::text("01.03.2024")), None);
        assert_eq!(parse_cell_date(&CellValue::text("")), None);
        assert_eq!(parse_cell_date(&CellValue::text(" 2024-03-01")), None);
        assert_eq!(parse_cell_date(&CellValue::text("+2024-03-01")), None);
        assert_eq!(parse_cell_date(&CellValue::text("12024-03-01")), None);
        assert_eq!(parse_cell_date(&CellValue::text("2024-03-01 ")), None);
        assert_eq!(parse_cell_date(&CellValue::Empty), None);
        assert_eq!(parse_cell_date(&CellValue::Number(45352.0)), None);
        assert_eq!(parse_cell_date(&CellValue::Bool(true)), None);
    }

    #[test]
    fn cutoff_accepts_dotted_day_month_year() {
        let cutoff = parse_cutoff("01.01.2024").expect("valid cutoff");
        assert_eq!(cutoff.as_datetime(), at(2024, 1, 1, 0, 0, 0));
        assert_eq!(cutoff.to_string(), "01.01.2024");
    }

    #[test]
    fn cutoff_rejects_other_shapes() {
        for text in ["2024-01-01", "1.1.2024", "01.01.24", "31.02.2024", " 01.01.2024", ""] {
            assert_eq!(
                parse_cutoff(text),
                Err(RosterError::InvalidCutoff(text.to_string())),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn cutoff_comparison_is_strict() {
        let cutoff = parse_cutoff("01.03.2024").expect("valid cutoff");
        assert!(!cutoff.is_before(&at(2024, 3, 1, 0, 0, 0)));
        assert!(cutoff.is_before(&at(2024, 3, 1, 0, 0, 1)));
        assert!(!cutoff.is_before(&at(2024, 2, 29, 23, 59, 59)));
    }
}
