//! Display formatting helpers.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Format an ISO timestamp or date string as DD/MM/YYYY.
/// Returns the input unchanged if it does not parse.
pub fn format_date(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    value.to_string()
}

/// Current time as the ISO-8601 string stored in the database.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Today's date as YYYY-MM-DD (local time), for due-date comparisons
/// and backup filenames.
pub fn today_ymd() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Today's date as DD/MM/YYYY, for printed slips.
pub fn today_display() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

/// Group digits in the Indian numbering style: 1,23,456.
pub fn format_indian_number(num: i64) -> String {
    let negative = num < 0;
    let digits = num.unsigned_abs().to_string();
    let mut result = String::new();

    if digits.len() <= 3 {
        result = digits;
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (h, t) = rest.split_at(rest.len() - 2);
            groups.push(t);
            rest = h;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        for g in groups.iter().rev() {
            result.push_str(g);
            result.push(',');
        }
        result.push_str(tail);
    }

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}
