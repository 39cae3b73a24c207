//! Date format & order inference (spec.md §4.3): a file-global choice that
//! avoids per-row ambiguity between D/M/Y and M/D/Y layouts.

use chrono::NaiveDate;

use crate::models::FileFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormatFamily {
    Csv,
    Ofx,
    Qif,
}

pub fn family_for(format: FileFormat) -> DateFormatFamily {
    match format {
        FileFormat::Csv => DateFormatFamily::Csv,
        FileFormat::Ofx | FileFormat::Qfx => DateFormatFamily::Ofx,
        FileFormat::Qif => DateFormatFamily::Qif,
    }
}

const ELIGIBILITY_THRESHOLD: f64 = 0.90;
const ORDER_THRESHOLD: f64 = 0.80;

fn candidates(family: DateFormatFamily) -> &'static [&'static str] {
    match family {
        DateFormatFamily::Ofx => &["%Y%m%d"],
        DateFormatFamily::Csv => &["%m/%d/%Y", "%d/%m/%Y", "%Y-%m-%d", "%m-%d-%Y"],
        DateFormatFamily::Qif => &["%m/%d/%Y", "%d/%m/%Y", "%m/%d/%y", "%d/%m/%y"],
    }
}

/// Tries every candidate in family order against every non-empty date
/// string; a candidate is eligible only if it parses >= 90%. The chosen
/// format is the eligible candidate with the highest success rate, ties
/// broken by earlier position in the candidate list.
pub fn determine_date_format(dates: &[&str], family: DateFormatFamily) -> Option<&'static str> {
    let non_empty: Vec<&str> = dates.iter().copied().filter(|d| !d.trim().is_empty()).collect();
    if non_empty.is_empty() {
        return None;
    }

    let mut best: Option<(&'static str, f64)> = None;
    for candidate in candidates(family) {
        let hits = non_empty
            .iter()
            .filter(|d| NaiveDate::parse_from_str(trim_time(d), candidate).is_ok())
            .count();
        let rate = hits as f64 / non_empty.len() as f64;
        if rate >= ELIGIBILITY_THRESHOLD {
            match best {
                Some((_, best_rate)) if rate <= best_rate => {}
                _ => best = Some((candidate, rate)),
            }
        }
    }
    best.map(|(fmt, _)| fmt)
}

/// OFX dates may carry an optional trailing time/timezone component
/// (`20240115120000[-5:EST]`); only the leading 8 digits matter for the
/// date portion when `%Y%m%d` is the candidate.
fn trim_time(raw: &str) -> &str {
    let digits_only: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits_only.len() >= 8 {
        &raw[0..8]
    } else {
        raw
    }
}

pub fn parse_with(date: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(trim_time(date), format).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
    Unknown,
}

/// `asc` if parsed timestamps are non-decreasing over >= 80% of adjacent
/// pairs, `desc` symmetrically, else `unknown` (callers treat this as `asc`
/// with a warning).
pub fn detect_order(dates: &[NaiveDate]) -> Order {
    if dates.len() < 2 {
        return Order::Asc;
    }
    let pairs = dates.len() - 1;
    let non_decreasing = dates.windows(2).filter(|w| w[1] >= w[0]).count();
    let non_increasing = dates.windows(2).filter(|w| w[1] <= w[0]).count();

    let asc_rate = non_decreasing as f64 / pairs as f64;
    let desc_rate = non_increasing as f64 / pairs as f64;

    if asc_rate >= ORDER_THRESHOLD && asc_rate >= desc_rate {
        Order::Asc
    } else if desc_rate >= ORDER_THRESHOLD {
        Order::Desc
    } else {
        Order::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unambiguous_mdy_dates_infer_mdy() {
        // S2: {01/02/2024, 01/15/2024, 02/20/2024} -> %m/%d/%Y (only one
        // that parses every date — 15 and 20 aren't valid months).
        let dates = ["01/02/2024", "01/15/2024", "02/20/2024"];
        let fmt = determine_date_format(&dates, DateFormatFamily::Csv).unwrap();
        assert_eq!(fmt, "%m/%d/%Y");
    }

    #[test]
    fn day_over_twelve_forces_dmy() {
        // S2: {01/02/2024, 13/02/2024} -> %d/%m/%Y (13 can't be a month).
        let dates = ["01/02/2024", "13/02/2024"];
        let fmt = determine_date_format(&dates, DateFormatFamily::Csv).unwrap();
        assert_eq!(fmt, "%d/%m/%Y");
    }

    #[test]
    fn no_eligible_candidate_returns_none() {
        let dates = ["not-a-date", "also-not"];
        assert!(determine_date_format(&dates, DateFormatFamily::Csv).is_none());
    }

    #[test]
    fn ofx_date_with_time_suffix_parses() {
        let dates = ["20240115120000[-5:EST]", "20240116090000"];
        let fmt = determine_date_format(&dates, DateFormatFamily::Ofx).unwrap();
        assert_eq!(fmt, "%Y%m%d");
    }

    #[test]
    fn ascending_order_detected() {
        let dates: Vec<NaiveDate> = ["2024-01-01", "2024-01-02", "2024-01-03"]
            .iter()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
            .collect();
        assert_eq!(detect_order(&dates), Order::Asc);
    }

    #[test]
    fn descending_order_detected() {
        let dates: Vec<NaiveDate> = ["2024-01-03", "2024-01-02", "2024-01-01"]
            .iter()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
            .collect();
        assert_eq!(detect_order(&dates), Order::Desc);
    }
}
