//! QIF extractor (spec.md §4.1): line-oriented, accumulates `D/T/P/M/N/C/L`
//! fields until a line containing only `^`, which flushes a record.

use crate::errors::AppError;
use crate::parser::RawRecord;

fn qif_key(code: char) -> Option<&'static str> {
    match code {
        'D' => Some("D"),
        'T' => Some("T"),
        'P' => Some("P"),
        'M' => Some("M"),
        'N' => Some("N"),
        'C' => Some("C"),
        'L' => Some("L"),
        _ => None,
    }
}

pub fn extract(text: &str) -> Result<Vec<RawRecord>, AppError> {
    let mut records = Vec::new();
    let mut current = RawRecord::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim() == "^" {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('!') || line.is_empty() {
            continue; // account/type headers (!Type:Bank, etc.)
        }
        let mut chars = line.chars();
        let Some(code) = chars.next() else { continue };
        let value = chars.as_str();
        if let Some(key) = qif_key(code) {
            current.insert(key.to_string(), value.to_string());
        }
    }
    if !current.is_empty() {
        records.push(current);
    }

    if records.is_empty() {
        return Err(AppError::DataQuality(
            "QIF file contains no transaction records".to_string(),
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_records_between_carets() {
        let qif = "!Type:Bank\nD01/15/2024\nT-12.50\nPACME STORE\nMExpense\n^\nD01/16/2024\nT100.00\nPPAYROLL\n^\n";
        let records = extract(qif).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("D").unwrap(), "01/15/2024");
        assert_eq!(records[0].get("T").unwrap(), "-12.50");
        assert_eq!(records[0].get("P").unwrap(), "ACME STORE");
        assert_eq!(records[1].get("P").unwrap(), "PAYROLL");
    }

    #[test]
    fn trailing_record_without_final_caret_is_not_flushed_twice() {
        let qif = "D01/15/2024\nT-1.00\nP A\n^\nD01/16/2024\nT-2.00\nPB\n";
        let records = extract(qif).unwrap();
        assert_eq!(records.len(), 2);
    }
}
