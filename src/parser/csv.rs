//! CSV extractor: a line-repair preprocessor (pure text transform) followed
//! by standards-compliant tokenization via the `csv` crate, same dependency
//! the teacher already reaches for in `services/csv_import_service.rs` and
//! `services/activity_import_service.rs`.

use csv::ReaderBuilder;

use crate::errors::AppError;
use crate::parser::RawRecord;

const MERGE_TARGET_HEADERS: [&str; 3] = ["description", "memo", "details"];

/// Strips trailing commas from every line, then — when a row has more
/// columns than the header row — merges the excess trailing columns into
/// the first header matching (case-insensitively) Description/Memo/Details,
/// re-joining the merged columns with `,` and re-quoting the result with
/// internal quotes doubled. Idempotent: running it twice on its own output
/// is a no-op (spec.md §8 invariant 7), since a repaired row's column count
/// never again exceeds the header's.
pub fn repair_csv_lines(text: &str) -> String {
    let mut lines = text.lines();
    let Some(header_line) = lines.next() else {
        return String::new();
    };
    let header_line = strip_trailing_comma(header_line);
    let headers = split_unquoted(&header_line);
    let header_count = headers.len();

    let merge_index = headers.iter().position(|h| {
        MERGE_TARGET_HEADERS.contains(&h.trim().to_ascii_lowercase().as_str())
    });

    let mut out = String::new();
    out.push_str(&header_line);
    out.push('\n');

    for line in lines {
        if line.trim().is_empty() {
            out.push('\n');
            continue;
        }
        let repaired = strip_trailing_comma(line);
        let fields = split_unquoted(&repaired);

        if fields.len() > header_count {
            if let Some(merge_at) = merge_index {
                let repaired_row = merge_excess_columns(&fields, merge_at, header_count);
                out.push_str(&repaired_row);
                out.push('\n');
                continue;
            }
        }
        out.push_str(&repaired);
        out.push('\n');
    }
    out
}

fn strip_trailing_comma(line: &str) -> String {
    let trimmed_end = line.trim_end_matches(['\r']);
    if let Some(stripped) = trimmed_end.strip_suffix(',') {
        stripped.to_string()
    } else {
        trimmed_end.to_string()
    }
}

/// Minimal split respecting double-quoted fields, just enough to count
/// columns and locate the merge target before handing off to the real CSV
/// reader for tokenization.
fn split_unquoted(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

fn merge_excess_columns(fields: &[String], merge_at: usize, header_count: usize) -> String {
    let excess = fields.len() - header_count + 1;
    let merge_start = merge_at;
    let merge_end = merge_start + excess;

    let merged_value = fields[merge_start..merge_end].join(",");
    let quoted = format!("\"{}\"", merged_value.replace('"', "\"\""));

    let mut out_fields: Vec<String> = Vec::with_capacity(header_count);
    out_fields.extend(fields[..merge_start].iter().cloned());
    out_fields.push(quoted);
    out_fields.extend(fields[merge_end..].iter().cloned());
    out_fields.join(",")
}

pub fn extract(text: &str) -> Result<Vec<RawRecord>, AppError> {
    let repaired = repair_csv_lines(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(repaired.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("failed to read CSV headers: {e}")))?
        .clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                return Err(AppError::DataQuality(format!("malformed CSV row: {e}")));
            }
        };
        let mut raw = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(value) = record.get(idx) {
                raw.insert(header.to_string(), value.to_string());
            }
        }
        records.push(raw);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repair_is_idempotent() {
        let csv = "date,description,amount\n2024-01-15,PURCHASE AT ACME, INC #42,-12.50\n";
        let once = repair_csv_lines(csv);
        let twice = repair_csv_lines(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn embedded_comma_merges_into_description() {
        // S1: one row with an extra unquoted comma inside the description.
        let csv = "date,description,amount\n2024-01-15,PURCHASE AT ACME, INC #42,-12.50\n";
        let records = extract(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("date").unwrap(), "2024-01-15");
        assert_eq!(
            records[0].get("description").unwrap(),
            "PURCHASE AT ACME, INC #42"
        );
        assert_eq!(records[0].get("amount").unwrap(), "-12.50");
    }

    #[test]
    fn strips_trailing_commas() {
        let csv = "date,description,amount\n2024-01-01,Coffee,-4.50,\n";
        let records = extract(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("amount").unwrap(), "-4.50");
    }

    #[test]
    fn quoted_field_with_comma_parses_without_merge() {
        let csv = "date,description,amount\n2024-01-01,\"Coffee, Tea\",-4.50\n";
        let records = extract(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("description").unwrap(), "Coffee, Tea");
    }

    #[test]
    fn empty_file_yields_no_transactions_error_upstream() {
        let records = extract("date,description,amount\n").unwrap();
        assert!(records.is_empty());
    }
}
