//! Parsing pipeline: bytes in, ordered `Transaction`s out.
//!
//! Orchestrator steps, uniform across formats (spec.md §4.1):
//! 1. extract raw records (format-specific)
//! 2. apply the field map
//! 3. infer date format and order collectively
//! 4. build transactions (ordering, dedup hash, running balance)

pub mod builder;
pub mod csv;
pub mod date_format;
pub mod field_map;
pub mod ofx;
pub mod qif;

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{FileFormat, FileMap, NewTransaction};

/// A single source record as extracted, before field mapping: canonical
/// source field names (CSV header, or OFX/QIF tag) mapped to string values.
pub type RawRecord = HashMap<String, String>;

/// A record after the field map has been applied: canonical field name ->
/// string value, still unparsed (dates/amounts are parsed in the builder
/// once the file-wide date format has been inferred).
pub type CanonicalRecord = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct FileInput {
    pub format: FileFormat,
    pub bytes: Vec<u8>,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub opening_balance: Option<BigDecimal>,
    pub currency: String,
    pub ignore_dup: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<NewTransaction>,
    pub skipped_rows: usize,
    pub duplicate_count: usize,
    pub warnings: Vec<String>,
    pub opening_balance: Option<BigDecimal>,
}

/// Runs the full four-step pipeline described in spec.md §4.1 and returns
/// transactions ready for persistence, plus row-level accumulators rather
/// than exceptions-for-control-flow (spec.md §9).
pub fn parse(input: &FileInput, file_map: &FileMap) -> Result<ParseOutcome, AppError> {
    let text = decode(&input.bytes)?;

    let raw_records = match input.format {
        FileFormat::Csv => csv::extract(&text)?,
        FileFormat::Ofx | FileFormat::Qfx => ofx::extract(&text)?,
        FileFormat::Qif => qif::extract(&text)?,
    };

    if raw_records.is_empty() {
        return Err(AppError::DataQuality(
            "no records could be extracted from file".to_string(),
        ));
    }

    let mut canonical_records = Vec::with_capacity(raw_records.len());
    let mut skipped_rows = 0usize;
    let mut warnings = Vec::new();

    for raw in raw_records {
        match field_map::apply_map(&raw, file_map) {
            Ok(record) => {
                if !record.contains_key("date") || !record.contains_key("amount") {
                    skipped_rows += 1;
                    continue;
                }
                canonical_records.push(record);
            }
            Err(AppError::Validation(msg)) => return Err(AppError::Validation(msg)),
            Err(other) => {
                skipped_rows += 1;
                warnings.push(other.to_string());
            }
        }
    }

    if canonical_records.is_empty() {
        return Err(AppError::DataQuality(
            "every row was skipped; no transactions to ingest".to_string(),
        ));
    }

    let family = date_format::family_for(input.format);
    let date_strings: Vec<&str> = canonical_records
        .iter()
        .map(|r| r.get("date").map(String::as_str).unwrap_or(""))
        .collect();

    let date_format = date_format::determine_date_format(&date_strings, family)
        .ok_or_else(|| AppError::DataQuality("could not determine date format".to_string()))?;

    let parsed_dates: Vec<chrono::NaiveDate> = date_strings
        .iter()
        .filter_map(|s| date_format::parse_with(s, date_format))
        .collect();
    let order = date_format::detect_order(&parsed_dates);
    if order == date_format::Order::Unknown {
        warnings.push("could not confidently detect file order; assuming ascending".to_string());
    }

    let built = builder::build(
        &canonical_records,
        date_format,
        order,
        input.account_id,
        input.opening_balance.clone(),
        &input.currency,
    )?;

    Ok(ParseOutcome {
        transactions: built.transactions,
        skipped_rows,
        duplicate_count: built.duplicate_count,
        warnings: [warnings, built.warnings].concat(),
        opening_balance: built.opening_balance,
    })
}

fn decode(bytes: &[u8]) -> Result<String, AppError> {
    let stripped = bytes
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(bytes);
    String::from_utf8(stripped.to_vec())
        .map_err(|e| AppError::Validation(format!("file is not valid UTF-8: {e}")))
}
