//! Transaction builder (spec.md §4.4): assigns `importOrder`, reconstructs
//! running balance, computes the dedup hash, and applies within-file
//! deduplication.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::errors::AppError;
use crate::parser::date_format::{self, Order};
use crate::parser::CanonicalRecord;
use crate::models::NewTransaction;

#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub transactions: Vec<NewTransaction>,
    pub duplicate_count: usize,
    pub warnings: Vec<String>,
    pub opening_balance: Option<BigDecimal>,
}

pub fn build(
    records: &[CanonicalRecord],
    date_format: &str,
    order: Order,
    account_id: Uuid,
    caller_opening_balance: Option<BigDecimal>,
    default_currency: &str,
) -> Result<BuildOutcome, AppError> {
    // importOrder=1 is always the earliest transaction chronologically, so
    // a descending file is reversed before assigning positions.
    let ordered: Vec<&CanonicalRecord> = if order == Order::Desc {
        records.iter().rev().collect()
    } else {
        records.iter().collect()
    };

    let has_balance_column = ordered.iter().any(|r| r.contains_key("balance"));

    let mut transactions = Vec::with_capacity(ordered.len());
    let mut warnings = Vec::new();
    let mut seen_hashes: std::collections::HashSet<Vec<u8>> = std::collections::HashSet::new();
    let mut duplicate_count = 0usize;

    let mut running_balance: Option<BigDecimal> = caller_opening_balance.clone();
    let mut derived_opening_balance: Option<BigDecimal> = None;

    for (idx, record) in ordered.iter().enumerate() {
        let import_order = (idx + 1) as i32;

        let date_str = record.get("date").cloned().unwrap_or_default();
        let date = date_format::parse_with(&date_str, date_format).ok_or_else(|| {
            AppError::DataQuality(format!("unparseable date '{date_str}' at row {import_order}"))
        })?;
        let date = date
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();

        let amount_str = record.get("amount").cloned().unwrap_or_default();
        let amount = parse_decimal(&amount_str).map_err(|_| {
            AppError::DataQuality(format!("unparseable amount '{amount_str}' at row {import_order}"))
        })?;

        let balance = if let Some(balance_str) = record.get("balance") {
            let supplied = parse_decimal(balance_str).map_err(|_| {
                AppError::DataQuality(format!(
                    "unparseable balance '{balance_str}' at row {import_order}"
                ))
            })?;
            if idx == 0 {
                let implied_opening = &supplied - &amount;
                if let Some(caller_opening) = &caller_opening_balance {
                    if caller_opening != &implied_opening {
                        warnings.push(format!(
                            "opening balance mismatch: file balance column implies {implied_opening}, caller supplied {caller_opening}; using the column"
                        ));
                    }
                }
                derived_opening_balance = Some(implied_opening);
            }
            supplied
        } else {
            let prev = running_balance.clone().unwrap_or_else(|| BigDecimal::from(0));
            &prev + &amount
        };
        running_balance = Some(balance.clone());

        let description = record.get("description").cloned().unwrap_or_default();
        let currency = record
            .get("currency")
            .cloned()
            .unwrap_or_else(|| default_currency.to_string());
        let check_number = record.get("checkNumber").cloned();
        let fit_id = record.get("fitId").cloned();

        let dedup_hash = compute_dedup_hash(
            &date,
            &amount,
            &description,
            account_id,
            check_number.as_deref(),
            fit_id.as_deref(),
        );

        if !seen_hashes.insert(dedup_hash.clone()) {
            duplicate_count += 1;
            continue;
        }

        transactions.push(NewTransaction {
            account_id,
            date,
            description,
            amount,
            balance,
            currency,
            import_order,
            transaction_type: record.get("transactionType").cloned(),
            payee: None,
            memo: record.get("memo").cloned(),
            check_number,
            reference: fit_id,
            status: record.get("status").cloned(),
            debit_or_credit: record.get("debitOrCredit").cloned(),
            dedup_hash,
        });
    }

    Ok(BuildOutcome {
        transactions,
        duplicate_count,
        warnings,
        opening_balance: if has_balance_column {
            derived_opening_balance
        } else {
            caller_opening_balance
        },
    })
}

fn parse_decimal(raw: &str) -> Result<BigDecimal, AppError> {
    let negative_paren = raw.trim().starts_with('(') && raw.trim().ends_with(')');
    let cleaned: String = raw
        .trim()
        .trim_matches(['(', ')'])
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = BigDecimal::from_str(&cleaned)
        .map_err(|e| AppError::DataQuality(format!("invalid decimal '{raw}': {e}")))?;
    Ok(if negative_paren { -value } else { value })
}

/// Stable fingerprint over the tuple `(date, amount, description_normalized,
/// accountId, checkNumber?, fitId?)`; `description_normalized` is lowercased,
/// NFKC-normalized, and stripped down to `[a-z0-9]` (spec.md §9).
pub fn compute_dedup_hash(
    date: &chrono::DateTime<chrono::Utc>,
    amount: &BigDecimal,
    description: &str,
    account_id: Uuid,
    check_number: Option<&str>,
    fit_id: Option<&str>,
) -> Vec<u8> {
    let normalized_description = normalize_description(description);

    let mut hasher = Sha256::new();
    hasher.update(date.timestamp().to_be_bytes());
    hasher.update(amount.to_string().as_bytes());
    hasher.update(normalized_description.as_bytes());
    hasher.update(account_id.as_bytes());
    if let Some(cn) = check_number {
        hasher.update(cn.as_bytes());
    }
    if let Some(fid) = fit_id {
        hasher.update(fid.as_bytes());
    }
    hasher.finalize().to_vec()
}

fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .nfkc()
        .collect::<String>()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn record(date: &str, amount: &str, description: &str) -> CanonicalRecord {
        let mut m = HashMap::new();
        m.insert("date".to_string(), date.to_string());
        m.insert("amount".to_string(), amount.to_string());
        m.insert("description".to_string(), description.to_string());
        m
    }

    #[test]
    fn import_order_and_running_balance_ascending() {
        let records = vec![
            record("2024-01-01", "30", "deposit"),
            record("2024-01-02", "-20", "withdrawal"),
            record("2024-01-03", "10", "deposit"),
        ];
        let out = build(
            &records,
            "%Y-%m-%d",
            Order::Asc,
            Uuid::new_v4(),
            Some(BigDecimal::from(90)),
            "USD",
        )
        .unwrap();

        assert_eq!(out.transactions.len(), 3);
        assert_eq!(out.transactions[0].import_order, 1);
        assert_eq!(out.transactions[0].balance, BigDecimal::from(120));
        assert_eq!(out.transactions[1].balance, BigDecimal::from(100));
        assert_eq!(out.transactions[2].balance, BigDecimal::from(110));
    }

    #[test]
    fn descending_file_with_balances_reverses_and_infers_opening() {
        // S3 from spec.md §8.
        let mut r1 = record("2024-01-03", "10", "a");
        r1.insert("balance".to_string(), "110".to_string());
        let mut r2 = record("2024-01-02", "-20", "b");
        r2.insert("balance".to_string(), "100".to_string());
        let mut r3 = record("2024-01-01", "30", "c");
        r3.insert("balance".to_string(), "120".to_string());

        let records = vec![r1, r2, r3];
        let out = build(&records, "%Y-%m-%d", Order::Desc, Uuid::new_v4(), None, "USD").unwrap();

        assert_eq!(out.transactions[0].import_order, 1);
        assert_eq!(out.transactions[0].balance, BigDecimal::from(120));
        assert_eq!(out.transactions[1].balance, BigDecimal::from(100));
        assert_eq!(out.transactions[2].balance, BigDecimal::from(110));
        assert_eq!(out.opening_balance, Some(BigDecimal::from(90)));
    }

    #[test]
    fn duplicate_rows_within_file_are_counted_and_dropped() {
        let records = vec![
            record("2024-01-01", "-12.50", "Coffee"),
            record("2024-01-01", "-12.50", "Coffee"),
        ];
        let out = build(&records, "%Y-%m-%d", Order::Asc, Uuid::new_v4(), None, "USD").unwrap();
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.duplicate_count, 1);
    }

    #[test]
    fn dedup_hash_ignores_case_and_punctuation_in_description() {
        let account_id = Uuid::new_v4();
        let date = chrono::NaiveDate::parse_from_str("2024-01-01", "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let amount = BigDecimal::from(-5);
        let h1 = compute_dedup_hash(&date, &amount, "Acme, Inc.", account_id, None, None);
        let h2 = compute_dedup_hash(&date, &amount, "ACME INC", account_id, None, None);
        assert_eq!(h1, h2);
    }
}
