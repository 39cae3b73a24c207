//! Field-mapping engine (spec.md §4.2): apply a user's field map to a raw
//! record, producing canonical fields, running each mapping's transforms
//! before assignment.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use regex::Regex;

use crate::errors::AppError;
use crate::models::{CanonicalField, CaseStyle, FieldMapping, FileMap, Transform};
use crate::parser::{CanonicalRecord, RawRecord};

fn canonical_key(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::Date => "date",
        CanonicalField::Description => "description",
        CanonicalField::Amount => "amount",
        CanonicalField::DebitOrCredit => "debitOrCredit",
        CanonicalField::Currency => "currency",
        CanonicalField::Memo => "memo",
        CanonicalField::CheckNumber => "checkNumber",
        CanonicalField::Balance => "balance",
        CanonicalField::TransactionType => "transactionType",
        CanonicalField::Status => "status",
        CanonicalField::FitId => "fitId",
    }
}

/// Applies every mapping in declared order; a later mapping targeting the
/// same canonical field overwrites the earlier result (last write wins).
pub fn apply_map(raw: &RawRecord, file_map: &FileMap) -> Result<CanonicalRecord, AppError> {
    let mut out = CanonicalRecord::new();

    for mapping in file_map.mappings.0.iter() {
        let Some(source_value) = find_source_value(raw, &mapping.source) else {
            continue;
        };
        let transformed = apply_transforms(&source_value, mapping)?;
        out.insert(canonical_key(mapping.target).to_string(), transformed);
    }

    normalize_amount_sign(&mut out);
    Ok(out)
}

fn find_source_value(raw: &RawRecord, source: &str) -> Option<String> {
    raw.get(source).cloned().or_else(|| {
        raw.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(source))
            .map(|(_, v)| v.clone())
    })
}

fn apply_transforms(value: &str, mapping: &FieldMapping) -> Result<String, AppError> {
    let mut current = value.to_string();
    for transform in &mapping.transforms {
        current = match transform {
            Transform::Trim => current.trim().to_string(),
            Transform::Case(CaseStyle::Upper) => current.to_uppercase(),
            Transform::Case(CaseStyle::Lower) => current.to_lowercase(),
            Transform::RegexCapture { pattern, group } => {
                let re = Regex::new(pattern).map_err(|e| {
                    AppError::Validation(format!(
                        "invalid regex_capture pattern for mapping {}: {e}",
                        mapping.source
                    ))
                })?;
                re.captures(&current)
                    .and_then(|caps| caps.get(*group))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            }
            Transform::SignFlipIfDebit => current, // applied post-map in normalize_amount_sign
            Transform::Scale { factor } => {
                let parsed = parse_amount_str(&current).map_err(|_| {
                    AppError::Validation(format!(
                        "scale transform on non-numeric value for mapping {}",
                        mapping.source
                    ))
                })?;
                (parsed * factor).to_string()
            }
        };
    }
    Ok(current)
}

/// If both `amount` and `debitOrCredit` are present, forces the sign of
/// `amount` from `debitOrCredit` (DBIT -> negative, else positive);
/// otherwise the parsed sign from the source is preserved untouched.
fn normalize_amount_sign(record: &mut CanonicalRecord) {
    let Some(debit_or_credit) = record.get("debitOrCredit").cloned() else {
        return;
    };
    let Some(amount) = record.get("amount").cloned() else {
        return;
    };
    let Ok(magnitude) = parse_amount_str(&amount).map(|v| v.abs()) else {
        return;
    };
    let is_debit = debit_or_credit.eq_ignore_ascii_case("DBIT")
        || debit_or_credit.eq_ignore_ascii_case("debit");
    let signed = if is_debit { -magnitude } else { magnitude };
    record.insert("amount".to_string(), signed.to_string());
}

/// Parses an amount string tolerating parenthesized negatives, for
/// sign/scale bookkeeping during mapping. Stays on `BigDecimal` throughout;
/// the builder binds the same canonical string to a `BigDecimal` again for
/// storage, so amounts never round-trip through binary floating point.
pub fn parse_amount_str(raw: &str) -> Result<BigDecimal, bigdecimal::ParseBigDecimalError> {
    let trimmed = raw.trim();
    let negative_paren = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .trim_matches(['(', ')'])
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = BigDecimal::from_str(&cleaned)?;
    Ok(if negative_paren { -value.abs() } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateFileMap;
    use std::collections::HashMap;

    fn file_map(mappings: Vec<FieldMapping>) -> FileMap {
        FileMap::new(
            uuid::Uuid::new_v4(),
            CreateFileMap {
                name: "test".into(),
                mappings,
            },
        )
    }

    #[test]
    fn later_mapping_overwrites_earlier_for_same_target() {
        let mut raw = HashMap::new();
        raw.insert("Details".to_string(), "first".to_string());
        raw.insert("Memo".to_string(), "second".to_string());
        let fm = file_map(vec![
            FieldMapping {
                source: "Details".into(),
                target: CanonicalField::Description,
                transforms: vec![],
            },
            FieldMapping {
                source: "Memo".into(),
                target: CanonicalField::Description,
                transforms: vec![],
            },
        ]);
        let out = apply_map(&raw, &fm).unwrap();
        assert_eq!(out.get("description").unwrap(), "second");
    }

    #[test]
    fn debit_forces_negative_amount() {
        let mut raw = HashMap::new();
        raw.insert("Amount".to_string(), "42.00".to_string());
        raw.insert("Type".to_string(), "DBIT".to_string());
        let fm = file_map(vec![
            FieldMapping {
                source: "Amount".into(),
                target: CanonicalField::Amount,
                transforms: vec![],
            },
            FieldMapping {
                source: "Type".into(),
                target: CanonicalField::DebitOrCredit,
                transforms: vec![],
            },
        ]);
        let out = apply_map(&raw, &fm).unwrap();
        assert_eq!(out.get("amount").unwrap(), "-42.00");
    }

    #[test]
    fn unknown_regex_pattern_fails_map_error() {
        let mut raw = HashMap::new();
        raw.insert("Desc".to_string(), "abc".to_string());
        let fm = file_map(vec![FieldMapping {
            source: "Desc".into(),
            target: CanonicalField::Description,
            transforms: vec![Transform::RegexCapture {
                pattern: "(".into(),
                group: 0,
            }],
        }]);
        let err = apply_map(&raw, &fm).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
