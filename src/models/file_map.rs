use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The normalized transaction attributes the rest of the system understands,
/// regardless of which source column or OFX/QIF tag they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Date,
    Description,
    Amount,
    DebitOrCredit,
    Currency,
    Memo,
    CheckNumber,
    Balance,
    TransactionType,
    Status,
    FitId,
}

/// A per-field cleanup rule applied before a mapped value is assigned to its
/// canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Trim,
    Case(CaseStyle),
    RegexCapture { pattern: String, group: usize },
    SignFlipIfDebit,
    Scale { factor: BigDecimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStyle {
    Upper,
    Lower,
}

/// One `sourceField -> canonicalField` rule plus its transforms, applied in
/// declared order; a later mapping targeting the same canonical field
/// overwrites whatever an earlier one produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub target: CanonicalField,
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileMap {
    pub file_map_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub mappings: sqlx::types::Json<Vec<FieldMapping>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileMap {
    pub name: String,
    pub mappings: Vec<FieldMapping>,
}

impl FileMap {
    pub fn new(user_id: Uuid, input: CreateFileMap) -> Self {
        Self {
            file_map_id: Uuid::new_v4(),
            user_id,
            name: input.name,
            mappings: sqlx::types::Json(input.mappings),
            created_at: chrono::Utc::now(),
        }
    }
}
