use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Suggested,
    Confirmed,
    Rejected,
}

/// One category assignment carried on a transaction; manual assignments are
/// never touched by the rule engine once set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAssignment {
    pub category_id: Uuid,
    pub confidence: f64,
    pub status: AssignmentStatus,
    pub is_manual: bool,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub confirmed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub rule_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub file_id: Uuid,
    pub account_id: Uuid,
    pub date: chrono::DateTime<chrono::Utc>,
    pub description: String,
    pub amount: BigDecimal,
    pub balance: BigDecimal,
    pub currency: String,
    pub import_order: i32,
    pub transaction_type: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub check_number: Option<String>,
    pub reference: Option<String>,
    pub status: Option<String>,
    pub debit_or_credit: Option<String>,
    pub primary_category_id: Option<Uuid>,
    #[sqlx(json)]
    pub categories: sqlx::types::Json<Vec<CategoryAssignment>>,
    pub dedup_hash: Vec<u8>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A transaction not yet assigned an id/import-order/balance; produced by
/// the builder (`parser::builder`) and consumed by the persistence layer.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub date: chrono::DateTime<chrono::Utc>,
    pub description: String,
    pub amount: BigDecimal,
    pub balance: BigDecimal,
    pub currency: String,
    pub import_order: i32,
    pub transaction_type: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub check_number: Option<String>,
    pub reference: Option<String>,
    pub status: Option<String>,
    pub debit_or_credit: Option<String>,
    pub dedup_hash: Vec<u8>,
}

impl Transaction {
    pub fn from_new(user_id: Uuid, file_id: Uuid, new: NewTransaction) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            user_id,
            file_id,
            account_id: new.account_id,
            date: new.date,
            description: new.description,
            amount: new.amount,
            balance: new.balance,
            currency: new.currency,
            import_order: new.import_order,
            transaction_type: new.transaction_type,
            payee: new.payee,
            memo: new.memo,
            check_number: new.check_number,
            reference: new.reference,
            status: new.status,
            debit_or_credit: new.debit_or_credit,
            primary_category_id: None,
            categories: sqlx::types::Json(Vec::new()),
            dedup_hash: new.dedup_hash,
            created_at: chrono::Utc::now(),
        }
    }
}
