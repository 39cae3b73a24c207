use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The kind of external account a file's transactions belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Investment,
    Loan,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub account_name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    pub balance: BigDecimal,
    pub currency: String,
    pub is_active: bool,
    pub default_file_map_id: Option<Uuid>,
    pub last_transaction_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub account_name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    pub balance: BigDecimal,
    pub currency: String,
    pub default_file_map_id: Option<Uuid>,
}

impl Account {
    pub fn new(user_id: Uuid, input: CreateAccount) -> Self {
        let now = chrono::Utc::now();
        Self {
            account_id: Uuid::new_v4(),
            user_id,
            account_name: input.account_name,
            account_type: input.account_type,
            institution: input.institution,
            balance: input.balance,
            currency: input.currency,
            is_active: true,
            default_file_map_id: input.default_file_map_id,
            last_transaction_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}
