use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleInheritanceMode {
    Additive,
    Override,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Description,
    Payee,
    Memo,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
    Regex,
    AmountGreater,
    AmountLess,
    AmountBetween,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub rule_id: Uuid,
    pub field_to_match: RuleField,
    pub condition: RuleCondition,
    pub value: String,
    pub case_sensitive: bool,
    pub priority: i32,
    pub enabled: bool,
    pub confidence: f64,
    pub amount_min: Option<BigDecimal>,
    pub amount_max: Option<BigDecimal>,
    pub allow_multiple_matches: bool,
    pub auto_suggest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category_type: CategoryType,
    pub parent_category_id: Option<Uuid>,
    pub inherit_parent_rules: bool,
    pub rule_inheritance_mode: RuleInheritanceMode,
    #[sqlx(json)]
    pub rules: sqlx::types::Json<Vec<CategoryRule>>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub category_type: CategoryType,
    pub parent_category_id: Option<Uuid>,
    pub inherit_parent_rules: bool,
    pub rule_inheritance_mode: RuleInheritanceMode,
    pub rules: Vec<CategoryRule>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl Category {
    pub fn new(user_id: Uuid, input: CreateCategory) -> Self {
        let now = chrono::Utc::now();
        Self {
            category_id: Uuid::new_v4(),
            user_id,
            name: input.name,
            category_type: input.category_type,
            parent_category_id: input.parent_category_id,
            inherit_parent_rules: input.inherit_parent_rules,
            rule_inheritance_mode: input.rule_inheritance_mode,
            rules: sqlx::types::Json(input.rules),
            icon: input.icon,
            color: input.color,
            created_at: now,
            updated_at: now,
        }
    }
}
