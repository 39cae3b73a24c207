mod account;
mod category;
mod event;
mod file;
mod file_map;
mod transaction;
mod user_settings;

pub use account::{Account, AccountType, CreateAccount};
pub use category::{
    Category, CategoryRule, CategoryType, CreateCategory, RuleCondition, RuleField,
    RuleInheritanceMode,
};
pub use event::{Event, EventRecord, EventType};
pub use file::{
    CreateTransactionFile, FileFormat, FileProcessingReport, ProcessingStatus, TransactionFile,
};
pub use file_map::{CanonicalField, CaseStyle, CreateFileMap, FieldMapping, FileMap, Transform};
pub use transaction::{AssignmentStatus, CategoryAssignment, NewTransaction, Transaction};
pub use user_settings::SuggestionStrategyConfig;
