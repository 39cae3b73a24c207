pub mod account_queries;
pub mod analytics_queries;
pub mod category_queries;
pub mod event_queries;
pub mod file_map_queries;
pub mod file_queries;
pub mod transaction_queries;
pub mod user_settings_queries;
