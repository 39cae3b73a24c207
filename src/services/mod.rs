pub mod account_service;
pub mod category_service;
pub mod file_map_service;
pub mod file_processor_service;
pub mod file_service;
pub mod transaction_service;
