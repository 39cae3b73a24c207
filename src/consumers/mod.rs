//! Event consumers (spec.md §4.8). Each is idempotent against redelivery by
//! construction — rerunning `handle` with the same event never double-writes.

pub mod analytics_consumer;
pub mod audit_consumer;
pub mod categorization_consumer;

pub use analytics_consumer::AnalyticsConsumer;
pub use audit_consumer::AuditConsumer;
pub use categorization_consumer::CategorizationConsumer;
