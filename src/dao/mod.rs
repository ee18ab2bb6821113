/// Database model definitions.
pub mod models;
/// Competition state persistence and change notification.
pub mod state_store;
/// Storage abstraction layer for database operations.
pub mod storage;
