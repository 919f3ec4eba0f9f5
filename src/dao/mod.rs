/// Repository over the community backend and its implementations.
pub mod community_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
