//! Utility modules for validation and in-memory collaborators

pub mod memory_source;
pub mod validation;

pub use memory_source::MemorySource;
pub use validation::validate_batch;
