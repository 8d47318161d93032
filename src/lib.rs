pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{ContentStore, Operation, Plan, Runner};
pub use crate::error::BlogError;
pub use crate::models::{Config, Post};
