pub mod config;
pub mod types;

pub use config::{Config, DeployConfig, DeployTarget};
pub use types::{FrontMatter, Post, PostFileName, PostKind};
