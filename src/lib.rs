pub mod analyzer;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod parser;
pub mod ui;
pub mod vcs;

pub use analyzer::{next_version, BumpPolicy, VersionAnalyzer};
pub use domain::{LevelBump, Version};
pub use error::{Result, SemrelError};
