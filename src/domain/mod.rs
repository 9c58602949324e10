//! Domain logic - pure versioning rules independent of any VCS backend

pub mod branch;
pub mod level;
pub mod tag;
pub mod version;

pub use branch::{BranchTable, ReleaseChannel};
pub use level::LevelBump;
pub use tag::TagFormat;
pub use version::{Prerelease, Version, DEFAULT_PRERELEASE_TOKEN, DEFAULT_TAG_FORMAT};
