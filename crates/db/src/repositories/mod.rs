//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_log_repo;
pub mod character_repo;
pub mod character_snapshot_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use character_repo::CharacterRepo;
pub use character_snapshot_repo::CharacterSnapshotRepo;
