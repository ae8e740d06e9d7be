// ndmigrate - Navidrome library path migration

pub mod constants;
pub mod error;
pub mod config;
pub mod codec;
pub mod hash;
pub mod fs;
pub mod db;
pub mod migrate;

pub use config::{MigrationConfig, Operation, SeparatorRewrite, ValidationMode};
pub use error::{MigrateError, Result};
pub use migrate::{migrate_database, run_migration, MigrationReport};
