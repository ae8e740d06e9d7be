// ndmigrate Error Types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The database '{0}' does not exist")]
    DatabaseNotFound(PathBuf),

    #[error(
        "The prefix {prefix} does not match all of the songs in your library ({matched} vs {total}).\n\
         Please make sure you are using the correct path.\n\
         Based off of your database, the shortest path that matches all of your files is {common_prefix}"
    )]
    PrefixMismatch {
        prefix: String,
        matched: i64,
        total: i64,
        common_prefix: String,
    },

    #[error(
        "The prefix {prefix} matches every song in your library ({total}). \
         Drop the partial flag to migrate the whole library."
    )]
    PartialMismatch { prefix: String, total: i64 },

    #[error("Could not find a file at '{0}'. Please make sure the new path is correct")]
    DestinationNotFound(String),

    #[error("Conflicting options: {0}")]
    ConfigConflict(String),

    #[error("Failed to move '{}' to '{}': {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration would leave {0} dangling references behind")]
    IntegrityViolation(i64),

    #[error("Dry run rollback did not restore the database to its original state")]
    RollbackIncomplete,
}

pub type Result<T> = std::result::Result<T, MigrateError>;
