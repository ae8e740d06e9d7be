// Migration configuration
// Built once from the command line, validated, then passed by reference into the engine.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// What kind of run this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Files were already moved; rewrite the database to follow them
    Migrate,
    /// Move the files first, then rewrite the database
    Move,
    /// Swap stored paths without touching disk
    ChangeLink,
    /// Rewrite media file ids and the last-scan marker only
    Relink,
}

impl Operation {
    pub fn default_validation(self) -> ValidationMode {
        match self {
            Operation::Migrate | Operation::Move => ValidationMode::Full,
            Operation::ChangeLink | Operation::Relink => ValidationMode::None,
        }
    }

    /// Whether dependents, albums and playlists follow the media file rewrite
    pub fn cascades(self) -> bool {
        !matches!(self, Operation::Relink)
    }
}

/// How thoroughly to check the destination before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Check every file that will be rewritten
    Full,
    /// Check a single file
    Short,
    /// Skip the prefix and destination checks entirely
    None,
}

/// Optional path separator rewrite applied to every rewritten value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorRewrite {
    #[default]
    Keep,
    /// `\` becomes `/`
    ToForwardSlash,
    /// `/` becomes `\`
    ToBackslash,
}

impl SeparatorRewrite {
    pub fn from_flags(to_forward_slash: bool, to_backslash: bool) -> Result<Self> {
        match (to_forward_slash, to_backslash) {
            (true, true) => Err(MigrateError::ConfigConflict(
                "separators cannot be rewritten in both directions at once".to_string(),
            )),
            (true, false) => Ok(SeparatorRewrite::ToForwardSlash),
            (false, true) => Ok(SeparatorRewrite::ToBackslash),
            (false, false) => Ok(SeparatorRewrite::Keep),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub db_path: PathBuf,
    pub operation: Operation,
    pub old_prefix: String,
    pub new_prefix: String,
    pub validation: ValidationMode,
    pub partial: bool,
    pub dry_run: bool,
    pub separators: SeparatorRewrite,
}

impl MigrationConfig {
    pub fn new(
        db_path: impl Into<PathBuf>,
        operation: Operation,
        old_prefix: impl Into<String>,
        new_prefix: impl Into<String>,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            operation,
            old_prefix: old_prefix.into(),
            new_prefix: new_prefix.into(),
            validation: operation.default_validation(),
            partial: false,
            dry_run: false,
            separators: SeparatorRewrite::Keep,
        }
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_separators(mut self, separators: SeparatorRewrite) -> Self {
        self.separators = separators;
        self
    }

    /// Reject option combinations that cannot mean anything.
    pub fn validate(&self) -> Result<()> {
        if self.old_prefix.is_empty() {
            return Err(MigrateError::ConfigConflict(
                "the old path must not be empty".to_string(),
            ));
        }

        if self.new_prefix.is_empty() {
            return Err(MigrateError::ConfigConflict(
                "the new path must not be empty".to_string(),
            ));
        }

        if self.old_prefix == self.new_prefix && self.separators == SeparatorRewrite::Keep {
            return Err(MigrateError::ConfigConflict(format!(
                "old and new path are both '{}', nothing would change",
                self.old_prefix
            )));
        }

        if self.operation == Operation::Relink {
            if self.validation != ValidationMode::None {
                return Err(MigrateError::ConfigConflict(
                    "relink never validates; use change-link to validate first".to_string(),
                ));
            }
            if self.partial {
                return Err(MigrateError::ConfigConflict(
                    "relink does not check prefix coverage, so partial has no effect".to_string(),
                ));
            }
        }

        if self.partial && self.validation == ValidationMode::None {
            return Err(MigrateError::ConfigConflict(
                "partial only applies when the prefix is validated".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(operation: Operation) -> MigrationConfig {
        MigrationConfig::new("navidrome.db", operation, "/old", "/new")
    }

    #[test]
    fn test_default_validation_per_operation() {
        assert_eq!(config(Operation::Migrate).validation, ValidationMode::Full);
        assert_eq!(config(Operation::Move).validation, ValidationMode::Full);
        assert_eq!(config(Operation::ChangeLink).validation, ValidationMode::None);
        assert_eq!(config(Operation::Relink).validation, ValidationMode::None);
    }

    #[test]
    fn test_both_separator_directions_conflict() {
        let err = SeparatorRewrite::from_flags(true, true).unwrap_err();
        assert!(matches!(err, MigrateError::ConfigConflict(_)));
        assert_eq!(SeparatorRewrite::from_flags(true, false).unwrap(), SeparatorRewrite::ToForwardSlash);
        assert_eq!(SeparatorRewrite::from_flags(false, true).unwrap(), SeparatorRewrite::ToBackslash);
        assert_eq!(SeparatorRewrite::from_flags(false, false).unwrap(), SeparatorRewrite::Keep);
    }

    #[test]
    fn test_validate_rejects_empty_and_identical_prefixes() {
        let empty = MigrationConfig::new("db", Operation::Migrate, "", "/new");
        assert!(matches!(empty.validate(), Err(MigrateError::ConfigConflict(_))));

        let same = MigrationConfig::new("db", Operation::Migrate, "/music", "/music");
        assert!(matches!(same.validate(), Err(MigrateError::ConfigConflict(_))));

        // Same prefix is fine when only the separators change
        let slashes = MigrationConfig::new("db", Operation::ChangeLink, "C:\\Music", "C:\\Music")
            .with_separators(SeparatorRewrite::ToForwardSlash);
        assert!(slashes.validate().is_ok());
    }

    #[test]
    fn test_validate_relink_restrictions() {
        assert!(config(Operation::Relink).validate().is_ok());

        let validated = config(Operation::Relink).with_validation(ValidationMode::Short);
        assert!(matches!(validated.validate(), Err(MigrateError::ConfigConflict(_))));
    }

    #[test]
    fn test_validate_partial_needs_validation() {
        let partial = config(Operation::Migrate).with_partial(true);
        assert!(partial.validate().is_ok());

        let unchecked = config(Operation::ChangeLink).with_partial(true);
        assert!(matches!(unchecked.validate(), Err(MigrateError::ConfigConflict(_))));
    }
}
