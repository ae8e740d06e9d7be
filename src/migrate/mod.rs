// Migration engine
// One exclusive transaction per run: validate, move (optional), sample the destination,
// cascade the rewrite, then commit, or roll back on error and always in dry-run mode.

pub mod cascade;
pub mod sample;
pub mod validate;


use std::path::{Path, PathBuf};

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::codec::PathRewrite;
use crate::config::{MigrationConfig, Operation, ValidationMode};
use crate::constants::{DRY_RUN_SUCCESS_MESSAGE, DRY_RUN_TAG, SUCCESS_MESSAGE};
use crate::db::{self, schema};
use crate::error::{MigrateError, Result};
use crate::fs::{resolve_move_destination, Filesystem, LocalFs};

/// What a run changed (or, in dry-run mode, would have changed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub operation: Operation,
    pub dry_run: bool,
    pub old_prefix: String,
    pub new_prefix: String,
    pub moved_to: Option<PathBuf>,
    pub files_checked: usize,
    pub media_files: usize,
    pub annotations: usize,
    pub media_file_genres: usize,
    pub playlist_tracks: usize,
    pub scrobble_buffer: usize,
    pub albums: usize,
    pub playlists: usize,
    pub smart_playlists: usize,
    pub properties: usize,
}

impl MigrationReport {
    pub fn new(operation: Operation, old_prefix: &str, new_prefix: &str, dry_run: bool) -> Self {
        Self {
            operation,
            dry_run,
            old_prefix: old_prefix.to_string(),
            new_prefix: new_prefix.to_string(),
            moved_to: None,
            files_checked: 0,
            media_files: 0,
            annotations: 0,
            media_file_genres: 0,
            playlist_tracks: 0,
            scrobble_buffer: 0,
            albums: 0,
            playlists: 0,
            smart_playlists: 0,
            properties: 0,
        }
    }

    pub fn status_line(&self) -> &'static str {
        if self.dry_run {
            DRY_RUN_SUCCESS_MESSAGE
        } else {
            SUCCESS_MESSAGE
        }
    }
}

/// Open the configured database and run the migration against the local disk.
pub fn migrate_database(config: &MigrationConfig) -> Result<MigrationReport> {
    config.validate()?;
    let mut conn = db::open_db(&config.db_path)?;
    run_migration(&mut conn, config, &LocalFs)
}

/// Run one migration inside a single transaction.
///
/// The database is left either exactly as it was or fully migrated. If the
/// files were moved and the database step then fails, the move is undone.
pub fn run_migration(conn: &mut Connection, config: &MigrationConfig, fs: &dyn Filesystem) -> Result<MigrationReport> {
    config.validate()?;

    let destination = match config.operation {
        Operation::Move => {
            let requested = Path::new(&config.new_prefix);
            let target = resolve_move_destination(fs, Path::new(&config.old_prefix), requested);
            if target != requested {
                log::info!("Moving to a directory. Full path is {}", target.display());
            }
            Some(target)
        }
        _ => None,
    };
    let new_prefix = match &destination {
        Some(target) => match_trailing_separator(&config.old_prefix, &target.to_string_lossy()),
        None => config.new_prefix.clone(),
    };

    let rewrite = PathRewrite::new(config.old_prefix.clone(), new_prefix.clone(), config.separators);
    let mut report = MigrationReport::new(config.operation, &config.old_prefix, &new_prefix, config.dry_run);

    log::info!(
        "{}{:?}: {} -> {}",
        if config.dry_run { "[Dry Run] " } else { "" },
        config.operation,
        config.old_prefix,
        new_prefix
    );

    let snapshot = if config.dry_run {
        Some(db::snapshot_digest(conn)?)
    } else {
        None
    };

    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
    // Media file ids change before their dependents catch up; check references at commit
    tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;

    let mut moved: Option<(PathBuf, PathBuf)> = None;
    let baseline = schema::count_foreign_key_violations(&tx)?;
    let outcome = apply(&tx, config, &rewrite, destination.as_deref(), fs, &mut moved, &mut report)
        .and_then(|()| check_integrity(&tx, baseline));

    match outcome {
        Ok(()) if config.dry_run => {
            tx.rollback()?;
            let after = db::snapshot_digest(conn)?;
            if snapshot.as_deref() != Some(after.as_str()) {
                return Err(MigrateError::RollbackIncomplete);
            }
            log::debug!("{}", DRY_RUN_SUCCESS_MESSAGE);
            Ok(report)
        }
        Ok(()) => match tx.commit() {
            Ok(()) => {
                log::debug!("{}", SUCCESS_MESSAGE);
                Ok(report)
            }
            Err(e) => {
                undo_move(fs, moved.as_ref());
                Err(e.into())
            }
        },
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Rollback failed: {}", rollback_err);
            }
            undo_move(fs, moved.as_ref());
            Err(e)
        }
    }
}

fn apply(
    conn: &Connection,
    config: &MigrationConfig,
    rewrite: &PathRewrite,
    destination: Option<&Path>,
    fs: &dyn Filesystem,
    moved: &mut Option<(PathBuf, PathBuf)>,
    report: &mut MigrationReport,
) -> Result<()> {
    let old_prefix = rewrite.old_prefix();

    if config.validation != ValidationMode::None {
        validate::validate_prefix(conn, old_prefix, config.partial)?;
    }

    if let Some(destination) = destination {
        let from = PathBuf::from(old_prefix);
        let to = destination.to_path_buf();

        if config.dry_run {
            log::info!("{} {} would be moved to {}", DRY_RUN_TAG, from.display(), to.display());
            // Nothing has moved yet, so check the files are where the database says they are
            report.files_checked = sample::sample_destinations(conn, old_prefix, None, config.validation, fs)?;
        } else {
            fs.move_path(&from, &to).map_err(|source| MigrateError::MoveFailed {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            log::info!("Moved {} to {}", from.display(), to.display());
            report.moved_to = Some(to.clone());
            *moved = Some((from, to));
            report.files_checked =
                sample::sample_destinations(conn, old_prefix, Some(rewrite), config.validation, fs)?;
        }
    } else {
        report.files_checked = sample::sample_destinations(conn, old_prefix, Some(rewrite), config.validation, fs)?;
    }

    let cascades = config.operation.cascades();
    cascade::rewrite_media_files(conn, rewrite, cascades, report)?;
    if cascades {
        cascade::rewrite_playlist_paths(conn, rewrite, report)?;
        cascade::rewrite_smart_playlist_paths(conn, rewrite, report)?;
        cascade::rewrite_album_paths(conn, rewrite, report)?;
    }
    cascade::rename_last_scan_property(conn, rewrite, report)?;

    Ok(())
}

/// Fails only on references the run itself left dangling; orphans that were
/// already in the database are not ours to fix.
fn check_integrity(conn: &Connection, baseline: i64) -> Result<()> {
    let violations = schema::count_foreign_key_violations(conn)?;
    if violations > baseline {
        return Err(MigrateError::IntegrityViolation(violations - baseline));
    }
    Ok(())
}

/// The moved library's prefix, ending in a separator exactly when the old one does,
/// so `old/Artist` becomes `new/old/Artist` and not `new/oldArtist`.
fn match_trailing_separator(old_prefix: &str, target: &str) -> String {
    let trimmed = target.trim_end_matches(&['/', '\\'][..]);
    let trimmed = if trimmed.is_empty() { target } else { trimmed };
    match old_prefix.chars().last() {
        Some(sep @ ('/' | '\\')) => format!("{}{}", trimmed, sep),
        _ => trimmed.to_string(),
    }
}

fn undo_move(fs: &dyn Filesystem, moved: Option<&(PathBuf, PathBuf)>) {
    let Some((from, to)) = moved else {
        return;
    };

    log::warn!("Database was not updated, moving {} back to {}", to.display(), from.display());
    if let Err(e) = fs.move_path(to, from) {
        log::error!(
            "Could not move {} back to {}: {}. Move it back by hand before retrying",
            to.display(),
            from.display(),
            e
        );
    }
}
