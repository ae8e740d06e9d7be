// Prefix coverage checks
// Runs before anything is written: does the old prefix describe the library (or the declared part of it)?

use rusqlite::Connection;

use crate::db::schema;
use crate::error::{MigrateError, Result};

/// How much of the library an old prefix covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixCoverage {
    pub matched: i64,
    pub total: i64,
}

/// Full mode: every media file must start with `prefix`.
/// Partial mode: some, but not all, must.
pub fn validate_prefix(conn: &Connection, prefix: &str, partial: bool) -> Result<PrefixCoverage> {
    let matched = schema::count_media_files_with_prefix(conn, prefix)?;
    let total = schema::count_media_files(conn)?;
    let coverage = PrefixCoverage { matched, total };

    if partial {
        if matched == total && total > 0 {
            return Err(MigrateError::PartialMismatch {
                prefix: prefix.to_string(),
                total,
            });
        }
        if matched == 0 {
            return Err(mismatch(conn, prefix, coverage)?);
        }
    } else if matched != total {
        return Err(mismatch(conn, prefix, coverage)?);
    }

    log::info!(
        "Prefix {} matches {} of {} media files",
        prefix,
        matched,
        total
    );
    Ok(coverage)
}

fn mismatch(conn: &Connection, prefix: &str, coverage: PrefixCoverage) -> Result<MigrateError> {
    let paths = schema::list_media_file_paths(conn)?;
    Ok(MigrateError::PrefixMismatch {
        prefix: prefix.to_string(),
        matched: coverage.matched,
        total: coverage.total,
        common_prefix: common_prefix(&paths),
    })
}

/// Longest prefix shared by all paths, compared character by character.
/// Empty input gives an empty prefix.
pub fn common_prefix<S: AsRef<str>>(paths: &[S]) -> String {
    let mut iter = paths.iter();
    let mut prefix: Vec<char> = match iter.next() {
        Some(first) => first.as_ref().chars().collect(),
        None => return String::new(),
    };

    for path in iter {
        let shared = prefix
            .iter()
            .zip(path.as_ref().chars())
            .take_while(|(a, b)| *a == b)
            .count();
        prefix.truncate(shared);
        if prefix.is_empty() {
            break;
        }
    }

    prefix.into_iter().collect()
}
