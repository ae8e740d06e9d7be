// Database module

pub mod schema;

#[cfg(test)]
pub mod testing;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::constants::SNAPSHOT_TABLES;
use crate::error::{MigrateError, Result};
use crate::hash::SnapshotHasher;

/// Open an existing Navidrome database. Never creates one.
pub fn open_db(db_path: &Path) -> Result<Connection> {
    if !db_path.is_file() {
        return Err(MigrateError::DatabaseNotFound(db_path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_connection(&conn)?;

    Ok(conn)
}

/// Per-connection pragmas. The journal mode is left alone since it persists in the file.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // Must be set outside of a transaction
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
    Ok(())
}

/// BLAKE3 digest of every row in the tables a migration can touch, in rowid order.
pub fn snapshot_digest(conn: &Connection) -> Result<String> {
    let mut hasher = SnapshotHasher::new();

    for table in SNAPSHOT_TABLES {
        hasher.table(table);

        let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            hasher.row();
            for i in 0..column_count {
                match row.get_ref(i)? {
                    ValueRef::Null => hasher.field(b'N', &[]),
                    ValueRef::Integer(v) => hasher.field(b'I', &v.to_le_bytes()),
                    ValueRef::Real(v) => hasher.field(b'F', &v.to_le_bytes()),
                    ValueRef::Text(v) => hasher.field(b'S', v),
                    ValueRef::Blob(v) => hasher.field(b'B', v),
                }
            }
        }
    }

    Ok(hasher.finish())
}
