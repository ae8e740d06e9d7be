// Database schema types and query helpers
// Only the Navidrome tables and columns that encode a path or a media file id.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::constants::MEDIA_FILE_ITEM_TYPE;
use crate::error::Result;

// Prefix matching is exact and case sensitive. LIKE would treat % and _ in a
// path as wildcards and ignore ASCII case.
const PREFIX_MATCH: &str = "substr(path, 1, length(?1)) = ?1";

// ----- Media File -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub id: String,
    pub path: String,
}

pub fn count_media_files(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM media_file", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_media_files_with_prefix(conn: &Connection, prefix: &str) -> Result<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM media_file WHERE {}", PREFIX_MATCH),
        params![prefix],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_media_file_paths(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT path FROM media_file")?;
    let paths = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(paths)
}

pub fn list_media_file_paths_with_prefix(conn: &Connection, prefix: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT path FROM media_file WHERE {} ORDER BY path",
        PREFIX_MATCH
    ))?;
    let paths = stmt
        .query_map(params![prefix], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(paths)
}

pub fn first_media_file_path_with_prefix(conn: &Connection, prefix: &str) -> Result<Option<String>> {
    let path = conn
        .query_row(
            &format!("SELECT path FROM media_file WHERE {} LIMIT 1", PREFIX_MATCH),
            params![prefix],
            |row| row.get(0),
        )
        .optional()?;
    Ok(path)
}

pub fn list_media_files_with_prefix(conn: &Connection, prefix: &str) -> Result<Vec<MediaFile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, path FROM media_file WHERE {} ORDER BY path",
        PREFIX_MATCH
    ))?;
    let files = stmt
        .query_map(params![prefix], |row| {
            Ok(MediaFile {
                id: row.get(0)?,
                path: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(files)
}

pub fn get_media_file(conn: &Connection, id: &str) -> Result<Option<MediaFile>> {
    let file = conn
        .query_row(
            "SELECT id, path FROM media_file WHERE id = ?1",
            params![id],
            |row| {
                Ok(MediaFile {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(file)
}

/// Id and path change together so `id == md5(path)` holds row by row.
pub fn update_media_file_identity(conn: &Connection, old_id: &str, new_id: &str, new_path: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE media_file SET id = ?1, path = ?2 WHERE id = ?3",
        params![new_id, new_path, old_id],
    )?;
    Ok(rows)
}

// ----- Media File References -----

pub fn retarget_annotations(conn: &Connection, old_id: &str, new_id: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE annotation SET item_id = ?1 WHERE item_id = ?2 AND item_type = ?3",
        params![new_id, old_id, MEDIA_FILE_ITEM_TYPE],
    )?;
    Ok(rows)
}

pub fn retarget_media_file_genres(conn: &Connection, old_id: &str, new_id: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE media_file_genres SET media_file_id = ?1 WHERE media_file_id = ?2",
        params![new_id, old_id],
    )?;
    Ok(rows)
}

pub fn retarget_playlist_tracks(conn: &Connection, old_id: &str, new_id: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE playlist_tracks SET media_file_id = ?1 WHERE media_file_id = ?2",
        params![new_id, old_id],
    )?;
    Ok(rows)
}

pub fn retarget_scrobble_buffer(conn: &Connection, old_id: &str, new_id: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE scrobble_buffer SET media_file_id = ?1 WHERE media_file_id = ?2",
        params![new_id, old_id],
    )?;
    Ok(rows)
}

// ----- Album -----

/// The path-bearing columns of an album row. All three may be NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumPaths {
    pub id: String,
    pub embed_art_path: Option<String>,
    pub paths: Option<String>,
    pub image_files: Option<String>,
}

pub fn list_album_paths(conn: &Connection) -> Result<Vec<AlbumPaths>> {
    let mut stmt = conn.prepare("SELECT id, embed_art_path, paths, image_files FROM album ORDER BY id")?;
    let albums = stmt
        .query_map([], |row| {
            Ok(AlbumPaths {
                id: row.get(0)?,
                embed_art_path: row.get(1)?,
                paths: row.get(2)?,
                image_files: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(albums)
}

pub fn get_album_paths(conn: &Connection, id: &str) -> Result<Option<AlbumPaths>> {
    let album = conn
        .query_row(
            "SELECT id, embed_art_path, paths, image_files FROM album WHERE id = ?1",
            params![id],
            |row| {
                Ok(AlbumPaths {
                    id: row.get(0)?,
                    embed_art_path: row.get(1)?,
                    paths: row.get(2)?,
                    image_files: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(album)
}

pub fn update_album_paths(conn: &Connection, album: &AlbumPaths) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE album SET embed_art_path = ?1, paths = ?2, image_files = ?3 WHERE id = ?4",
        params![album.embed_art_path, album.paths, album.image_files, album.id],
    )?;
    Ok(rows)
}

// ----- Playlist -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: String,
    pub path: String,
    pub rules: Option<String>,
}

impl Playlist {
    /// Smart playlists carry their criteria in `rules`
    pub fn is_smart(&self) -> bool {
        self.rules.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Playlists with an empty path are not file-backed and never rewritten.
pub fn list_file_backed_playlists(conn: &Connection) -> Result<Vec<Playlist>> {
    let mut stmt = conn.prepare("SELECT id, path, rules FROM playlist WHERE path != '' ORDER BY id")?;
    let playlists = stmt
        .query_map([], |row| {
            Ok(Playlist {
                id: row.get(0)?,
                path: row.get(1)?,
                rules: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(playlists)
}

pub fn get_playlist_path(conn: &Connection, id: &str) -> Result<Option<String>> {
    let path = conn
        .query_row("SELECT path FROM playlist WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(path)
}

pub fn update_playlist_path(conn: &Connection, id: &str, path: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE playlist SET path = ?1 WHERE id = ?2",
        params![path, id],
    )?;
    Ok(rows)
}

// ----- Property -----

pub fn get_property(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM property WHERE id = ?1", params![key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

/// Rename a property key, replacing any row already stored under the new key.
pub fn rename_property(conn: &Connection, old_key: &str, new_key: &str) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE OR REPLACE property SET id = ?1 WHERE id = ?2",
        params![new_key, old_key],
    )?;
    Ok(rows)
}

// ----- Integrity -----

/// Rows reported by `PRAGMA foreign_key_check`, i.e. references that would
/// fail a deferred constraint at commit.
pub fn count_foreign_key_violations(conn: &Connection) -> Result<i64> {
    let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
    let mut rows = stmt.query([])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let table: String = row.get(0)?;
        let parent: String = row.get(2)?;
        log::warn!("Dangling reference in {} to {}", table, parent);
        count += 1;
    }
    Ok(count)
}
