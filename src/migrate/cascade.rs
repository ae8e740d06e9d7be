// Cascade updates
// Rewrites media files and everything that refers to them by id, then album and playlist paths.
// Callers run these inside one transaction with deferred foreign keys.

use rusqlite::Connection;

use crate::codec::PathRewrite;
use crate::constants::LAST_SCAN_PROPERTY_PREFIX;
use crate::db::schema::{self, AlbumPaths};
use crate::error::Result;
use crate::hash::id_for;

use super::MigrationReport;

/// Step 3: new path and id for every media file under the old prefix.
/// With `cascade`, annotations, genres, playlist tracks and scrobbles follow the new id.
pub fn rewrite_media_files(
    conn: &Connection,
    rewrite: &PathRewrite,
    cascade: bool,
    report: &mut MigrationReport,
) -> Result<()> {
    let files = schema::list_media_files_with_prefix(conn, rewrite.old_prefix())?;

    for file in files {
        let Some(new_path) = rewrite.apply(&file.path) else {
            continue;
        };
        if new_path == file.path {
            continue;
        }
        let new_id = id_for(&new_path);

        schema::update_media_file_identity(conn, &file.id, &new_id, &new_path)?;
        report.media_files += 1;
        log::debug!("{} -> {} ({} -> {})", file.path, new_path, file.id, new_id);

        if cascade && new_id != file.id {
            report.annotations += schema::retarget_annotations(conn, &file.id, &new_id)?;
            report.media_file_genres += schema::retarget_media_file_genres(conn, &file.id, &new_id)?;
            report.playlist_tracks += schema::retarget_playlist_tracks(conn, &file.id, &new_id)?;
            report.scrobble_buffer += schema::retarget_scrobble_buffer(conn, &file.id, &new_id)?;
        }
    }

    log::info!("Rewrote {} media file(s)", report.media_files);
    Ok(())
}

/// Step 4: plain playlists get a substring replace wherever the old prefix appears.
pub fn rewrite_playlist_paths(conn: &Connection, rewrite: &PathRewrite, report: &mut MigrationReport) -> Result<()> {
    for playlist in schema::list_file_backed_playlists(conn)? {
        if playlist.is_smart() {
            continue;
        }
        if let Some(new_path) = rewrite.apply_all(&playlist.path) {
            schema::update_playlist_path(conn, &playlist.id, &new_path)?;
            report.playlists += 1;
        }
    }
    Ok(())
}

/// Step 5: smart playlists get a positional replace, anchored at the start of the path.
pub fn rewrite_smart_playlist_paths(
    conn: &Connection,
    rewrite: &PathRewrite,
    report: &mut MigrationReport,
) -> Result<()> {
    for playlist in schema::list_file_backed_playlists(conn)? {
        if !playlist.is_smart() {
            continue;
        }
        if let Some(new_path) = rewrite.apply_anchored(&playlist.path) {
            schema::update_playlist_path(conn, &playlist.id, &new_path)?;
            report.smart_playlists += 1;
        }
    }
    Ok(())
}

/// Step 6: embedded art path plus the `paths` and `image_files` lists.
/// NULL and empty columns are written back unchanged.
pub fn rewrite_album_paths(conn: &Connection, rewrite: &PathRewrite, report: &mut MigrationReport) -> Result<()> {
    for album in schema::list_album_paths(conn)? {
        let embed_art_path = album.embed_art_path.as_deref().and_then(|p| rewrite.apply(p));
        let paths = album.paths.as_deref().and_then(|p| rewrite.apply_list(p));
        let image_files = album.image_files.as_deref().and_then(|p| rewrite.apply_list(p));

        if embed_art_path.is_none() && paths.is_none() && image_files.is_none() {
            continue;
        }

        let updated = AlbumPaths {
            id: album.id,
            embed_art_path: embed_art_path.or(album.embed_art_path),
            paths: paths.or(album.paths),
            image_files: image_files.or(album.image_files),
        };
        schema::update_album_paths(conn, &updated)?;
        report.albums += 1;
    }

    log::info!("Rewrote paths of {} album(s)", report.albums);
    Ok(())
}

/// The `LastScan-<path>` property follows the library root.
pub fn rename_last_scan_property(conn: &Connection, rewrite: &PathRewrite, report: &mut MigrationReport) -> Result<()> {
    let old_key = format!("{}{}", LAST_SCAN_PROPERTY_PREFIX, rewrite.old_prefix());
    let Some(new_key) = rewrite.apply(&old_key) else {
        return Ok(());
    };
    if new_key == old_key {
        return Ok(());
    }

    let renamed = schema::rename_property(conn, &old_key, &new_key)?;
    if renamed > 0 {
        log::info!("Renamed property {} to {}", old_key, new_key);
    }
    report.properties += renamed;
    Ok(())
}
