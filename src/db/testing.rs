// Test fixtures: the slice of Navidrome's schema the engine reads and writes.

use rusqlite::{params, Connection};

use crate::codec::encode_list;
use crate::db::configure_connection;
use crate::hash::id_for;

/// Reference columns have no ON UPDATE CASCADE here so the engine's own
/// retargeting is what keeps them valid.
pub const NAVIDROME_SCHEMA: &str = r#"
    CREATE TABLE media_file (
        id VARCHAR(255) NOT NULL PRIMARY KEY,
        path VARCHAR(255) NOT NULL DEFAULT '',
        title VARCHAR(255) NOT NULL DEFAULT ''
    );

    CREATE TABLE annotation (
        user_id VARCHAR(255) NOT NULL DEFAULT '',
        item_id VARCHAR(255) NOT NULL DEFAULT '',
        item_type VARCHAR(255) NOT NULL DEFAULT '',
        play_count INTEGER DEFAULT 0,
        starred BOOL NOT NULL DEFAULT FALSE,
        UNIQUE (user_id, item_id, item_type)
    );

    CREATE TABLE media_file_genres (
        media_file_id VARCHAR NOT NULL REFERENCES media_file(id) ON DELETE CASCADE,
        genre_id VARCHAR NOT NULL,
        UNIQUE (genre_id, media_file_id)
    );

    CREATE TABLE playlist (
        id VARCHAR(255) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL DEFAULT '',
        path STRING NOT NULL DEFAULT '',
        rules VARCHAR
    );

    CREATE TABLE playlist_tracks (
        id INTEGER NOT NULL DEFAULT 0,
        playlist_id VARCHAR(255) NOT NULL REFERENCES playlist(id) ON DELETE CASCADE,
        media_file_id VARCHAR(255) NOT NULL REFERENCES media_file(id) ON DELETE CASCADE,
        UNIQUE (playlist_id, id)
    );

    CREATE TABLE scrobble_buffer (
        user_id VARCHAR NOT NULL,
        service VARCHAR NOT NULL,
        media_file_id VARCHAR NOT NULL REFERENCES media_file(id) ON DELETE CASCADE,
        play_time DATETIME NOT NULL,
        UNIQUE (user_id, service, media_file_id, play_time)
    );

    CREATE TABLE album (
        id VARCHAR(255) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL DEFAULT '',
        embed_art_path VARCHAR(255),
        paths VARCHAR,
        image_files VARCHAR
    );

    CREATE TABLE property (
        id VARCHAR(255) NOT NULL PRIMARY KEY,
        value VARCHAR NOT NULL DEFAULT ''
    );
"#;

/// In-memory DB with the schema applied and foreign keys on.
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    configure_connection(&conn).unwrap();
    conn.execute_batch(NAVIDROME_SCHEMA).unwrap();
    conn
}

/// Same schema in a file, for tests that go through `open_db`.
pub fn create_test_db_file(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(NAVIDROME_SCHEMA).unwrap();
}

/// Insert a media file with its path-derived id. Returns the id.
pub fn seed_media_file(conn: &Connection, path: &str) -> String {
    let id = id_for(path);
    conn.execute(
        "INSERT INTO media_file (id, path) VALUES (?1, ?2)",
        params![id, path],
    )
    .unwrap();
    id
}

pub fn seed_annotation(conn: &Connection, item_id: &str, item_type: &str) {
    conn.execute(
        "INSERT INTO annotation (user_id, item_id, item_type, play_count) VALUES ('user-1', ?1, ?2, 3)",
        params![item_id, item_type],
    )
    .unwrap();
}

pub fn seed_media_file_genre(conn: &Connection, media_file_id: &str, genre_id: &str) {
    conn.execute(
        "INSERT INTO media_file_genres (media_file_id, genre_id) VALUES (?1, ?2)",
        params![media_file_id, genre_id],
    )
    .unwrap();
}

pub fn seed_playlist(conn: &Connection, id: &str, path: &str, rules: Option<&str>) {
    conn.execute(
        "INSERT INTO playlist (id, name, path, rules) VALUES (?1, ?1, ?2, ?3)",
        params![id, path, rules],
    )
    .unwrap();
}

pub fn seed_playlist_track(conn: &Connection, playlist_id: &str, position: i64, media_file_id: &str) {
    conn.execute(
        "INSERT INTO playlist_tracks (id, playlist_id, media_file_id) VALUES (?1, ?2, ?3)",
        params![position, playlist_id, media_file_id],
    )
    .unwrap();
}

pub fn seed_scrobble(conn: &Connection, media_file_id: &str) {
    conn.execute(
        "INSERT INTO scrobble_buffer (user_id, service, media_file_id, play_time)
         VALUES ('user-1', 'lastfm', ?1, '2024-01-01 10:00:00')",
        params![media_file_id],
    )
    .unwrap();
}

pub fn seed_album(conn: &Connection, id: &str, embed_art_path: Option<&str>, paths: &[&str], image_files: &[&str]) {
    let paths = if paths.is_empty() { None } else { Some(encode_list(paths)) };
    let image_files = if image_files.is_empty() { None } else { Some(encode_list(image_files)) };
    conn.execute(
        "INSERT INTO album (id, name, embed_art_path, paths, image_files) VALUES (?1, ?1, ?2, ?3, ?4)",
        params![id, embed_art_path, paths, image_files],
    )
    .unwrap();
}

pub fn seed_property(conn: &Connection, key: &str, value: &str) {
    conn.execute(
        "INSERT INTO property (id, value) VALUES (?1, ?2)",
        params![key, value],
    )
    .unwrap();
}

pub fn count_rows(conn: &Connection, sql: &str, param: &str) -> i64 {
    conn.query_row(sql, params![param], |row| row.get(0)).unwrap()
}
