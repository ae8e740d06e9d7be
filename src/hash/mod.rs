// Hashing module
// md5 for Navidrome's path-derived media file ids, BLAKE3 for table snapshots.

/// Media file id for a path: lowercase hex md5 of the path bytes.
/// Navidrome derives `media_file.id` the same way, so the result must not change format.
pub fn id_for(path: &str) -> String {
    format!("{:x}", md5::compute(path.as_bytes()))
}

/// Incremental digest over table contents.
/// Format of the result: "blake3:snapshot:<hash>"
pub struct SnapshotHasher {
    hasher: blake3::Hasher,
}

impl SnapshotHasher {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn table(&mut self, name: &str) {
        self.field(b'T', name.as_bytes());
    }

    pub fn row(&mut self) {
        self.hasher.update(b"R");
    }

    /// Each field is tagged and length-prefixed so adjacent values cannot run together.
    pub fn field(&mut self, tag: u8, bytes: &[u8]) {
        self.hasher.update(&[tag]);
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    pub fn finish(self) -> String {
        format!("blake3:snapshot:{}", self.hasher.finalize().to_hex())
    }
}

impl Default for SnapshotHasher {
    fn default() -> Self {
        Self::new()
    }
}
