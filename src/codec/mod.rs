// Path codec
// Pure string helpers for prefix rewriting and the zero-width-space list fields.

use crate::config::SeparatorRewrite;
use crate::constants::LIST_SEPARATOR;

/// Replace the first occurrence of `old_prefix` with `new_prefix`.
pub fn rewrite(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    if old_prefix.is_empty() {
        return path.to_string();
    }
    path.replacen(old_prefix, new_prefix, 1)
}

pub fn normalize_separators(path: &str, direction: SeparatorRewrite) -> String {
    match direction {
        SeparatorRewrite::Keep => path.to_string(),
        SeparatorRewrite::ToForwardSlash => path.replace('\\', "/"),
        SeparatorRewrite::ToBackslash => path.replace('/', "\\"),
    }
}

pub fn encode_list<S: AsRef<str>>(paths: &[S]) -> String {
    let mut encoded = String::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            encoded.push(LIST_SEPARATOR);
        }
        encoded.push_str(path.as_ref());
    }
    encoded
}

/// An empty field decodes to an empty list, never to `[""]`.
pub fn decode_list(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }
    encoded.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// One prefix substitution, as configured for a run.
///
/// Every `apply*` method returns `None` when the value does not contain the
/// old prefix, so callers only write rows that actually change. Separator
/// normalization is applied to the rewritten value and written back with it.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    old_prefix: String,
    new_prefix: String,
    separators: SeparatorRewrite,
}

impl PathRewrite {
    pub fn new(old_prefix: impl Into<String>, new_prefix: impl Into<String>, separators: SeparatorRewrite) -> Self {
        Self {
            old_prefix: old_prefix.into(),
            new_prefix: new_prefix.into(),
            separators,
        }
    }

    pub fn old_prefix(&self) -> &str {
        &self.old_prefix
    }

    pub fn new_prefix(&self) -> &str {
        &self.new_prefix
    }

    /// First-occurrence rewrite of a single path.
    pub fn apply(&self, path: &str) -> Option<String> {
        if self.old_prefix.is_empty() || !path.contains(&self.old_prefix) {
            return None;
        }
        let rewritten = rewrite(path, &self.old_prefix, &self.new_prefix);
        Some(normalize_separators(&rewritten, self.separators))
    }

    /// Rewrite every occurrence, like SQL `REPLACE(path, old, new)`.
    pub fn apply_all(&self, path: &str) -> Option<String> {
        if self.old_prefix.is_empty() || !path.contains(&self.old_prefix) {
            return None;
        }
        let rewritten = path.replace(&self.old_prefix, &self.new_prefix);
        Some(normalize_separators(&rewritten, self.separators))
    }

    /// Positional rewrite: `new_prefix + path[len(old_prefix)..]`.
    /// Only paths that start with the old prefix qualify.
    pub fn apply_anchored(&self, path: &str) -> Option<String> {
        if self.old_prefix.is_empty() {
            return None;
        }
        let suffix = path.strip_prefix(&self.old_prefix)?;
        let rewritten = format!("{}{}", self.new_prefix, suffix);
        Some(normalize_separators(&rewritten, self.separators))
    }

    /// Rewrite each entry of an encoded list field. Entries without the old
    /// prefix are kept byte-for-byte.
    pub fn apply_list(&self, encoded: &str) -> Option<String> {
        let entries = decode_list(encoded);
        let mut changed = false;
        let rewritten: Vec<String> = entries
            .into_iter()
            .map(|entry| match self.apply(&entry) {
                Some(new_entry) => {
                    changed = true;
                    new_entry
                }
                None => entry,
            })
            .collect();

        if changed {
            Some(encode_list(&rewritten))
        } else {
            None
        }
    }
}
