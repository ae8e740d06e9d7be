// Filesystem collaborator
// Existence checks and the physical move, behind a trait so the engine can run against a fake.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Everything the engine needs from the disk.
pub trait Filesystem {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Move a file or directory. Must either complete or return an error.
    fn move_path(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn move_path(&self, from: &Path, to: &Path) -> io::Result<()> {
        move_with(from, to, |from, to| fs::rename(from, to))
    }
}

/// Rename, falling back to copy-then-delete across filesystems.
/// A failed copy removes whatever it wrote so a retry starts from the same state.
fn move_with<R>(from: &Path, to: &Path, rename: R) -> io::Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    match rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            log::info!(
                "{} and {} are on different filesystems, copying instead",
                from.display(),
                to.display()
            );
            if let Err(e) = copy_tree(from, to) {
                remove_path(to);
                return Err(e);
            }
            if from.is_dir() {
                fs::remove_dir_all(from)
            } else {
                fs::remove_file(from)
            }
        }
        Err(e) => Err(e),
    }
}

fn remove_path(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        Ok(())
    };
    if let Err(e) = result {
        log::warn!("Could not clean up partial copy at {}: {}", path.display(), e);
    }
}

/// Where `from` ends up when moved to `to`.
/// Moving into an existing directory keeps the source's name.
pub fn resolve_move_destination(fs: &dyn Filesystem, from: &Path, to: &Path) -> PathBuf {
    if fs.is_dir(to) {
        if let Some(name) = from.file_name() {
            return to.join(name);
        }
    }
    to.to_path_buf()
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    // EXDEV
    err.raw_os_error() == Some(18)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Copy a file or a whole directory tree, preserving modification times.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        return copy_file(from, to);
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    let copied = fs::copy(from, to)?;

    let source_size = fs::metadata(from)?.len();
    if copied != source_size {
        let _ = fs::remove_file(to);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "size mismatch copying {} ({} vs {})",
                from.display(),
                source_size,
                copied
            ),
        ));
    }

    if let Ok(modified) = fs::metadata(from).and_then(|m| m.modified()) {
        let _ = filetime::set_file_mtime(to, filetime::FileTime::from_system_time(modified));
    }

    Ok(())
}
