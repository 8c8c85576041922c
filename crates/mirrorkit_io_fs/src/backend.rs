//! Filesystem capability used by the mirror walk.

use std::fs;
use std::io;
use std::path::Path;

/// Write side of a mirror run.
///
/// The walk decides *what* to create and copy; a backend performs it. Reads of
/// the source tree always go through `std::fs` directly.
pub trait MirrorBackend {
    /// Create `path_dir` and any missing parents. Existing directories are ok.
    fn create_dir_all(&self, path_dir: &Path) -> io::Result<()>;

    /// Copy file bytes from `path_file_src` to `path_file_dst`, replacing the
    /// destination if present. Returns the number of bytes copied.
    fn copy_file(&self, path_file_src: &Path, path_file_dst: &Path) -> io::Result<u64>;
}

/// Backend writing to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMirrorBackend;

impl MirrorBackend for NativeMirrorBackend {
    fn create_dir_all(&self, path_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(path_dir)
    }

    fn copy_file(&self, path_file_src: &Path, path_file_dst: &Path) -> io::Result<u64> {
        fs::copy(path_file_src, path_file_dst)
    }
}
