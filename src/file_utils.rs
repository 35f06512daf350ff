use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Regular file existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Resolve where the copy of `source` should be written.
    ///
    /// An existing directory receives a file named after the source's base
    /// name. Anything else is taken as the output file path itself.
    pub fn resolve_destination<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, dest: P2) -> PathBuf {
        let source = source.as_ref();
        let dest = dest.as_ref();

        if Self::dir_exists(dest) {
            if let Some(name) = source.file_name() {
                return dest.join(name);
            }
        }

        dest.to_path_buf()
    }

    /// Size of a file in bytes, if it can be read
    pub fn file_len<P: AsRef<Path>>(path: P) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }
}
