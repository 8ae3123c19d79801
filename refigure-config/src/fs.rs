//! Filesystem collaborator
//!
//! Path resolution, loading and write-back only touch the disk through
//! [`FileSystem`], so they can be exercised against [`InMemoryFileSystem`].

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Minimal filesystem surface used by the resolver
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Whether a regular file exists at `path`
    fn file_exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace a file's contents
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Immediate subdirectories of `path`
    fn list_subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn list_subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    reads: HashMap<PathBuf, usize>,
    writes: HashMap<PathBuf, usize>,
}

/// In-memory [`FileSystem`] that records how often each file is read and written
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file; its ancestors become directories
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        let mut state = self.state.lock();
        if let Some(parent) = path.parent() {
            register_dir(&mut state.dirs, parent);
        }
        state.files.insert(path, contents.into());
    }

    /// Add an empty directory and its ancestors
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock();
        register_dir(&mut state.dirs, path.as_ref());
    }

    /// Current contents of a file
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state.lock().files.get(path.as_ref()).cloned()
    }

    /// Number of successful reads of `path`
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.state.lock().reads.get(path.as_ref()).copied().unwrap_or(0)
    }

    /// Number of writes to `path`
    pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
        self.state.lock().writes.get(path.as_ref()).copied().unwrap_or(0)
    }
}

fn register_dir(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() || !dirs.insert(ancestor.to_path_buf()) {
            break;
        }
    }
}

impl FileSystem for InMemoryFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.state.lock().files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut state = self.state.lock();
        let contents = state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;
        *state.reads.entry(path.to_path_buf()).or_default() += 1;
        Ok(contents)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.state.lock();
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("directory {} not found", parent.display()),
                ));
            }
            _ => {}
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        *state.writes.entry(path.to_path_buf()).or_default() += 1;
        Ok(())
    }

    fn list_subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.state.lock();
        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory {} not found", path.display()),
            ));
        }
        Ok(state
            .dirs
            .iter()
            .filter(|dir| dir.parent() == Some(path))
            .cloned()
            .collect())
    }
}
