//! Read-only access to the sysfs namespace.
//!
//! Every query goes straight to the filesystem. Nothing is cached, so two
//! calls may observe different device sets if hardware comes and goes in
//! between.

mod layout;

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use self::layout::*;

/// Sysfs read error type.
#[derive(Debug, Error)]
pub enum SysfsError {
    /// The file or directory does not exist (or vanished after it was listed).
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SysfsError {
    fn new(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_owned()),
            _ => Self::Io {
                path: path.to_owned(),
                source,
            },
        }
    }

    /// Whether this error means the entry is absent.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<SysfsError> for io::Error {
    fn from(e: SysfsError) -> Self {
        match e {
            SysfsError::NotFound(path) => io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ),
            SysfsError::Io { source, .. } => source,
        }
    }
}

/// A directory entry as seen by `lstat`.
///
/// Class directories such as `/sys/class/infiniband` hold symlinks, which
/// count as non-directories here even though they point at directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// List the entries of a directory.
///
/// A directory that cannot be opened yields an empty list. An entry whose
/// type cannot be determined (typically because it vanished mid-listing) is
/// skipped. `read_dir` never yields `.` or `..`.
pub fn list_entries(dir: &Path) -> Vec<Entry> {
    let iter = match fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(e) => {
            log::debug!("rdmamap: cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    iter.filter_map(|entry| {
        let entry = entry.ok()?;
        let file_type = entry.file_type().ok()?;
        Some(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        })
    })
    .collect()
}

/// List the names of all entries in a directory.
#[inline]
pub fn list_names(dir: &Path) -> Vec<String> {
    list_entries(dir).into_iter().map(|e| e.name).collect()
}

/// Read a whole file.
pub fn read_file(path: &Path) -> Result<Vec<u8>, SysfsError> {
    let read = || -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(0))?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    };
    read().map_err(|e| SysfsError::new(path, e))
}

/// Read a whole file as text with a single trailing newline removed.
pub fn read_line(path: &Path) -> Result<String, SysfsError> {
    let data = read_file(path)?;
    let mut text = String::from_utf8_lossy(&data).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Read the target of a symbolic link.
pub fn read_link(path: &Path) -> Result<PathBuf, SysfsError> {
    fs::read_link(path).map_err(|e| SysfsError::new(path, e))
}
