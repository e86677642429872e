use crate::error::TimesheetError;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::path::PathBuf;

/// An uploaded file: its name (which decides the format) and raw bytes
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Upload {
        Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a local file into memory, keeping only its file name
    ///
    /// # Arguments
    /// * `path` - Path to the file, `~` is expanded to the home directory
    ///
    /// # Returns
    /// * `Result<Upload, TimesheetError>` - The upload or the I/O error
    pub fn open(path: impl AsRef<Path>) -> Result<Upload, TimesheetError> {
        let path = expand_user(path.as_ref());
        let bytes = fs::read(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Upload { name, bytes })
    }

    /// Seekable cursor over the bytes, as required by the zip reader
    pub(crate) fn cursor(&self) -> Cursor<&[u8]> {
        Cursor::new(self.bytes.as_slice())
    }
}

/// Expands shell-style patterns (`*.csv`) into matching paths, in pattern order
///
/// A pattern without wildcards is kept as is, so a missing file still reaches
/// [`Upload::open`] and fails there with its own name.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, TimesheetError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = expand_user(Path::new(pattern.as_ref())).to_string_lossy().into_owned();
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let mut matches = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
        matches.sort();
        paths.extend(matches);
    }
    Ok(paths)
}

/// Expands a leading `~` to the current user's home directory
pub fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
