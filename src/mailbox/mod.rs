//! # Mailbox Attachment Exporter
//!
//! Saves the `.csv` attachments found in the local inbox into a folder.
//!
//! The inbox is reached through an [`AttachmentSource`]. Which implementation
//! is available depends on the platform and is decided once, by
//! [`default_source`]; on a platform without one the exporter reports
//! [`TimesheetError::PlatformUnsupportedError`] instead of scanning anything.
pub mod mime;

use crate::error::TimesheetError;
use crate::helpers::reader::expand_user;
pub use mime::Attachment;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Extension of the attachments worth keeping
const CSV_SUFFIX: &str = ".csv";

/// Something that can list the attachments of the messages in an inbox.
pub trait AttachmentSource {
    /// Human readable name used in log events and messages
    fn name(&self) -> &str;

    /// Every attachment of every message, in inbox order
    fn attachments(&self) -> Result<Vec<Attachment>, TimesheetError>;
}

/// A Maildir inbox: one file per message under `new/` and `cur/`.
#[derive(Clone, Debug)]
pub struct MaildirSource {
    root: PathBuf,
}

impl MaildirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Message files sorted by name inside each of `new/` and `cur/`
    fn messages(&self) -> Result<Vec<PathBuf>, TimesheetError> {
        if !self.root.is_dir() {
            return Err(TimesheetError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Maildir '{}' não encontrado", self.root.display()),
            )));
        }
        let mut messages = Vec::new();
        for folder in ["new", "cur"] {
            let folder = self.root.join(folder);
            if !folder.is_dir() {
                continue;
            }
            let mut entries = fs::read_dir(&folder)?
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.retain(|path| path.is_file());
            entries.sort();
            messages.extend(entries);
        }
        Ok(messages)
    }
}

impl AttachmentSource for MaildirSource {
    fn name(&self) -> &str {
        "maildir"
    }

    fn attachments(&self) -> Result<Vec<Attachment>, TimesheetError> {
        let mut found = Vec::new();
        for path in self.messages()? {
            let raw = fs::read(&path)?;
            let attachments = mime::attachments(&raw)?;
            tracing::debug!(message = %path.display(), attachments = attachments.len(), "scanned message");
            found.extend(attachments);
        }
        Ok(found)
    }
}

/// Picks the inbox reader for this platform.
///
/// # Arguments
/// * `maildir` - Location of the local Maildir, `~` expanded
#[cfg(unix)]
pub fn default_source(maildir: &Path) -> Result<Box<dyn AttachmentSource>, TimesheetError> {
    Ok(Box::new(MaildirSource::new(expand_user(maildir))))
}

#[cfg(not(unix))]
pub fn default_source(_maildir: &Path) -> Result<Box<dyn AttachmentSource>, TimesheetError> {
    Err(TimesheetError::PlatformUnsupportedError("Unix".to_owned()))
}

/// Writes every attachment whose name ends in `.csv` into `destination`.
///
/// Returns the names written, in inbox order; an empty list when the inbox
/// holds no CSV attachment. An empty destination is refused before the inbox
/// is touched.
pub fn export_csv_attachments(
    source: &dyn AttachmentSource,
    destination: &Path,
) -> Result<Vec<String>, TimesheetError> {
    if destination.as_os_str().is_empty() {
        return Err(TimesheetError::ConfigError(
            "Por favor, insira um caminho válido para a pasta de destino.".to_owned(),
        ));
    }
    let destination = expand_user(destination);

    let mut written = Vec::new();
    for attachment in source.attachments()? {
        if !attachment.file_name.ends_with(CSV_SUFFIX) {
            continue;
        }
        // never let a crafted name escape the destination folder
        let Some(file_name) = Path::new(&attachment.file_name).file_name() else {
            continue;
        };
        fs::create_dir_all(&destination)?;
        fs::write(destination.join(file_name), &attachment.bytes)?;
        written.push(file_name.to_string_lossy().into_owned());
    }
    tracing::info!(source = source.name(), destination = %destination.display(), files = written.len(), "exported csv attachments");
    Ok(written)
}
