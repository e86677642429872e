use thiserror::Error;

/// Main error type for the timesheet pipeline.
/// Every stage returns it so the shell can match on the kind and print the message.
#[derive(Error, Debug)]
pub enum TimesheetError {
    /// Unreadable or unsupported upload; carries the text of the failing stage
    #[error("{0}")]
    ParseError(String),

    /// A field does not match its expected pattern
    #[error("{0}")]
    FormatError(String),

    /// An expected column is absent from the table
    #[error("Coluna '{0}' não encontrada")]
    MissingColumnError(String),

    #[error("Este recurso está disponível apenas para {0}.")]
    PlatformUnsupportedError(String),

    #[error("Nenhum arquivo CSV válido foi processado.")]
    NoValidInputError,

    #[error("Por favor, carregue um arquivo para visualizar os dados.")]
    NoFileLoaded,

    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    GlobError(#[from] glob::GlobError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    MimeError(#[from] crate::mailbox::mime::MimeError),
}

impl TimesheetError {
    /// Folds any reader-level failure into a `ParseError` that keeps its text.
    /// Errors already classified by the pipeline pass through untouched.
    pub(crate) fn into_parse_error(self) -> Self {
        match self {
            TimesheetError::ParseError(_)
            | TimesheetError::FormatError(_)
            | TimesheetError::MissingColumnError(_) => self,
            other => TimesheetError::ParseError(other.to_string()),
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TimesheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TimesheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
