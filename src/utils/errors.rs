use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BloomTranslateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Translation timed out: translations did not complete after {attempts} polling attempts")]
    TimeoutError { attempts: u32 },

    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("Sheet \"{sheet}\" not found in workbook. Available sheets: {available}")]
    SheetNotFound { sheet: String, available: String },

    #[error("Output file {} is not writable ({reason}). Make sure it isn't open in another program.", path.display())]
    OutputNotWritable { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    OAuthError(String),
}

pub type Result<T> = std::result::Result<T, BloomTranslateError>;

impl BloomTranslateError {
    /// Errors after which no output may be produced for the run.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::FileNotFound(_)
                | Self::SheetNotFound { .. }
                | Self::OutputNotWritable { .. }
        )
    }

    /// Errors a multi-column run logs and moves past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BackendError(_)
                | Self::TimeoutError { .. }
                | Self::HttpError(_)
                | Self::JsonError(_)
                | Self::OAuthError(_)
                | Self::UnsupportedModel(_)
        )
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendError(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_recoverable_like_a_backend_error() {
        let err = BloomTranslateError::TimeoutError { attempts: 30 };
        assert!(err.is_recoverable());
        assert!(!err.is_fatal_for_run());
        assert!(err.to_string().contains("30 polling attempts"));
    }

    #[test]
    fn missing_source_column_is_fatal() {
        let err = BloomTranslateError::config("source column [en] not found");
        assert!(err.is_fatal_for_run());
        assert!(!err.is_recoverable());
    }
}
