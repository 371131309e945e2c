use thiserror::Error;

/// Failures that abort a sheet run.
///
/// Every variant is fatal: front and back pages depend on each other, so a
/// partially drawn document is never useful.
#[derive(Debug, Error)]
pub enum SheetError {
    /// A record is missing its URL or carries a malformed field.
    #[error("data row {row}: {message}")]
    Data { row: usize, message: String },
    /// The icon could not be read, fetched or decoded.
    #[error("icon '{source_id}': {message}")]
    Asset { source_id: String, message: String },
    /// Page and tile dimensions do not produce a usable grid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The output backend rejected a drawing or write operation.
    #[error("canvas failure: {0}")]
    Canvas(String),
}

impl SheetError {
    pub(crate) fn data<S: Into<String>>(row: usize, message: S) -> Self {
        SheetError::Data {
            row,
            message: message.into(),
        }
    }

    pub(crate) fn asset<S: Into<String>, M: Into<String>>(source_id: S, message: M) -> Self {
        SheetError::Asset {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    pub(crate) fn canvas<S: Into<String>>(message: S) -> Self {
        SheetError::Canvas(message.into())
    }
}

pub type SheetResult<T> = std::result::Result<T, SheetError>;
