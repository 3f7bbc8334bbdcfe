pub mod ledger;
pub mod users;

/// Errors of the flat-file storage layer. `DuplicateId` is the one variant
/// handlers match on; the rest bubble up as 500s.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("student ID already registered")]
    DuplicateId,
    #[error("unparseable date {value:?} on ledger line {line}")]
    BadDate { line: u64, value: String },
    #[error("missing ledger column {0:?}")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
