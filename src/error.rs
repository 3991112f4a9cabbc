use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentbooksError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown bank account: {0}")]
    UnknownAccount(String),

    #[error("Unknown bank format: {0}")]
    UnknownBank(String),

    #[error("Unknown {kind}: {name}")]
    UnknownEntity { kind: &'static str, name: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Cannot delete normalized rows (transaction {0} was imported from a statement)")]
    NormalizedRowImmutable(i64),

    #[error("Duplicate row: {0}")]
    DuplicateRow(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RentbooksError>;
