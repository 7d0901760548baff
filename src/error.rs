use thiserror::Error;

/// Failures surfaced by the allocation core.
///
/// None of these are recovered inside the library: a run either completes
/// or returns one of these without touching any ledger.
#[derive(Error, Debug)]
pub enum AllocError {
    #[error("Missing column '{column}' (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Division by zero: total CBM is zero ({context})")]
    DivisionByZero { context: String },

    #[error("Malformed file: {0}")]
    MalformedFile(String),

    #[error("Row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("XLSX writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AllocError>;
