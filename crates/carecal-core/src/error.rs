use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error")]
    Io(#[from] std::io::Error),

    #[error("Storage document could not be read or written")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid year-month '{0}'. Expected YYYY-MM")]
    InvalidYearMonth(String),
}
