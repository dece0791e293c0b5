use thiserror::Error;

/// Fatal error classes for a reconciliation run. Individual malformed
/// cells are not errors; they degrade to default values with a warning.
#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("archive is missing required column '{0}'")]
    MissingColumn(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("provider request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("malformed provider payload: {0}")]
    Payload(String),
}
