use thiserror::Error;

/// Failure reported by a chain collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("missing argument: expected {expected}")]
    MissingArgument { expected: &'static str },

    #[error("could not resolve gateway at {address}")]
    Resolution {
        address: String,
        #[source]
        source: BoxError,
    },

    #[error("nonce query failed for {candidate}")]
    Query {
        candidate: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid candidate list {path}: {reason}")]
    Candidates { path: String, reason: String },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}
