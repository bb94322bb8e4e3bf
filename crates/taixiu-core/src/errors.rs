/// A single upstream record failed validation. The record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing round id")]
    MissingId,

    #[error("invalid round id: {value}")]
    InvalidId { value: String },

    #[error("expected 3 dice, found {found}")]
    DiceCount { found: usize },

    #[error("die {index} out of range: {value}")]
    DieOutOfRange { index: usize, value: String },

    #[error("declared sum {declared} does not match dice total {computed}")]
    SumMismatch { declared: String, computed: u8 },

    #[error("unrecognized outcome token: {token}")]
    UnknownOutcome { token: String },

    #[error("declared outcome {declared} contradicts dice total {sum}")]
    OutcomeMismatch { declared: String, sum: u8 },
}

/// Fetch-stage failure. Aborts the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("upstream transport error: {message}")]
    Transport { message: String },

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("upstream payload not decodable: {message}")]
    Decode { message: String },
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(pub String);
