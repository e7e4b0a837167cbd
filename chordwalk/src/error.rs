// Error taxonomy for the continuation engine.
//
// Every precondition violation is an `InvalidArgument`; generation never
// starts when one is raised, so callers never see partial output.
// `ModelLookup` means a transition row was requested for a symbol the model
// never saw. The model builder inserts a row for every counted symbol, so
// this indicates a bug rather than bad input.

/// Errors from segmentation, model building, generation and config loading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{family} model lookup failed for {symbol}")]
    ModelLookup {
        family: &'static str,
        symbol: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// True for precondition violations (bad caller input).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
