use thiserror::Error;

/// Anything that can go wrong while talking to the alert service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    /// The request never reached the service or the reply could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a `statusCode` other than 200.
    #[error("{}", .message.as_deref().unwrap_or("request rejected by alert service"))]
    Application {
        status: i64,
        message: Option<String>,
    },

    /// Rejected locally before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AlertError {
    /// Text for a notification: the service message when there is one,
    /// `rejected` for a bare rejection and `unreachable` for transport failures.
    pub fn describe(&self, rejected: &str, unreachable: &str) -> String {
        match self {
            AlertError::Transport(_) => unreachable.to_string(),
            AlertError::Application { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(rejected)
                .to_string(),
            AlertError::Validation(e) => e.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a stock name.")]
    MissingInstrument,

    #[error("Unknown stock name: {0}")]
    UnknownInstrument(String),

    #[error("Please enter a price.")]
    MissingPrice,

    #[error("Please enter a valid price (got {0:?}).")]
    InvalidPrice(String),

    #[error("Price cannot be negative (got {0}).")]
    NegativePrice(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{0} cannot be changed while editing")]
    ReadOnly(&'static str),
}
