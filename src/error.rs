/// Errors raised while resolving line parameters, before any run starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required key or per-type table entry is absent
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("quality shares of '{table}' sum to {total}, expected 100")]
    InvalidShares { table: String, total: f64 },

    #[error("quality shares of '{table}' contain a negative percentage")]
    NegativeShare { table: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("parameter document could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
