use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while setting up a filter.
///
/// Request-time failures are never reported through this type; they are
/// [`Failure`](crate::exception::Failure)s and always end in a response.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

impl FilterError {
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}
