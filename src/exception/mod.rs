use crate::common::ProblemDetails;
use crate::validation::ValidationState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use strum_macros::{AsRefStr, Display, EnumIter};

pub mod http;
pub mod layer;

/// Classification of a raised failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum FailureKind {
    NotFound,
    Unauthorized,
    Forbidden,
    /// The resource being created already exists
    Conflict,
    ValidationFailed,
    Unknown,
}

/// A failure raised while handling a request
///
/// Failures are created where a business rule is violated and travel up
/// unchanged until an [`ExceptionFilter`] turns them into a response.
///
/// # Example
/// ```
/// use api_exception_filter::exception::{Failure, FailureKind};
///
/// let failure = Failure::not_found("widget 7 missing").not_logged();
/// assert_eq!(failure.kind(), FailureKind::NotFound);
/// assert!(failure.is_not_logged());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
    not_logged: bool,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            not_logged: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ValidationFailed, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unknown, message)
    }

    /// Mark the failure as expected so the filter does not trace it
    pub fn not_logged(mut self) -> Self {
        self.not_logged = true;
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_logged(&self) -> bool {
        self.not_logged
    }

    /// Recover a failure from a type-erased error
    ///
    /// A boxed `Failure` is returned as is; anything else becomes
    /// [`FailureKind::Unknown`] carrying the error's display text.
    pub fn from_boxed(error: Box<dyn Error + Send + Sync>) -> Self {
        match error.downcast::<Failure>() {
            Ok(failure) => *failure,
            Err(other) => Self::unknown(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<Failure>() {
            Ok(failure) => failure,
            Err(other) => Self::unknown(other.to_string()),
        }
    }
}

/// Hands the failure to `ExceptionFilterLayer`.
///
/// The 500 produced here is a placeholder; the layer replaces it with the
/// filter's response. Without the layer the client sees a bare 500.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Result of running a filter over a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub problem: ProblemDetails,
    /// Suppresses the pipeline's default error handling
    pub handled: bool,
}

impl FilterOutcome {
    pub fn handled(problem: ProblemDetails) -> Self {
        Self {
            problem,
            handled: true,
        }
    }
}

/// The ExceptionFilter trait
///
/// Filters translate failures raised during request processing into a
/// response body. They must not mutate any shared state; the caller applies
/// the outcome to its own response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch a failure and decide what the client receives
    fn catch(&self, failure: &Failure, validation: &dyn ValidationState) -> FilterOutcome;
}
