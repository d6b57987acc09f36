use crate::common::ProblemDetails;
use crate::config::FilterOptions;
use crate::exception::{ExceptionFilter, Failure, FailureKind, FilterOutcome};
use crate::trace::{TraceService, TracingTraceService};
use crate::validation::ValidationState;
use axum::http::StatusCode;
use std::sync::Arc;

pub const NOT_FOUND_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.4";
pub const UNAUTHORIZED_TYPE: &str = "https://tools.ietf.org/html/rfc7235#section-3.1";
pub const FORBIDDEN_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.3";
pub const CONFLICT_TYPE: &str = "https://tools.ietf.org/html/rfc7231#page-60";
pub const VALIDATION_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.1";
pub const INTERNAL_ERROR_TYPE: &str = "https://tools.ietf.org/html/rfc7231#section-6.6.1";

/// When a handled failure is passed to the trace service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TracePolicy {
    /// Skip failures marked `not_logged`
    UnlessNotLogged,
    Always,
}

/// Entry of the kind → handler table
#[derive(Clone, Copy)]
struct KnownHandler {
    policy: TracePolicy,
    build: fn(&ApiExceptionFilter, &Failure) -> ProblemDetails,
}

/// Translates failures into problem-details responses
///
/// Dispatch order, first match wins:
/// 1. kinds with a registered handler (not found, unauthorized, forbidden,
///    conflict), traced according to the handler's policy;
/// 2. an invalid validation state, reported as a 400 with its field errors;
/// 3. everything else, reported as a generic 500.
///
/// # Example
/// ```
/// use api_exception_filter::exception::{Failure, http::ApiExceptionFilter};
/// use api_exception_filter::validation::ModelState;
/// use axum::http::StatusCode;
/// use std::sync::Arc;
///
/// let filter = ApiExceptionFilter::new(Arc::new(|message: &str| println!("trace: {message}")));
/// let problem = filter.handle(&Failure::not_found("widget 7 missing"), &ModelState::new());
///
/// assert_eq!(problem.status, StatusCode::NOT_FOUND);
/// assert_eq!(problem.detail.as_deref(), Some("widget 7 missing"));
/// ```
#[derive(Clone)]
pub struct ApiExceptionFilter {
    trace: Arc<dyn TraceService>,
    options: FilterOptions,
}

impl ApiExceptionFilter {
    pub fn new(trace: Arc<dyn TraceService>) -> Self {
        Self {
            trace,
            options: FilterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Produce the response body for `failure`
    pub fn handle(&self, failure: &Failure, validation: &dyn ValidationState) -> ProblemDetails {
        let problem = if let Some(handler) = Self::handler_for(failure.kind()) {
            let traced = match handler.policy {
                TracePolicy::Always => true,
                TracePolicy::UnlessNotLogged => !failure.is_not_logged(),
            };
            if traced {
                self.trace.trace(failure.message());
            }
            (handler.build)(self, failure)
        } else if !validation.is_valid() {
            Self::validation_problem(validation)
        } else {
            Self::unknown_problem()
        };

        tracing::debug!(
            "Failure {} translated to {}",
            failure.kind(),
            problem.status
        );
        problem
    }

    fn handler_for(kind: FailureKind) -> Option<KnownHandler> {
        let handler = match kind {
            FailureKind::NotFound => KnownHandler {
                policy: TracePolicy::UnlessNotLogged,
                build: Self::not_found_problem,
            },
            FailureKind::Unauthorized => KnownHandler {
                policy: TracePolicy::UnlessNotLogged,
                build: Self::unauthorized_problem,
            },
            FailureKind::Forbidden => KnownHandler {
                policy: TracePolicy::UnlessNotLogged,
                build: Self::forbidden_problem,
            },
            // Traced even when marked not_logged.
            FailureKind::Conflict => KnownHandler {
                policy: TracePolicy::Always,
                build: Self::conflict_problem,
            },
            FailureKind::ValidationFailed | FailureKind::Unknown => return None,
        };
        Some(handler)
    }

    fn not_found_problem(&self, failure: &Failure) -> ProblemDetails {
        ProblemDetails::new(
            StatusCode::NOT_FOUND,
            "The specified resource was not found.",
            NOT_FOUND_TYPE,
        )
        .with_detail(failure.message())
    }

    fn unauthorized_problem(&self, _failure: &Failure) -> ProblemDetails {
        ProblemDetails::new(StatusCode::UNAUTHORIZED, "Unauthorized", UNAUTHORIZED_TYPE)
    }

    fn forbidden_problem(&self, _failure: &Failure) -> ProblemDetails {
        ProblemDetails::new(StatusCode::FORBIDDEN, "Forbidden", FORBIDDEN_TYPE)
    }

    fn conflict_problem(&self, _failure: &Failure) -> ProblemDetails {
        ProblemDetails::new(StatusCode::CONFLICT, "Conflict.", CONFLICT_TYPE)
            .with_detail(self.options.conflict_detail())
    }

    fn validation_problem(validation: &dyn ValidationState) -> ProblemDetails {
        ProblemDetails::new(
            StatusCode::BAD_REQUEST,
            "One or more validation errors occurred.",
            VALIDATION_TYPE,
        )
        .with_errors(validation.field_errors().clone())
    }

    fn unknown_problem() -> ProblemDetails {
        ProblemDetails::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An error occurred while processing your request.",
            INTERNAL_ERROR_TYPE,
        )
    }
}

impl Default for ApiExceptionFilter {
    fn default() -> Self {
        Self::new(Arc::new(TracingTraceService))
    }
}

impl ExceptionFilter for ApiExceptionFilter {
    fn catch(&self, failure: &Failure, validation: &dyn ValidationState) -> FilterOutcome {
        FilterOutcome::handled(self.handle(failure, validation))
    }
}
