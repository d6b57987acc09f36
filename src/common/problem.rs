use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Media type of a problem-details body
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Field name mapped to its error messages, both in insertion order.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Structured error body following RFC 7807
///
/// Every failure that reaches the exception filter leaves as one of these.
///
/// # Example
/// ```
/// use api_exception_filter::common::ProblemDetails;
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     StatusCode::NOT_FOUND,
///     "The specified resource was not found.",
///     "https://tools.ietf.org/html/rfc7231#section-6.5.4",
/// )
/// .with_detail("widget 7 missing");
///
/// assert_eq!(problem.status, StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,

    pub title: String,

    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, title: impl Into<String>, type_uri: impl Into<String>) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status,
            detail: None,
            errors: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
            Json(self),
        )
            .into_response()
    }
}
