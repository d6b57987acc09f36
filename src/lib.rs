//! # api-exception-filter
//!
//! Translates failures that escape request handlers into RFC 7807
//! problem-details responses, logging only the failures worth recording.
//!
//! ## Features
//!
//! - **Typed failures**: [`Failure`] carries a [`FailureKind`] and an optional
//!   "not logged" flag for expected conditions
//! - **Fixed dispatch**: not found, unauthorized, forbidden and conflict map to
//!   404/401/403/409; anything else becomes a 400 when the request collected
//!   validation errors, or a 500 otherwise
//! - **Selective tracing**: failures are handed to a [`TraceService`] at most
//!   once, and conflicts are always traced
//! - **Axum integration**: [`ExceptionFilterLayer`] wires a filter into any
//!   router, and the [`Validation`] extractor records field errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use api_exception_filter::prelude::*;
//!
//! async fn create_widget(validation: Validation) -> Result<Json<&'static str>, Failure> {
//!     validation.add_error("name", "is required");
//!     Err(Failure::unknown("widget payload rejected"))
//! }
//!
//! async fn get_widget(Path(id): Path<u32>) -> Result<Json<u32>, Failure> {
//!     Err(Failure::not_found(format!("widget {id} missing")))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = FilterOptions::from_config(&ConfigService::new()).unwrap();
//!     let filter = ApiExceptionFilter::default().with_options(options);
//!
//!     let app: Router = Router::new()
//!         .route("/widgets", axum::routing::post(create_widget))
//!         .route("/widgets/{id}", axum::routing::get(get_widget))
//!         .layer(ExceptionFilterLayer::new(filter));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod exception;
pub mod trace;
pub mod validation;

// Re-export core types
pub use common::ProblemDetails;
pub use config::{ConfigService, FilterOptions, Locale};
pub use error::{FilterError, Result};
pub use exception::http::ApiExceptionFilter;
pub use exception::layer::ExceptionFilterLayer;
pub use exception::{ExceptionFilter, Failure, FailureKind, FilterOutcome};
pub use trace::{TraceService, TracingTraceService};
pub use validation::{ModelState, ModelStateHandle, Validation, ValidationState};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use api_exception_filter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{FieldErrors, ProblemDetails};
    pub use crate::config::{ConfigService, FilterOptions, Locale};
    pub use crate::error::FilterError;
    pub use crate::exception::http::ApiExceptionFilter;
    pub use crate::exception::layer::ExceptionFilterLayer;
    pub use crate::exception::{ExceptionFilter, Failure, FailureKind, FilterOutcome};
    pub use crate::trace::{TraceService, TracingTraceService};
    pub use crate::validation::{ModelState, ModelStateHandle, Validation, ValidationState};
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
