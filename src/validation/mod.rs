//! Per-request validation state
//!
//! Field-level input errors are collected independently of raised failures.
//! When a request fails, the exception filter consults this state to decide
//! whether the failure is reported as a validation problem.

use crate::common::FieldErrors;
use crate::exception::Failure;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Read-only view of a request's validation outcome
pub trait ValidationState {
    fn is_valid(&self) -> bool;

    /// Field errors in the order they were recorded
    fn field_errors(&self) -> &FieldErrors;
}

/// Field-level errors recorded while processing a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    errors: FieldErrors,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against `field`
    ///
    /// Messages for the same field accumulate in call order.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Total number of messages across all fields
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl ValidationState for ModelState {
    fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }
}

/// Shared handle to the [`ModelState`] of the request in flight
///
/// `ExceptionFilterLayer` inserts one into every request's extensions.
#[derive(Debug, Clone, Default)]
pub struct ModelStateHandle(Arc<Mutex<ModelState>>);

impl ModelStateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&self, field: impl Into<String>, message: impl Into<String>) {
        self.lock().add_error(field, message);
    }

    pub fn is_valid(&self) -> bool {
        self.lock().is_valid()
    }

    /// Copy of the state as it stands now
    pub fn snapshot(&self) -> ModelState {
        self.lock().clone()
    }

    // A handler that panicked mid-update leaves the errors it managed to add.
    fn lock(&self) -> MutexGuard<'_, ModelState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Axum extractor giving a handler access to the request's validation state
///
/// # Example
/// ```
/// use api_exception_filter::exception::Failure;
/// use api_exception_filter::validation::Validation;
///
/// async fn create_user(validation: Validation) -> Result<(), Failure> {
///     validation.add_error("email", "is required");
///     Err(Failure::unknown("user payload rejected"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validation(pub ModelStateHandle);

impl<S> FromRequestParts<S> for Validation
where
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ModelStateHandle>()
            .cloned()
            .map(Validation)
            .ok_or_else(|| {
                Failure::unknown("validation state unavailable: ExceptionFilterLayer is not installed")
            })
    }
}

impl std::ops::Deref for Validation {
    type Target = ModelStateHandle;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
