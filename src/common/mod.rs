pub mod problem;

pub use problem::{FieldErrors, ProblemDetails, APPLICATION_PROBLEM_JSON};
