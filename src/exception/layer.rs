use crate::exception::{ExceptionFilter, Failure, FilterOutcome};
use crate::validation::ModelStateHandle;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Tower Layer running an [`ExceptionFilter`] over failed requests
///
/// Every request gets a fresh [`ModelStateHandle`] in its extensions. A
/// failure reaches the filter either as an inner service error or as a
/// response produced by `Failure::into_response`; the filter's outcome then
/// replaces the response. Successful responses pass through untouched.
///
/// # Example
/// ```
/// use api_exception_filter::exception::{Failure, http::ApiExceptionFilter, layer::ExceptionFilterLayer};
/// use axum::{Router, routing::get};
///
/// async fn find_widget() -> Result<String, Failure> {
///     Err(Failure::not_found("widget 7 missing"))
/// }
///
/// let app: Router = Router::new()
///     .route("/widgets/7", get(find_widget))
///     .layer(ExceptionFilterLayer::new(ApiExceptionFilter::default()));
/// ```
pub struct ExceptionFilterLayer<F> {
    filter: Arc<F>,
}

impl<F: ExceptionFilter> ExceptionFilterLayer<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    /// Share a filter that is already behind an `Arc`
    pub fn from_arc(filter: Arc<F>) -> Self {
        Self { filter }
    }
}

impl<F> Clone for ExceptionFilterLayer<F> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
        }
    }
}

impl<S, F> Layer<S> for ExceptionFilterLayer<F> {
    type Service = ExceptionFilterMiddleware<S, F>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionFilterMiddleware {
            inner,
            filter: self.filter.clone(),
        }
    }
}

pub struct ExceptionFilterMiddleware<S, F> {
    inner: S,
    filter: Arc<F>,
}

impl<S: Clone, F> Clone for ExceptionFilterMiddleware<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<S, F> Service<Request<Body>> for ExceptionFilterMiddleware<S, F>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    F: ExceptionFilter,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the inner service is awaited in `call` so its errors become failures.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let filter = self.filter.clone();
        let inner = self.inner.clone();

        let model_state = ModelStateHandle::new();
        request.extensions_mut().insert(model_state.clone());

        Box::pin(async move {
            let failure = match inner.oneshot(request).await {
                Ok(mut response) => match response.extensions_mut().remove::<Failure>() {
                    Some(failure) => failure,
                    None => return Ok::<_, Infallible>(response),
                },
                Err(error) => Failure::from_boxed(error.into()),
            };

            let FilterOutcome { problem, handled } = filter.catch(&failure, &model_state.snapshot());
            if handled {
                Ok(problem.into_response())
            } else {
                Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
            }
        })
    }
}
