use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{donation::PaymentOutcome, error::PipelineError, submission::Submission},
    },
    axum::{
        Json, Router,
        extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
        routing::{get, post},
    },
    std::time::Duration,
    tower::ServiceBuilder,
    tower_http::timeout::TimeoutLayer,
};

#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub fn router(state: AppState, limits: HttpLimits) -> Router {
    Router::new()
        .route("/", post(pay_for_open_source_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::new(limits.request_timeout))
                .layer(DefaultBodyLimit::max(limits.max_body_bytes)),
        )
        .with_state(state)
}

/// Drain a multipart form into a [`Submission`]. Parts with a filename are
/// uploads; the rest are text.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission, PipelineError> {
    let mut submission = Submission::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::MalformedBody(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.file_name().map(str::to_owned) {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| PipelineError::MalformedBody(e.body_text()))?;
                submission.insert_upload(name, filename, bytes.to_vec());
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| PipelineError::MalformedBody(e.body_text()))?;
                submission.insert_text(name, text);
            }
        }
    }

    Ok(submission)
}

#[tracing::instrument(name = "pay_for_open_source_http", skip_all)]
pub async fn pay_for_open_source_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PaymentOutcome>, ApiError> {
    let multipart = multipart.map_err(|e| PipelineError::MalformedBody(e.body_text()))?;
    let submission = read_submission(multipart).await?;
    let outcome = state.pipeline.pay_for_open_source(&submission).await?;
    Ok(Json(outcome))
}
