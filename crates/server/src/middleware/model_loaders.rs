use std::{fmt::Display, future::Future};

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::{DBService, models::do_task::DoTask};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for AppState {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_error<M, E, Fut>(
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<M, ApiError>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(ApiError::NotFound(format!("{model_name} not found")))
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(ApiError::Internal(format!("Failed to fetch {model_name}")))
        }
    }
}

/// Resolves the `{do_id}` path segment to a task and stores it as a request
/// extension, so every nested handler starts from a loaded record.
pub async fn load_do_task_middleware<S>(
    State(state): State<S>,
    Path(do_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let task = fetch_model_or_error(
        "DO task",
        do_id,
        DoTask::find_by_id(&state.db_service().pool, do_id),
    )
    .await?;
    let mut request = request;
    request.extensions_mut().insert(task);
    Ok(next.run(request).await)
}
