use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use db::models::do_task::{CreateDoTask, DoTask, DoTaskFilter, WorklistFilter};
use db::types::DoStatus;
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;
use workflow::{Actor, DoAction, ShipmentForm, WorkflowEngine, WorkflowError};

use crate::{AppState, error::ApiError, middleware::load_do_task_middleware};

pub mod dto;

use dto::DoTaskResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoListQuery {
    pub sales_admin_date: Option<NaiveDate>,
    pub delivery_date_start: Option<NaiveDate>,
    pub delivery_date_end: Option<NaiveDate>,
    pub status: Option<DoStatus>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklistQuery {
    pub sales_admin_date: Option<NaiveDate>,
    pub delivery_date_start: Option<NaiveDate>,
    pub delivery_date_end: Option<NaiveDate>,
}

impl From<WorklistQuery> for WorklistFilter {
    fn from(query: WorklistQuery) -> Self {
        Self {
            created_on: query.sales_admin_date,
            delivery_date_start: query.delivery_date_start,
            delivery_date_end: query.delivery_date_end,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDoRequest {
    pub sap_do_number: String,
    pub branch: String,
    pub delivery_date: NaiveDate,
    pub sales_admin_remarks: Option<String>,
    #[serde(default)]
    pub confirm_submission: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRemarksRequest {
    pub remarks: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Option<String>,
    pub task_id: Option<Uuid>,
    pub reason: Option<String>,
    pub form_data: Option<ShipmentForm>,
}

fn map_tasks(tasks: Vec<DoTask>) -> Vec<DoTaskResponse> {
    tasks.into_iter().map(DoTaskResponse::from).collect()
}

pub async fn get_dos(
    State(state): State<AppState>,
    Query(query): Query<DoListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<DoTaskResponse>>>, ApiError> {
    let filter = DoTaskFilter {
        created_on: query.sales_admin_date,
        delivery_date_start: query.delivery_date_start,
        delivery_date_end: query.delivery_date_end,
        status: query.status,
        branch: query.branch,
    };
    let tasks = DoTask::find_all(&state.db().pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(map_tasks(tasks))))
}

/// Unclaimed tasks any dispatcher may acknowledge.
pub async fn get_pool(
    State(state): State<AppState>,
    Query(query): Query<WorklistQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<DoTaskResponse>>>, ApiError> {
    let tasks = DoTask::find_pool(&state.db().pool, &query.into()).await?;
    Ok(ResponseJson(ApiResponse::success(map_tasks(tasks))))
}

/// Tasks the calling dispatcher owns in the current cycle.
pub async fn get_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<WorklistQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<DoTaskResponse>>>, ApiError> {
    let tasks = DoTask::find_mine(&state.db().pool, &actor.email, &query.into()).await?;
    Ok(ResponseJson(ApiResponse::success(map_tasks(tasks))))
}

pub async fn get_do(
    Extension(task): Extension<DoTask>,
) -> Result<ResponseJson<ApiResponse<DoTaskResponse>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task.into())))
}

pub async fn create_do(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateDoRequest>,
) -> Result<ResponseJson<ApiResponse<DoTaskResponse>>, ApiError> {
    if !payload.confirm_submission {
        return Ok(ResponseJson(ApiResponse::error("Please confirm submission")));
    }

    let id = Uuid::new_v4();
    tracing::debug!(%id, sap_do_number = %payload.sap_do_number, "Creating DO task");

    let task = DoTask::create(
        &state.db().pool,
        &CreateDoTask {
            sap_do_number: payload.sap_do_number,
            branch: payload.branch,
            delivery_date: payload.delivery_date,
            sales_admin_remarks: payload.sales_admin_remarks,
            sales_admin_name: actor.display_name,
            sales_admin_email: actor.email,
        },
        id,
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        task.into(),
        "DO created",
    )))
}

/// Single entry point for the five dispatcher workflow actions. Guard
/// failures come back as `success: false` on HTTP 200; malformed requests are
/// protocol errors.
pub async fn handle_action(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ActionRequest>,
) -> Result<ResponseJson<ApiResponse<DoTaskResponse>>, ApiError> {
    let action_name = payload
        .action
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::BadRequest("Missing action".to_string()))?;
    let task_id = payload
        .task_id
        .ok_or(ApiError::BadRequest("Missing taskId".to_string()))?;

    let action = DoAction::parse(action_name, payload.reason, payload.form_data)?;
    let message = action.success_message();

    match WorkflowEngine::apply(&state.db().pool, task_id, &actor, action).await {
        Ok(task) => Ok(ResponseJson(ApiResponse::success_with_message(
            task.into(),
            message,
        ))),
        Err(err @ WorkflowError::InvalidTransition { .. }) => {
            Ok(ResponseJson(ApiResponse::error(&err.to_string())))
        }
        Err(err) => Err(ApiError::from(err)),
    }
}

pub async fn update_remarks(
    Extension(task): Extension<DoTask>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateRemarksRequest>,
) -> Result<ResponseJson<ApiResponse<DoTaskResponse>>, ApiError> {
    let task = DoTask::update_remarks(&state.db().pool, task.id, payload.remarks).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        task.into(),
        "Remarks updated",
    )))
}

pub async fn delete_do(
    Extension(task): Extension<DoTask>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows = DoTask::delete(&state.db().pool, task.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("DO task not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "DO deleted",
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let do_actions_router = Router::new()
        .route("/remarks", put(update_remarks))
        .route("/", delete(delete_do));

    let do_id_router = Router::new()
        .route("/", get(get_do))
        .merge(do_actions_router)
        .layer(from_fn_with_state(
            state.clone(),
            load_do_task_middleware::<AppState>,
        ));

    let inner = Router::new()
        .route("/", get(get_dos).post(create_do))
        .route("/pool", get(get_pool))
        .route("/mine", get(get_mine))
        .route("/actions", post(handle_action))
        .nest("/{do_id}", do_id_router);

    Router::new().nest("/dos", inner)
}
