// src/handlers/tasks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::ApiJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::task::{EmployeeTaskCounts, TaskView},
    services::task_service::{scoped_filter, TaskChanges},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, max = 200, message = "El título es obligatorio (máx. 200)."))]
    pub title: String,
    #[validate(length(max = 1000, message = "La descripción no puede superar 1000 caracteres."))]
    pub description: Option<String>,
    /// Empregado responsável; se ausente, o próprio usuário.
    pub employee_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskPayload {
    #[validate(length(min = 1, max = 200, message = "El título es obligatorio (máx. 200)."))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "La descripción no puede superar 1000 caracteres."))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    /// Só para o dono.
    pub employee_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/tareas",
    tag = "Tasks",
    params(TaskQuery),
    responses((status = 200, description = "Tarefas visíveis ao usuário", body = Vec<TaskView>)),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<TaskView>>, AppError> {
    let filter = scoped_filter(&caller, query.employee_id, query.completed, query.limit, query.offset);
    Ok(Json(app_state.task_service.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/tareas/{id}",
    tag = "Tasks",
    responses(
        (status = 200, description = "Tarefa", body = TaskView),
        (status = 403, description = "Tarefa de outro empregado"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da tarefa")),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskView>, AppError> {
    Ok(Json(app_state.task_service.get(&caller, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/tareas",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = TaskView),
        (status = 403, description = "Empregado criando tarefa para outro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ApiJson(payload): ApiJson<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let task = app_state
        .task_service
        .create(&caller, &payload.title, payload.description.as_deref(), payload.employee_id)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    patch,
    path = "/api/tareas/{id}",
    tag = "Tasks",
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Tarefa atualizada", body = TaskView),
        (status = 403, description = "Tarefa de outro empregado"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da tarefa")),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateTaskPayload>,
) -> Result<Json<TaskView>, AppError> {
    payload.validate()?;
    let changes = TaskChanges {
        title: payload.title,
        description: payload.description,
        completed: payload.completed,
    };
    Ok(Json(app_state.task_service.update(&caller, id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tareas/{id}",
    tag = "Tasks",
    responses(
        (status = 204, description = "Tarefa removida"),
        (status = 403, description = "Tarefa de outro empregado"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da tarefa")),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.task_service.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/empleados",
    tag = "Tasks",
    responses(
        (status = 200, description = "Empregados com contagem de tarefas", body = Vec<EmployeeTaskCounts>),
        (status = 403, description = "Só o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<EmployeeTaskCounts>>, AppError> {
    if !caller.is_owner() {
        return Err(AppError::Forbidden("Acceso restringido al dueño.".to_string()));
    }
    Ok(Json(app_state.task_service.employee_task_counts().await?))
}
