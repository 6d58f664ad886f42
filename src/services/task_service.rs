// src/services/task_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{clamp_limit, clamp_offset},
    },
    db::{TaskRepository, UserRepository},
    models::{
        auth::Caller,
        task::{EmployeeTaskCounts, TaskFilter, TaskView},
    },
};

/// Monta o filtro efetivo: empregado sempre vê só as próprias tarefas,
/// o filtro por empregado é exclusivo do dono.
pub fn scoped_filter(
    caller: &Caller,
    employee_id: Option<i64>,
    completed: Option<bool>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> TaskFilter {
    TaskFilter {
        employee_id: if caller.is_owner() { employee_id } else { Some(caller.id) },
        completed,
        limit: clamp_limit(limit),
        offset: clamp_offset(offset),
    }
}

// Alterações parciais vindas do PATCH.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Descrição vazia limpa o campo; ausente mantém a atual.
fn merged_description<'a>(change: Option<&'a str>, current: Option<&'a str>) -> Option<&'a str> {
    match change.map(str::trim) {
        Some("") => None,
        Some(text) => Some(text),
        None => current,
    }
}

#[derive(Clone)]
pub struct TaskService {
    task_repo: TaskRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl TaskService {
    pub fn new(task_repo: TaskRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { task_repo, user_repo, pool }
    }

    pub async fn create(
        &self,
        caller: &Caller,
        title: &str,
        description: Option<&str>,
        employee_id: Option<i64>,
    ) -> Result<TaskView, AppError> {
        let employee_id = employee_id.unwrap_or(caller.id);
        if !caller.can_access(employee_id) {
            return Err(AppError::Forbidden(
                "Solo puede crear tareas para usted mismo.".to_string(),
            ));
        }

        if self.user_repo.find_by_id(&self.pool, employee_id).await?.is_none() {
            return Err(AppError::ReferenceNotFound("Empleado no encontrado.".to_string()));
        }

        let task = self.task_repo
            .create(&self.pool, title.trim(), description, employee_id, caller.id)
            .await?;
        tracing::info!("Tarefa {} criada para o empregado {}", task.task.id, employee_id);
        Ok(task)
    }

    pub async fn get(&self, caller: &Caller, id: i64) -> Result<TaskView, AppError> {
        let task = self.task_repo
            .find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tarea no encontrada.".to_string()))?;
        if !caller.can_access(task.task.employee_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta tarea.".to_string()));
        }
        Ok(task)
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskView>, AppError> {
        self.task_repo.list(filter).await
    }

    pub async fn update(&self, caller: &Caller, id: i64, changes: TaskChanges) -> Result<TaskView, AppError> {
        let current = self.get(caller, id).await?.task;

        let title = changes.title.as_deref().map(str::trim).unwrap_or(current.title.as_str());
        let description = merged_description(changes.description.as_deref(), current.description.as_deref());
        let completed = changes.completed.unwrap_or(current.completed);

        self.task_repo
            .update(&self.pool, id, title, description, completed)
            .await?
            .ok_or_else(|| AppError::NotFound("Tarea no encontrada.".to_string()))
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        self.get(caller, id).await?;
        if !self.task_repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("Tarea no encontrada.".to_string()));
        }
        Ok(())
    }

    pub async fn employee_task_counts(&self) -> Result<Vec<EmployeeTaskCounts>, AppError> {
        self.task_repo.employee_task_counts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn caller(id: i64, role: Role) -> Caller {
        Caller { id, email: format!("{id}@vartan.test"), role }
    }

    #[test]
    fn employee_filter_is_forced_to_self() {
        let filter = scoped_filter(&caller(4, Role::Employee), Some(9), Some(false), None, None);
        assert_eq!(filter.employee_id, Some(4));
        assert_eq!(filter.completed, Some(false));
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn owner_may_filter_by_any_employee() {
        let filter = scoped_filter(&caller(1, Role::Owner), Some(9), None, Some(500), Some(-3));
        assert_eq!(filter.employee_id, Some(9));
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset, 0);

        let unfiltered = scoped_filter(&caller(1, Role::Owner), None, None, Some(10), Some(20));
        assert_eq!(unfiltered.employee_id, None);
        assert_eq!((unfiltered.limit, unfiltered.offset), (10, 20));
    }

    #[test]
    fn empty_description_clears_and_missing_keeps() {
        assert_eq!(merged_description(Some("  "), Some("antiga")), None);
        assert_eq!(merged_description(None, Some("antiga")), Some("antiga"));
        assert_eq!(merged_description(Some(" nova "), Some("antiga")), Some("nova"));
    }
}
