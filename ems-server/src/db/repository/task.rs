//! Task Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Task, TaskCreate, TaskQuery, TaskStatus, TaskUpdate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_TASK: &str = "SELECT t.id, t.title, t.description, t.assigned_to, e.name AS assignee_name, t.assigned_by, t.priority, t.status, t.due_date, t.completed_at, t.created_at, t.updated_at FROM tasks t LEFT JOIN employees e ON e.employee_id = t.assigned_to";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::TaskNotFound, format!("Task {id} not found"))
}

pub async fn find_all(pool: &SqlitePool, query: &TaskQuery) -> RepoResult<Vec<Task>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_TASK);
    qb.push(" WHERE 1 = 1");
    if let Some(status) = query.status {
        qb.push(" AND t.status = ").push_bind(status);
    }
    if let Some(assigned_to) = query.assigned_to.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND t.assigned_to = ").push_bind(assigned_to.to_string());
    }
    if let Some(priority) = query.priority {
        qb.push(" AND t.priority = ").push_bind(priority);
    }
    qb.push(" ORDER BY t.created_at DESC, t.id DESC");

    let tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
    Ok(tasks)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Task>> {
    let sql = format!("{SELECT_TASK} WHERE t.id = ?");
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Task> {
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Insert a task; `assigned_by` is the creator's employee id, if any
pub async fn create(
    pool: &SqlitePool,
    data: TaskCreate,
    assigned_by: Option<&str>,
) -> RepoResult<Task> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tasks (title, description, assigned_to, assigned_by, priority, status, due_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?7) RETURNING id",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.assigned_to)
    .bind(assigned_by)
    .bind(data.priority)
    .bind(data.due_date)
    .bind(now)
    .fetch_one(pool)
    .await?;

    get(pool, id).await
}

pub async fn update(pool: &SqlitePool, id: i64, data: TaskUpdate) -> RepoResult<Task> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tasks SET title = COALESCE(?1, title), description = COALESCE(?2, description), assigned_to = COALESCE(?3, assigned_to), priority = COALESCE(?4, priority), due_date = COALESCE(?5, due_date), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.assigned_to)
    .bind(data.priority)
    .bind(data.due_date)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    get(pool, id).await
}

/// Set the status; `completed_at` follows the completed state
///
/// Permission and transition checks happen in the handler, which knows the
/// caller's role. The UPDATE still guards on the status it saw.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    from: TaskStatus,
    next: TaskStatus,
) -> RepoResult<Task> {
    let now = shared::util::now_millis();
    let completed_at = (next == TaskStatus::Completed).then_some(now);

    let rows = sqlx::query(
        "UPDATE tasks SET status = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(next)
    .bind(completed_at)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        // Either gone or changed under us
        let current = get(pool, id).await?;
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Cannot change task status from {} to {}",
                current.status.as_str(),
                next.as_str()
            ),
        ));
    }
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::TaskPriority;

    async fn seed_employees(pool: &SqlitePool) {
        for (id, name, email) in [("E001", "Ana", "ana@example.com"), ("E002", "Ben", "ben@example.com")] {
            sqlx::query(
                "INSERT INTO employees (employee_id, name, email, department, position, salary, hire_date, status, created_at, updated_at) VALUES (?1, ?2, ?3, 'IT', 'Dev', 0, '2024-01-01', 'active', 0, 0)",
            )
            .bind(id)
            .bind(name)
            .bind(email)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    fn new_task(assignee: &str) -> TaskCreate {
        TaskCreate {
            title: "Write report".into(),
            description: None,
            assigned_to: assignee.into(),
            priority: TaskPriority::High,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_filter() {
        let pool = test_pool().await;
        seed_employees(&pool).await;

        let task = create(&pool, new_task("E002"), Some("E001")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assignee_name.as_deref(), Some("Ben"));
        assert_eq!(task.assigned_by.as_deref(), Some("E001"));

        create(&pool, new_task("E001"), None).await.unwrap();
        let for_ben = find_all(
            &pool,
            &TaskQuery {
                assigned_to: Some("E002".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(for_ben.len(), 1);
        assert_eq!(for_ben[0].id, task.id);
    }

    #[tokio::test]
    async fn test_unknown_assignee_is_rejected() {
        let pool = test_pool().await;
        let err = create(&pool, new_task("E999"), None).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_completion_sets_and_reopen_clears_completed_at() {
        let pool = test_pool().await;
        seed_employees(&pool).await;
        let task = create(&pool, new_task("E001"), None).await.unwrap();

        let done = update_status(&pool, task.id, TaskStatus::Pending, TaskStatus::Completed)
            .await
            .unwrap();
        assert!(done.completed_at.is_some());

        // Stale `from` is rejected
        let err = update_status(&pool, task.id, TaskStatus::Pending, TaskStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidStatusTransition, _)));

        let reopened = update_status(&pool, task.id, TaskStatus::Completed, TaskStatus::Pending)
            .await
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = test_pool().await;
        seed_employees(&pool).await;
        let task = create(&pool, new_task("E001"), None).await.unwrap();

        let updated = update(
            &pool,
            task.id,
            TaskUpdate {
                title: Some("Write final report".into()),
                assigned_to: Some("E002".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Write final report");
        assert_eq!(updated.assigned_to, "E002");
        assert_eq!(updated.priority, TaskPriority::High);

        delete(&pool, task.id).await.unwrap();
        assert!(matches!(
            get(&pool, task.id).await.unwrap_err(),
            RepoError::Business(ErrorCode::TaskNotFound, _)
        ));
    }
}
