//! Notification Repository
//!
//! A notification targets one user or every user of a role. Read state is
//! stored on the row, so a role-wide notification read by one member is read
//! for the whole role.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Notification, NotificationCategory, NotificationCreate, UserRole};
use sqlx::SqlitePool;

const SELECT_NOTIFICATION: &str = "SELECT id, recipient_user_id, recipient_role, title, message, category, is_read, created_at FROM notifications";

/// Visibility predicate binding `?1` user id and `?2` role
const VISIBLE_TO: &str = "(recipient_user_id = ?1 OR recipient_role = ?2)";

pub async fn create(pool: &SqlitePool, data: NotificationCreate) -> RepoResult<Notification> {
    if data.recipient_user_id.is_some() == data.recipient_role.is_some() {
        return Err(RepoError::Validation(
            "Exactly one of recipient_user_id or recipient_role is required".into(),
        ));
    }
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO notifications (recipient_user_id, recipient_role, title, message, category, is_read, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6) RETURNING id",
    )
    .bind(data.recipient_user_id)
    .bind(data.recipient_role)
    .bind(&data.title)
    .bind(&data.message)
    .bind(data.category)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let sql = format!("{SELECT_NOTIFICATION} WHERE id = ?");
    let notification = sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(notification)
}

/// Best-effort notification to the account linked to an employee
///
/// Employees without an account get nothing. Failures are logged.
pub async fn notify_employee(
    pool: &SqlitePool,
    employee_id: &str,
    title: &str,
    message: &str,
    category: NotificationCategory,
) {
    let user_id: Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT id FROM users WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_optional(pool)
            .await;
    let user_id = match user_id {
        Ok(Some(id)) => id,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(employee_id = %employee_id, error = %e, "Failed to resolve notification recipient");
            return;
        }
    };
    let data = NotificationCreate {
        recipient_user_id: Some(user_id),
        recipient_role: None,
        title: title.to_string(),
        message: message.to_string(),
        category,
    };
    if let Err(e) = create(pool, data).await {
        tracing::warn!(employee_id = %employee_id, error = %e, "Failed to create notification");
    }
}

/// Best-effort notification to every user of a role
pub async fn notify_role(
    pool: &SqlitePool,
    role: UserRole,
    title: &str,
    message: &str,
    category: NotificationCategory,
) {
    let data = NotificationCreate {
        recipient_user_id: None,
        recipient_role: Some(role),
        title: title.to_string(),
        message: message.to_string(),
        category,
    };
    if let Err(e) = create(pool, data).await {
        tracing::warn!(role = %role, error = %e, "Failed to create notification");
    }
}

/// Notifications visible to a user, newest first
pub async fn find_for_user(
    pool: &SqlitePool,
    user_id: i64,
    role: UserRole,
    unread_only: bool,
) -> RepoResult<Vec<Notification>> {
    let mut sql = format!("{SELECT_NOTIFICATION} WHERE {VISIBLE_TO}");
    if unread_only {
        sql.push_str(" AND is_read = 0");
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .bind(role)
        .fetch_all(pool)
        .await?;
    Ok(notifications)
}

pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64, role: UserRole) -> RepoResult<()> {
    let sql = format!("UPDATE notifications SET is_read = 1 WHERE id = ?3 AND {VISIBLE_TO}");
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::NotificationNotFound,
            format!("Notification {id} not found"),
        ));
    }
    Ok(())
}

/// Mark everything visible to the user as read; returns the count changed
pub async fn mark_all_read(pool: &SqlitePool, user_id: i64, role: UserRole) -> RepoResult<u64> {
    let sql = format!("UPDATE notifications SET is_read = 1 WHERE is_read = 0 AND {VISIBLE_TO}");
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::db::repository::user::{self, NewUser};

    async fn seed_user(pool: &SqlitePool, username: &str, role: UserRole) -> i64 {
        user::create(
            pool,
            NewUser {
                username: username.into(),
                email: format!("{username}@ems.local"),
                password_hash: "hash".into(),
                role,
                employee_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn to_user(id: i64, title: &str) -> NotificationCreate {
        NotificationCreate {
            recipient_user_id: Some(id),
            recipient_role: None,
            title: title.into(),
            message: "body".into(),
            category: NotificationCategory::Task,
        }
    }

    #[tokio::test]
    async fn test_recipient_must_be_exactly_one() {
        let pool = test_pool().await;
        let mut both = to_user(1, "x");
        both.recipient_role = Some(UserRole::Hr);
        assert!(matches!(create(&pool, both).await, Err(RepoError::Validation(_))));

        let mut neither = to_user(1, "x");
        neither.recipient_user_id = None;
        assert!(matches!(create(&pool, neither).await, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_visibility_by_user_and_role() {
        let pool = test_pool().await;
        let hr = seed_user(&pool, "hr1", UserRole::Hr).await;
        let emp = seed_user(&pool, "emp1", UserRole::Employee).await;

        create(&pool, to_user(emp, "for emp")).await.unwrap();
        notify_role(&pool, UserRole::Hr, "for hr", "body", NotificationCategory::Leave).await;

        let hr_list = find_for_user(&pool, hr, UserRole::Hr, false).await.unwrap();
        assert_eq!(hr_list.len(), 1);
        assert_eq!(hr_list[0].title, "for hr");

        let emp_list = find_for_user(&pool, emp, UserRole::Employee, false).await.unwrap();
        assert_eq!(emp_list.len(), 1);
        assert_eq!(emp_list[0].title, "for emp");
    }

    #[tokio::test]
    async fn test_mark_read_only_own() {
        let pool = test_pool().await;
        let a = seed_user(&pool, "a", UserRole::Employee).await;
        let b = seed_user(&pool, "b", UserRole::Employee).await;
        let n = create(&pool, to_user(a, "hello")).await.unwrap();

        assert!(mark_read(&pool, n.id, b, UserRole::Employee).await.is_err());
        mark_read(&pool, n.id, a, UserRole::Employee).await.unwrap();
        assert!(find_for_user(&pool, a, UserRole::Employee, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_all_read_counts() {
        let pool = test_pool().await;
        let a = seed_user(&pool, "a", UserRole::Employee).await;
        create(&pool, to_user(a, "1")).await.unwrap();
        create(&pool, to_user(a, "2")).await.unwrap();
        notify_role(&pool, UserRole::Employee, "all", "body", NotificationCategory::System).await;

        assert_eq!(mark_all_read(&pool, a, UserRole::Employee).await.unwrap(), 3);
        assert_eq!(mark_all_read(&pool, a, UserRole::Employee).await.unwrap(), 0);
    }
}
