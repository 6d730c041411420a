//! Activity Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Activity, UserRole};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_ACTIVITY: &str = "SELECT id, actor, action, category, message, target_id, recipient_role, is_read, created_at FROM activities";

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor: String,
    pub action: String,
    /// Defaults to the action prefix (`employee` for `employee.created`)
    pub category: Option<String>,
    pub message: String,
    pub target_id: Option<String>,
    pub recipient_role: Option<UserRole>,
}

/// Who is reading the feed
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub username: &'a str,
    pub role: UserRole,
}

impl Viewer<'_> {
    fn sees_everything(&self) -> bool {
        self.role.is_manager()
    }
}

fn category_of(action: &str) -> &str {
    action.split('.').next().unwrap_or(action)
}

/// Clamp a requested page size to `1..=MAX_LIMIT`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub async fn create(pool: &SqlitePool, data: NewActivity) -> RepoResult<Activity> {
    let category = data
        .category
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| category_of(&data.action).to_string());
    let now = shared::util::now_millis();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO activities (actor, action, category, message, target_id, recipient_role, is_read, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7) RETURNING id",
    )
    .bind(&data.actor)
    .bind(&data.action)
    .bind(&category)
    .bind(&data.message)
    .bind(&data.target_id)
    .bind(data.recipient_role)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let sql = format!("{SELECT_ACTIVITY} WHERE id = ?");
    let activity = sqlx::query_as::<_, Activity>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(activity)
}

/// Record an activity without failing the caller
///
/// Mutating handlers call this after their write succeeded; a failure here
/// is logged and swallowed.
pub async fn record(
    pool: &SqlitePool,
    actor: &str,
    action: &str,
    message: impl Into<String>,
    target_id: Option<&str>,
    recipient_role: Option<UserRole>,
) {
    let data = NewActivity {
        actor: actor.to_string(),
        action: action.to_string(),
        category: None,
        message: message.into(),
        target_id: target_id.map(str::to_string),
        recipient_role,
    };
    if let Err(e) = create(pool, data).await {
        tracing::warn!(actor = %actor, action = %action, error = %e, "Failed to record activity");
    }
}

/// Feed for a viewer, newest first
///
/// Managers see everything; others see their own actions and entries
/// addressed to their role.
pub async fn find_visible(
    pool: &SqlitePool,
    viewer: Viewer<'_>,
    limit: Option<i64>,
) -> RepoResult<Vec<Activity>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ACTIVITY);
    if !viewer.sees_everything() {
        qb.push(" WHERE (actor = ")
            .push_bind(viewer.username.to_string())
            .push(" OR recipient_role = ")
            .push_bind(viewer.role)
            .push(")");
    }
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(clamp_limit(limit));

    let activities = qb.build_query_as::<Activity>().fetch_all(pool).await?;
    Ok(activities)
}

pub async fn mark_read(pool: &SqlitePool, id: i64, viewer: Viewer<'_>) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE activities SET is_read = 1 WHERE id = ?1 AND (?2 OR actor = ?3 OR recipient_role = ?4)",
    )
    .bind(id)
    .bind(viewer.sees_everything())
    .bind(viewer.username)
    .bind(viewer.role)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ActivityNotFound,
            format!("Activity {id} not found"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn viewer(username: &str, role: UserRole) -> Viewer<'_> {
        Viewer { username, role }
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(1000)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(10)), 10);
    }

    #[tokio::test]
    async fn test_record_derives_category() {
        let pool = test_pool().await;
        record(&pool, "admin", "employee.created", "Created E001", Some("E001"), None).await;

        let feed = find_visible(&pool, viewer("admin", UserRole::Admin), None)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].category, "employee");
        assert_eq!(feed[0].target_id.as_deref(), Some("E001"));
    }

    #[tokio::test]
    async fn test_employee_feed_is_scoped() {
        let pool = test_pool().await;
        record(&pool, "admin", "employee.created", "m", None, None).await;
        record(&pool, "ana", "leave.created", "m", None, Some(UserRole::Hr)).await;
        record(&pool, "hr", "task.created", "m", None, Some(UserRole::Employee)).await;

        let ana = find_visible(&pool, viewer("ana", UserRole::Employee), None)
            .await
            .unwrap();
        assert_eq!(ana.len(), 2);

        let hr = find_visible(&pool, viewer("hr", UserRole::Hr), Some(2))
            .await
            .unwrap();
        assert_eq!(hr.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_respects_visibility() {
        let pool = test_pool().await;
        let entry = create(
            &pool,
            NewActivity {
                actor: "admin".into(),
                action: "system.note".into(),
                category: Some("custom".into()),
                message: "m".into(),
                target_id: None,
                recipient_role: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(entry.category, "custom");

        assert!(mark_read(&pool, entry.id, viewer("ana", UserRole::Employee)).await.is_err());
        mark_read(&pool, entry.id, viewer("hr", UserRole::Hr)).await.unwrap();
    }
}
