//! User Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{User, UserRole};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT_USER: &str = "SELECT id, username, email, password_hash, role, employee_id, is_active, last_login, created_at, updated_at FROM users";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub employee_id: Option<String>,
}

/// Credential changes for [`upsert_credentials`]; password already hashed
#[derive(Debug, Clone, Default)]
pub struct CredentialChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Login lookup: username or email, case-insensitive
pub async fn find_by_login(pool: &SqlitePool, login: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE username = ?1 OR email = ?1 LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(login)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_employee_id(pool: &SqlitePool, employee_id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE employee_id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Whether a username is taken by someone other than `exclude_user_id`
pub async fn username_exists(
    pool: &SqlitePool,
    username: &str,
    exclude_user_id: Option<i64>,
) -> RepoResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = ?1 AND (?2 IS NULL OR id <> ?2)")
            .bind(username)
            .bind(exclude_user_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn count_by_role(pool: &SqlitePool, role: UserRole) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a user on an open connection or transaction
pub async fn insert(conn: &mut SqliteConnection, data: NewUser) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, employee_id, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6) RETURNING id",
    )
    .bind(&data.username)
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(data.role)
    .bind(&data.employee_id)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let mut conn = pool.acquire().await?;
    let id = insert(&mut conn, data).await?;
    drop(conn);
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {id} not found"),
        ));
    }
    Ok(())
}

/// Update the linked account of an employee, creating it when missing
///
/// Creating requires both a username and a password; the account inherits
/// the employee's email.
pub async fn upsert_credentials(
    pool: &SqlitePool,
    employee_id: &str,
    employee_email: &str,
    changes: CredentialChanges,
) -> RepoResult<User> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?1, username), password_hash = COALESCE(?2, password_hash), role = COALESCE(?3, role), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE employee_id = ?6",
    )
    .bind(&changes.username)
    .bind(&changes.password_hash)
    .bind(changes.role)
    .bind(changes.is_active)
    .bind(now)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        let (Some(username), Some(password_hash)) = (changes.username, changes.password_hash)
        else {
            return Err(RepoError::Validation(
                "Employee has no account yet: username and password are required".into(),
            ));
        };
        let id = insert(
            &mut tx,
            NewUser {
                username,
                email: employee_email.to_string(),
                password_hash,
                role: changes.role.unwrap_or_default(),
                employee_id: Some(employee_id.to_string()),
            },
        )
        .await?;
        if changes.is_active == Some(false) {
            sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    find_by_employee_id(pool, employee_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to load updated account".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn admin(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{username}@ems.local"),
            password_hash: "hash".into(),
            role: UserRole::Admin,
            employee_id: None,
        }
    }

    async fn insert_employee(pool: &SqlitePool, employee_id: &str, email: &str) {
        sqlx::query(
            "INSERT INTO employees (employee_id, name, email, department, position, salary, hire_date, status, created_at, updated_at) VALUES (?1, 'Test', ?2, 'IT', 'Dev', 0, '2024-01-01', 'active', 0, 0)",
        )
        .bind(employee_id)
        .bind(email)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_login_lookup() {
        let pool = test_pool().await;
        let user = create(&pool, admin("root")).await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.is_active);

        assert_eq!(find_by_login(&pool, "root").await.unwrap().unwrap().id, user.id);
        assert_eq!(
            find_by_login(&pool, "ROOT@ems.local").await.unwrap().unwrap().id,
            user.id
        );
        assert!(find_by_login(&pool, "nobody").await.unwrap().is_none());
        assert_eq!(count_by_role(&pool, UserRole::Admin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_username_exists_excludes_self() {
        let pool = test_pool().await;
        let user = create(&pool, admin("root")).await.unwrap();
        assert!(username_exists(&pool, "root", None).await.unwrap());
        assert!(!username_exists(&pool, "root", Some(user.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let pool = test_pool().await;
        insert_employee(&pool, "E001", "ana@example.com").await;

        let missing_password = upsert_credentials(
            &pool,
            "E001",
            "ana@example.com",
            CredentialChanges {
                username: Some("ana".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(missing_password, Err(RepoError::Validation(_))));

        let created = upsert_credentials(
            &pool,
            "E001",
            "ana@example.com",
            CredentialChanges {
                username: Some("ana".into()),
                password_hash: Some("h1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.username, "ana");
        assert_eq!(created.role, UserRole::Employee);

        let updated = upsert_credentials(
            &pool,
            "E001",
            "ana@example.com",
            CredentialChanges {
                role: Some(UserRole::Hr),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.username, "ana");
        assert_eq!(updated.role, UserRole::Hr);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_update_password() {
        let pool = test_pool().await;
        let user = create(&pool, admin("root")).await.unwrap();
        update_password(&pool, user.id, "new-hash").await.unwrap();
        let reloaded = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
        assert!(update_password(&pool, 999, "x").await.is_err());
    }
}
