//! Employee Repository
//!
//! Employee rows and their linked user accounts are written together: create
//! and delete touch both tables inside one transaction.

use super::{RepoError, RepoResult};
use shared::models::{
    Employee, EmployeeCreated, EmployeeDetail, EmployeeQuery, EmployeeStatus, EmployeeUpdate,
    UserRole,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use chrono::NaiveDate;

const SELECT_EMPLOYEE: &str = "SELECT id, employee_id, name, email, phone, department, position, salary, hire_date, status, address, created_at, updated_at FROM employees";

/// Validated input for [`create`]
///
/// The password is already hashed; email is already lower-cased.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub address: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Format the public identifier for a row id (`E001`, ..., `E1000`)
pub fn format_employee_id(row_id: i64) -> String {
    format!("E{row_id:03}")
}

pub async fn find_all(pool: &SqlitePool, query: &EmployeeQuery) -> RepoResult<Vec<Employee>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_EMPLOYEE);
    qb.push(" WHERE 1 = 1");
    if let Some(employee_id) = query.employee_id.as_deref().filter(|e| !e.is_empty()) {
        qb.push(" AND employee_id = ").push_bind(employee_id.to_string());
    }
    if let Some(department) = query.department.as_deref().filter(|d| !d.is_empty()) {
        qb.push(" AND department = ").push_bind(department.to_string());
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        qb.push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(email) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(employee_id) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY id");

    let employees = qb.build_query_as::<Employee>().fetch_all(pool).await?;
    Ok(employees)
}

pub async fn find_by_employee_id(pool: &SqlitePool, employee_id: &str) -> RepoResult<Option<Employee>> {
    let sql = format!("{SELECT_EMPLOYEE} WHERE employee_id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

pub async fn find_by_row_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let sql = format!("{SELECT_EMPLOYEE} WHERE id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

/// Resolve a path key: `E001` style id first, then numeric row id
pub async fn find(pool: &SqlitePool, key: &str) -> RepoResult<Option<Employee>> {
    if let Some(employee) = find_by_employee_id(pool, key).await? {
        return Ok(Some(employee));
    }
    match key.parse::<i64>() {
        Ok(id) => find_by_row_id(pool, id).await,
        Err(_) => Ok(None),
    }
}

/// Like [`find`] but NotFound when missing
pub async fn get(pool: &SqlitePool, key: &str) -> RepoResult<Employee> {
    find(pool, key).await?.ok_or_else(|| {
        RepoError::Business(
            shared::error::ErrorCode::EmployeeNotFound,
            format!("Employee {key} not found"),
        )
    })
}

/// Whether an email is taken by any employee or user, ignoring the records
/// of `exclude_employee_id`
pub async fn email_exists(
    pool: &SqlitePool,
    email: &str,
    exclude_employee_id: Option<&str>,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM employees WHERE email = ?1 AND (?2 IS NULL OR employee_id <> ?2)) \
         + (SELECT COUNT(*) FROM users WHERE email = ?1 AND (?2 IS NULL OR employee_id IS NULL OR employee_id <> ?2))",
    )
    .bind(email)
    .bind(exclude_employee_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Employee plus linked account fields
pub async fn find_detail(pool: &SqlitePool, key: &str) -> RepoResult<Option<EmployeeDetail>> {
    let Some(employee) = find(pool, key).await? else {
        return Ok(None);
    };
    let account: Option<(String, UserRole, bool)> =
        sqlx::query_as("SELECT username, role, is_active FROM users WHERE employee_id = ?")
            .bind(&employee.employee_id)
            .fetch_optional(pool)
            .await?;
    let (username, role, is_active) = match account {
        Some((u, r, a)) => (Some(u), Some(r), Some(a)),
        None => (None, None, None),
    };
    Ok(Some(EmployeeDetail {
        employee,
        username,
        role,
        is_active,
    }))
}

/// Create an employee and its user account atomically
///
/// The transaction opens with the INSERT so SQLite takes the write lock up
/// front. `employee_id` is derived from the AUTOINCREMENT row id, so
/// concurrent creates never collide. Any failure (including a unique
/// violation on the user row) rolls back both inserts.
pub async fn create(pool: &SqlitePool, data: NewEmployee) -> RepoResult<EmployeeCreated> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let row_id: i64 = sqlx::query_scalar(
        "INSERT INTO employees (employee_id, name, email, phone, department, position, salary, hire_date, status, address, created_at, updated_at) \
         VALUES ('pending-' || lower(hex(randomblob(8))), ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.department)
    .bind(&data.position)
    .bind(data.salary)
    .bind(data.hire_date)
    .bind(data.status)
    .bind(&data.address)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let employee_id = format_employee_id(row_id);
    sqlx::query("UPDATE employees SET employee_id = ? WHERE id = ?")
        .bind(&employee_id)
        .bind(row_id)
        .execute(&mut *tx)
        .await?;

    super::user::insert(
        &mut *tx,
        super::user::NewUser {
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash,
            role: data.role,
            employee_id: Some(employee_id.clone()),
        },
    )
    .await?;

    tx.commit().await?;

    let employee = find_by_row_id(pool, row_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))?;

    Ok(EmployeeCreated {
        employee,
        username: data.username,
        role: data.role,
    })
}

/// Partial update; an email change is mirrored onto the linked user
pub async fn update(
    pool: &SqlitePool,
    employee_id: &str,
    data: EmployeeUpdate,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE employees SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), department = COALESCE(?4, department), position = COALESCE(?5, position), salary = COALESCE(?6, salary), hire_date = COALESCE(?7, hire_date), status = COALESCE(?8, status), address = COALESCE(?9, address), updated_at = ?10 WHERE employee_id = ?11",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.department)
    .bind(&data.position)
    .bind(data.salary)
    .bind(data.hire_date)
    .bind(data.status)
    .bind(&data.address)
    .bind(now)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            shared::error::ErrorCode::EmployeeNotFound,
            format!("Employee {employee_id} not found"),
        ));
    }

    if let Some(email) = &data.email {
        sqlx::query("UPDATE users SET email = ?1, updated_at = ?2 WHERE employee_id = ?3")
            .bind(email)
            .bind(now)
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_employee_id(pool, employee_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {employee_id} not found")))
}

/// Delete the user account, then the employee, atomically
///
/// Leave requests, attendance and assigned tasks cascade with the employee.
pub async fn delete(pool: &SqlitePool, employee_id: &str) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM users WHERE employee_id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let rows = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    if rows.rows_affected() == 0 {
        // tx dropped here: the user delete is rolled back
        return Err(RepoError::Business(
            shared::error::ErrorCode::EmployeeNotFound,
            format!("Employee {employee_id} not found"),
        ));
    }

    tx.commit().await?;
    Ok(())
}

pub async fn exists(pool: &SqlitePool, employee_id: &str) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}
