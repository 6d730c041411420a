//! Department aggregates over the employees table

use super::RepoResult;
use shared::models::DepartmentOverview;
use sqlx::SqlitePool;

pub async fn overview(pool: &SqlitePool) -> RepoResult<Vec<DepartmentOverview>> {
    let rows = sqlx::query_as::<_, DepartmentOverview>(
        "SELECT department, \
                COUNT(*) AS employee_count, \
                SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END) AS active_count, \
                SUM(CASE WHEN status = 'on_leave' THEN 1 ELSE 0 END) AS on_leave_count, \
                CAST(AVG(salary) AS REAL) AS average_salary, \
                CAST(SUM(salary) AS REAL) AS total_salary \
         FROM employees GROUP BY department ORDER BY department",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn names(pool: &SqlitePool) -> RepoResult<Vec<String>> {
    let names = sqlx::query_scalar("SELECT DISTINCT department FROM employees ORDER BY department")
        .fetch_all(pool)
        .await?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    async fn insert(pool: &SqlitePool, id: &str, department: &str, salary: f64, status: &str) {
        sqlx::query(
            "INSERT INTO employees (employee_id, name, email, department, position, salary, hire_date, status, created_at, updated_at) VALUES (?1, 'X', ?1 || '@example.com', ?2, 'P', ?3, '2024-01-01', ?4, 0, 0)",
        )
        .bind(id)
        .bind(department)
        .bind(salary)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_overview_aggregates() {
        let pool = test_pool().await;
        insert(&pool, "E001", "Engineering", 100.0, "active").await;
        insert(&pool, "E002", "Engineering", 200.0, "on_leave").await;
        insert(&pool, "E003", "Sales", 50.0, "inactive").await;

        let rows = overview(&pool).await.unwrap();
        assert_eq!(rows.len(), 2);

        let eng = &rows[0];
        assert_eq!(eng.department, "Engineering");
        assert_eq!(eng.employee_count, 2);
        assert_eq!(eng.active_count, 1);
        assert_eq!(eng.on_leave_count, 1);
        assert_eq!(eng.average_salary, 150.0);
        assert_eq!(eng.total_salary, 300.0);

        assert_eq!(rows[1].active_count, 0);
        assert_eq!(names(&pool).await.unwrap(), vec!["Engineering", "Sales"]);
    }

    #[tokio::test]
    async fn test_empty_table() {
        let pool = test_pool().await;
        assert!(overview(&pool).await.unwrap().is_empty());
        assert!(names(&pool).await.unwrap().is_empty());
    }
}
