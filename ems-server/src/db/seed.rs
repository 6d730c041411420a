//! Startup seeding
//!
//! - [`ensure_admin`] bootstraps an admin account on an empty database
//! - [`seed_demo_data`] inserts sample employees (opt-in)

use chrono::NaiveDate;
use shared::models::{EmployeeStatus, UserRole};
use sqlx::SqlitePool;

use super::repository::employee::{self, NewEmployee};
use super::repository::user::{self, NewUser};
use super::repository::{RepoError, RepoResult};
use crate::auth::hash_password;
use crate::core::Config;

/// (name, email, department, position, salary, hire date, role)
const DEMO_EMPLOYEES: &[(&str, &str, &str, &str, f64, &str, UserRole)] = &[
    ("Alice Johnson", "alice.johnson@ems.local", "Engineering", "Senior Developer", 95_000.0, "2021-03-15", UserRole::Employee),
    ("Brian Smith", "brian.smith@ems.local", "Human Resources", "HR Manager", 78_000.0, "2020-07-01", UserRole::Hr),
    ("Carla Gomez", "carla.gomez@ems.local", "Engineering", "QA Engineer", 72_000.0, "2022-01-10", UserRole::Employee),
    ("David Lee", "david.lee@ems.local", "Sales", "Account Executive", 65_000.0, "2023-05-22", UserRole::Employee),
    ("Emma Brown", "emma.brown@ems.local", "Finance", "Accountant", 70_000.0, "2019-11-04", UserRole::Employee),
];

fn hash(password: &str) -> RepoResult<String> {
    hash_password(password).map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))
}

/// Create the configured admin account when no admin exists yet
pub async fn ensure_admin(pool: &SqlitePool, config: &Config) -> RepoResult<()> {
    if user::count_by_role(pool, UserRole::Admin).await? > 0 {
        return Ok(());
    }
    if user::username_exists(pool, &config.admin_username, None).await? {
        tracing::warn!(
            username = %config.admin_username,
            "No admin account, but the admin username is taken; skipping bootstrap"
        );
        return Ok(());
    }

    user::create(
        pool,
        NewUser {
            username: config.admin_username.clone(),
            email: config.admin_email.to_lowercase(),
            password_hash: hash(&config.admin_password)?,
            role: UserRole::Admin,
            employee_id: None,
        },
    )
    .await?;

    if config.is_production() && config.admin_password == Config::default().admin_password {
        tracing::warn!("Bootstrap admin uses the default password; set ADMIN_PASSWORD");
    }
    tracing::info!(username = %config.admin_username, "Bootstrap admin account created");
    Ok(())
}

/// Insert sample employees (with accounts) into an empty employees table
///
/// Usernames are the email local part; every account gets the configured
/// default password.
pub async fn seed_demo_data(pool: &SqlitePool, config: &Config) -> RepoResult<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "Employees present, skipping demo data");
        return Ok(());
    }

    let password_hash = hash(&config.default_employee_password)?;
    for &(name, email, department, position, salary, hire_date, role) in DEMO_EMPLOYEES {
        let hire_date = NaiveDate::parse_from_str(hire_date, "%Y-%m-%d")
            .map_err(|e| RepoError::Validation(format!("Bad demo hire date: {e}")))?;
        let username = email.split('@').next().unwrap_or(email).to_string();
        employee::create(
            pool,
            NewEmployee {
                name: name.into(),
                email: email.into(),
                phone: None,
                department: department.into(),
                position: position.into(),
                salary,
                hire_date,
                status: EmployeeStatus::Active,
                address: None,
                username,
                password_hash: password_hash.clone(),
                role,
            },
        )
        .await?;
    }

    tracing::info!(count = DEMO_EMPLOYEES.len(), "Demo employees inserted");
    Ok(())
}
