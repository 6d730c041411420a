//! Built-in demo accounts
//!
//! Checked before the database on login when `DEMO_USERS_ENABLED` is on.
//! Demo users have negative ids so they never collide with real rows, and
//! none is linked to an employee record, so a demo login never acts as a
//! real person.

use shared::models::UserRole;

#[derive(Debug, Clone, Copy)]
pub struct DemoUser {
    pub id: i64,
    pub username: &'static str,
    pub password: &'static str,
    pub email: &'static str,
    pub role: UserRole,
    pub employee_id: Option<&'static str>,
}

pub const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        id: -1,
        username: "admin",
        password: "admin123",
        email: "admin@demo.local",
        role: UserRole::Admin,
        employee_id: None,
    },
    DemoUser {
        id: -2,
        username: "hr",
        password: "hr123",
        email: "hr@demo.local",
        role: UserRole::Hr,
        employee_id: None,
    },
    DemoUser {
        id: -3,
        username: "employee",
        password: "employee123",
        email: "employee@demo.local",
        role: UserRole::Employee,
        employee_id: None,
    },
];

/// Match a username/password pair against the demo table
pub fn authenticate(username: &str, password: &str) -> Option<&'static DemoUser> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
}

pub fn find_by_id(id: i64) -> Option<&'static DemoUser> {
    DEMO_USERS.iter().find(|u| u.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_authenticate() {
        let hr = authenticate("hr", "hr123").unwrap();
        assert_eq!(hr.role, UserRole::Hr);
        assert!(authenticate("hr", "wrong").is_none());
        assert!(authenticate("nobody", "hr123").is_none());
    }

    #[test]
    fn test_demo_ids_are_negative_and_unique() {
        assert!(DEMO_USERS.iter().all(|u| u.id < 0));
        assert_eq!(find_by_id(-3).unwrap().username, "employee");
        assert!(find_by_id(1).is_none());
    }

    #[test]
    fn test_demo_users_not_linked_to_employees() {
        assert!(DEMO_USERS.iter().all(|u| u.employee_id.is_none()));
    }
}
