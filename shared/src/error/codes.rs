//! Unified error codes for the EMS service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 8xxx: Employee / HR errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from one client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password does not meet the minimum length
    PasswordTooShort = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin or HR role required
    ManagerRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 8xxx: Employee / HR ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Cannot delete own employee record
    EmployeeCannotDeleteSelf = 8003,
    /// Email already exists
    EmailExists = 8004,
    /// User account not found
    UserNotFound = 8005,
    /// Leave request not found
    LeaveNotFound = 8101,
    /// Leave date range is invalid
    LeaveInvalidDateRange = 8102,
    /// Status transition is not allowed
    InvalidStatusTransition = 8103,
    /// Task not found
    TaskNotFound = 8201,
    /// Attendance record not found
    AttendanceNotFound = 8301,
    /// Already checked in today
    AlreadyCheckedIn = 8302,
    /// Check-out without check-in
    NotCheckedIn = 8303,
    /// Already checked out today
    AlreadyCheckedOut = 8304,
    /// Notification not found
    NotificationNotFound = 8401,
    /// Activity not found
    ActivityNotFound = 8501,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Database unavailable (pool exhausted, file locked, IO failure)
    DatabaseUnavailable = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ManagerRequired => "Admin or HR role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Employee / HR
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmployeeCannotDeleteSelf => "Cannot delete own employee record",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::LeaveNotFound => "Leave request not found",
            ErrorCode::LeaveInvalidDateRange => "Leave end date is before start date",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::AlreadyCheckedIn => "Already checked in today",
            ErrorCode::NotCheckedIn => "No check-in recorded today",
            ErrorCode::AlreadyCheckedOut => "Already checked out today",
            ErrorCode::NotificationNotFound => "Notification not found",
            ErrorCode::ActivityNotFound => "Activity not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::DatabaseUnavailable => "Database unavailable, please retry later",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::ManagerRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Employee / HR
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::EmployeeCannotDeleteSelf),
            8004 => Ok(ErrorCode::EmailExists),
            8005 => Ok(ErrorCode::UserNotFound),
            8101 => Ok(ErrorCode::LeaveNotFound),
            8102 => Ok(ErrorCode::LeaveInvalidDateRange),
            8103 => Ok(ErrorCode::InvalidStatusTransition),
            8201 => Ok(ErrorCode::TaskNotFound),
            8301 => Ok(ErrorCode::AttendanceNotFound),
            8302 => Ok(ErrorCode::AlreadyCheckedIn),
            8303 => Ok(ErrorCode::NotCheckedIn),
            8304 => Ok(ErrorCode::AlreadyCheckedOut),
            8401 => Ok(ErrorCode::NotificationNotFound),
            8501 => Ok(ErrorCode::ActivityNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::DatabaseUnavailable),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::EmailExists.code(), 8004);
        assert_eq!(ErrorCode::DatabaseUnavailable.code(), 9003);
    }

    #[test]
    fn test_try_from_roundtrip_for_known_codes() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::TokenExpired,
            ErrorCode::ManagerRequired,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::AlreadyCheckedIn,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::UsernameExists).unwrap();
        assert_eq!(json, "8002");
        let code: ErrorCode = serde_json::from_str("1003").unwrap();
        assert_eq!(code, ErrorCode::TokenExpired);
    }
}
