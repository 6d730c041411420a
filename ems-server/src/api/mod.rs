//! API routes
//!
//! One module per resource, each exposing `router()`:
//!
//! - [`health`] - liveness and database probe (public)
//! - [`auth`] - login, logout, current user, password change
//! - [`employees`] - employee CRUD and account credentials
//! - [`departments`] - department names and overview
//! - [`leaves`] - leave requests and review
//! - [`tasks`] - task assignment and progress
//! - [`attendance`] - daily check-in / check-out
//! - [`notifications`] - per-user and per-role notifications
//! - [`activities`] - activity feed

pub mod activities;
pub mod attendance;
pub mod auth;
pub mod departments;
pub mod employees;
pub mod health;
pub mod leaves;
pub mod notifications;
pub mod tasks;
