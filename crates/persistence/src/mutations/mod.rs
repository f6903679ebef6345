// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Most mutations use Diesel DSL and are backend-agnostic, with minimal use of
//! backend-specific helpers (e.g., `last_insert_rowid()` for `SQLite`).
//!
//! ## Module Organization
//!
//! - `accounts` — Account and session mutations
//! - `rides` — Ride creation, the atomic status-transition write, and ride
//!   event appends
//!
//! ## Backend-Specific Code
//!
//! Backend-specific helpers (e.g., `get_last_insert_rowid()`) are imported from
//! the `backend` module. All other code uses Diesel DSL exclusively.

pub mod accounts;
pub mod rides;

// Re-export backend-specific mutation functions used by lib.rs
pub use accounts::{
    create_account_mysql, create_account_sqlite, create_session_mysql, create_session_sqlite,
    delete_expired_sessions_mysql, delete_expired_sessions_sqlite, delete_session_mysql,
    delete_session_sqlite, delete_sessions_for_user_mysql, delete_sessions_for_user_sqlite,
    set_driver_availability_mysql, set_driver_availability_sqlite, update_last_login_mysql,
    update_last_login_sqlite, update_password_mysql, update_password_sqlite,
    update_session_activity_mysql, update_session_activity_sqlite,
};
pub use rides::{
    append_ride_event_mysql, append_ride_event_sqlite, create_ride_mysql, create_ride_sqlite,
    persist_ride_transition_mysql, persist_ride_transition_sqlite,
};
