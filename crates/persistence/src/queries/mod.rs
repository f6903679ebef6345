// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `accounts` — Account, session, and available-driver queries
//! - `rides` — Ride, ride-view, and ride-event queries
//! - `reports` — The trip-duration report (raw SQL per backend)
//!
//! ## Backend-Specific Functions
//!
//! All query functions are generated in backend-specific monomorphic versions:
//! - Functions suffixed with `_sqlite` for `SQLite`
//! - Functions suffixed with `_mysql` for `MySQL`/`MariaDB`
//!
//! The `Persistence` adapter in `lib.rs` dispatches to the appropriate version
//! based on the active backend connection. The native spherical-distance ride
//! ordering is the one `MySQL`-only query; it has no `SQLite` counterpart.

pub mod accounts;
pub mod reports;
pub mod rides;

// Re-export backend-specific query functions used by lib.rs
pub use accounts::{
    get_account_by_id_mysql, get_account_by_id_sqlite, get_account_by_username_mysql,
    get_account_by_username_sqlite, get_session_by_token_mysql, get_session_by_token_sqlite,
    list_available_drivers_mysql, list_available_drivers_sqlite, verify_password,
};
pub use reports::{trip_duration_report_mysql, trip_duration_report_sqlite};
pub use rides::{
    count_recent_events_mysql, count_recent_events_sqlite, get_ride_mysql, get_ride_sqlite,
    list_ride_events_mysql, list_ride_events_sqlite, list_ride_views_mysql,
    list_ride_views_native_distance_mysql, list_ride_views_sqlite,
};
