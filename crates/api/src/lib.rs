// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for Rideline.
//!
//! This crate sits between the transport (the HTTP server) and the core:
//! request/response DTOs, session-based authentication, role-based
//! authorization with exhaustive matching, handler functions, and an
//! explicit error taxonomy with translation from the domain and core
//! layers so inner errors never leak.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    change_password, create_account, create_ride, create_ride_event, get_ride,
    list_available_drivers, list_ride_events, list_rides, register_account, trip_duration_report,
    update_ride,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    ChangePasswordRequest, ChangePasswordResponse, CreateAccountRequest, CreateAccountResponse,
    CreateRideEventRequest, CreateRideRequest, DriverInfo, ListAvailableDriversResponse,
    ListRideEventsResponse, ListRidesRequest, ListRidesResponse, LoginRequest, LoginResponse,
    RegisterAccountRequest, RegisterAccountResponse, RideEventInfo, RideInfo, TripDurationEntry,
    TripDurationReportResponse, UpdateRideRequest, WhoAmIResponse,
};
