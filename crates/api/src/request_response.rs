// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API boundary.
//!
//! These types define the public contract. Domain types never cross the
//! boundary directly; handlers translate in both directions.

use rideline_domain::Ride;
use serde::{Deserialize, Serialize};

/// Request to register a new rider account (public).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterAccountRequest {
    /// The desired username.
    pub username: String,
    /// The contact email address.
    pub email: String,
    /// The password.
    pub password: String,
    /// The password, repeated.
    pub password_confirmation: String,
}

/// Response for account registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterAccountResponse {
    /// The new account's user ID.
    pub user_id: i64,
    /// The stored (normalized) username.
    pub username: String,
    /// A success message.
    pub message: String,
}

/// Request to create an account with an explicit role (admin only).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateAccountRequest {
    /// The desired username.
    pub username: String,
    /// The contact email address.
    pub email: String,
    /// The password.
    pub password: String,
    /// The role string (`admin`, `driver`, or `rider`).
    pub role: String,
}

/// Response for account creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateAccountResponse {
    /// The new account's user ID.
    pub user_id: i64,
    /// The stored (normalized) username.
    pub username: String,
    /// The role the account holds.
    pub role: String,
}

/// Request to change the caller's own password.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangePasswordRequest {
    /// The current password.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
    /// The new password, repeated.
    pub new_password_confirmation: String,
}

/// Response for a password change.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangePasswordResponse {
    /// A success message.
    pub message: String,
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    /// The username (case-insensitive).
    pub username: String,
    /// The password.
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    /// The opaque session token to present as `Authorization: Bearer`.
    pub session_token: String,
    /// The authenticated user's ID.
    pub user_id: i64,
    /// The authenticated user's username.
    pub username: String,
    /// The authenticated user's role.
    pub role: String,
}

/// Response describing the authenticated caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhoAmIResponse {
    /// The authenticated user's ID.
    pub user_id: i64,
    /// The authenticated user's username.
    pub username: String,
    /// The authenticated user's role.
    pub role: String,
}

/// Request to create a ride.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRideRequest {
    /// The booking rider's user ID.
    pub rider_id: i64,
    /// The assigned driver's user ID.
    pub driver_id: i64,
    /// Human-readable pickup label.
    pub start_location: String,
    /// Human-readable dropoff label.
    pub end_location: String,
    /// Pickup latitude in degrees.
    pub pickup_latitude: f64,
    /// Pickup longitude in degrees.
    pub pickup_longitude: f64,
    /// Dropoff latitude in degrees.
    pub dropoff_latitude: f64,
    /// Dropoff longitude in degrees.
    pub dropoff_longitude: f64,
    /// Scheduled start (ISO 8601).
    pub start_time: String,
}

/// Request to update a ride.
///
/// Absent fields keep their stored values. Fields the ride's current status
/// marks read-only are silently reverted to their stored values rather than
/// rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateRideRequest {
    /// New driver assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
    /// New status string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New pickup latitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_latitude: Option<f64>,
    /// New pickup longitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_longitude: Option<f64>,
    /// New dropoff latitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_latitude: Option<f64>,
    /// New dropoff longitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_longitude: Option<f64>,
    /// New scheduled start (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

/// A ride as exposed by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RideInfo {
    /// The ride's canonical identifier.
    pub ride_id: i64,
    /// The booking rider's user ID.
    pub rider_id: i64,
    /// The assigned driver's user ID.
    pub driver_id: i64,
    /// The rider's email address.
    pub rider_email: String,
    /// The lifecycle status string.
    pub status: String,
    /// Human-readable pickup label.
    pub start_location: String,
    /// Human-readable dropoff label.
    pub end_location: String,
    /// Pickup latitude in degrees.
    pub pickup_latitude: f64,
    /// Pickup longitude in degrees.
    pub pickup_longitude: f64,
    /// Dropoff latitude in degrees.
    pub dropoff_latitude: f64,
    /// Dropoff longitude in degrees.
    pub dropoff_longitude: f64,
    /// Scheduled or actual start (ISO 8601).
    pub start_time: String,
    /// Actual end (ISO 8601), once completed.
    pub end_time: Option<String>,
    /// Record creation timestamp (ISO 8601).
    pub created_at: String,
    /// Record update timestamp (ISO 8601).
    pub updated_at: String,
    /// Distance from the reference coordinate in kilometers. Present only
    /// when distance ordering was requested; never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// Number of events recorded for this ride in the last 24 hours.
    /// Present on listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_event_count: Option<i64>,
}

impl RideInfo {
    /// Builds a `RideInfo` from a ride and its rider's email.
    ///
    /// The ride must carry a persisted `ride_id`; a ride without one has no
    /// API representation.
    #[must_use]
    pub fn from_ride(ride: &Ride, rider_email: String) -> Self {
        Self {
            ride_id: ride.ride_id.unwrap_or_default(),
            rider_id: ride.rider_id,
            driver_id: ride.driver_id,
            rider_email,
            status: ride.status.as_str().to_string(),
            start_location: ride.start_location.clone(),
            end_location: ride.end_location.clone(),
            pickup_latitude: ride.pickup.latitude(),
            pickup_longitude: ride.pickup.longitude(),
            dropoff_latitude: ride.dropoff.latitude(),
            dropoff_longitude: ride.dropoff.longitude(),
            start_time: ride.start_time.clone(),
            end_time: ride.end_time.clone(),
            created_at: ride.created_at.clone(),
            updated_at: ride.updated_at.clone(),
            distance_km: None,
            recent_event_count: None,
        }
    }
}

/// Filter, ordering, and pagination parameters for ride listings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListRidesRequest {
    /// Exact-match status filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Case-insensitive substring filter on the rider's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Ordering: `pickup_time` or `distance`. Natural order when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Reference latitude; required with `order_by=distance`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Reference longitude; required with `order_by=distance`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// 1-based page number. Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size. Defaults to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Response for ride listings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListRidesResponse {
    /// The 1-based page number returned.
    pub page: u32,
    /// The page size used.
    pub page_size: u32,
    /// Total number of rides matching the filters (before pagination).
    pub total_count: usize,
    /// The rides on this page.
    pub rides: Vec<RideInfo>,
}

/// A ride event as exposed by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RideEventInfo {
    /// The event's canonical identifier.
    pub event_id: i64,
    /// The ride this event belongs to.
    pub ride_id: i64,
    /// When the event was recorded (ISO 8601).
    pub created_at: String,
    /// Free-text description.
    pub description: String,
}

/// Request to append a ride event directly (admin only).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRideEventRequest {
    /// Free-text description of what happened.
    pub description: String,
}

/// Response for ride event listings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListRideEventsResponse {
    /// The ride the events belong to.
    pub ride_id: i64,
    /// The events, oldest first.
    pub events: Vec<RideEventInfo>,
}

/// A driver available for a new ride.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverInfo {
    /// The driver's user ID.
    pub user_id: i64,
    /// The driver's username.
    pub username: String,
    /// The driver's email address.
    pub email: String,
}

/// Response listing drivers with no ride in progress.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListAvailableDriversResponse {
    /// The available drivers.
    pub drivers: Vec<DriverInfo>,
}

/// One row of the trip-duration report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TripDurationEntry {
    /// Month the dropoff fell in, formatted `YYYY-MM`.
    pub month: String,
    /// The driver's username.
    pub driver: String,
    /// Number of rides whose pickup-to-dropoff span exceeded one hour.
    pub trips: i64,
}

/// Response for the trip-duration report.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TripDurationReportResponse {
    /// The report rows, ordered by month then driver.
    pub rows: Vec<TripDurationEntry>,
}
