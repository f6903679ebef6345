// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers take the persistence adapter, the request DTO, and the
//! authenticated actor; they enforce authorization first, translate the
//! request into domain types, run the core rules, and persist the outcome.
//!
//! The ride-update path carries two deliberate compatibility behaviors from
//! the system this grew out of:
//!
//! * fields the current status marks read-only are silently reverted to
//!   their stored values, and the update still reports success
//! * status transition ordering is not validated; the lifecycle rule only
//!   stamps timestamps and flips driver availability

use time::format_description::well_known::Iso8601;
use time::{Duration, OffsetDateTime};
use tracing::info;

use rideline_core::{
    QueryContext, RideOrdering, RideQueryOptions, RideView, apply_status_transition, distance_km,
    format_timestamp, query_rides,
};
use rideline_domain::{
    Coordinate, Ride, RideStatus, Role, User, validate_email, validate_location, validate_username,
};
use rideline_persistence::{DistanceStrategy, Persistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    ChangePasswordRequest, ChangePasswordResponse, CreateAccountRequest, CreateAccountResponse,
    CreateRideEventRequest, CreateRideRequest, DriverInfo, ListAvailableDriversResponse,
    ListRideEventsResponse, ListRidesRequest, ListRidesResponse, RegisterAccountRequest,
    RegisterAccountResponse, RideEventInfo, RideInfo, TripDurationEntry,
    TripDurationReportResponse, UpdateRideRequest,
};

/// Default page size for ride listings.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Window for the "recent events" annotation on listings.
const RECENT_EVENT_WINDOW: Duration = Duration::hours(24);

/// Formats an instant as ISO 8601 for storage.
fn format_instant(instant: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(instant).map_err(translate_core_error)
}

/// Validates that a timestamp string parses as ISO 8601.
fn validate_timestamp(value: &str, field: &str) -> Result<(), ApiError> {
    OffsetDateTime::parse(value, &Iso8601::DEFAULT)
        .map(|_| ())
        .map_err(|e| ApiError::ValidationFailure {
            field: field.to_string(),
            message: format!("'{value}' is not a valid ISO 8601 timestamp: {e}"),
        })
}

/// Builds a coordinate from a latitude/longitude pair, attributing range
/// errors to the right request field.
fn build_coordinate(
    latitude: f64,
    longitude: f64,
    latitude_field: &str,
    longitude_field: &str,
) -> Result<Coordinate, ApiError> {
    Coordinate::new(latitude, longitude).map_err(|e| match e {
        rideline_domain::DomainError::InvalidLatitude(_) => ApiError::ValidationFailure {
            field: latitude_field.to_string(),
            message: e.to_string(),
        },
        _ => ApiError::ValidationFailure {
            field: longitude_field.to_string(),
            message: e.to_string(),
        },
    })
}

/// Looks up an account, converts it to a domain user, and requires a role.
///
/// Failures surface as per-field validation errors on the referencing field.
fn lookup_user_with_role(
    persistence: &mut Persistence,
    user_id: i64,
    required: Role,
    field: &str,
) -> Result<User, ApiError> {
    let account = persistence
        .get_account_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ValidationFailure {
            field: field.to_string(),
            message: format!("User {user_id} does not exist"),
        })?;

    let user: User = account.to_user().map_err(translate_persistence_error)?;
    user.require_role(required)
        .map_err(|e| ApiError::ValidationFailure {
            field: field.to_string(),
            message: e.to_string(),
        })?;
    Ok(user)
}

/// Fetches the rider email for a single ride.
fn rider_email(persistence: &mut Persistence, rider_id: i64) -> Result<String, ApiError> {
    let account = persistence
        .get_account_by_id(rider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Ride references missing rider {rider_id}"),
        })?;
    Ok(account.email)
}

/// Registers a new rider account (public).
///
/// The role is fixed to rider; privileged roles go through
/// [`create_account`].
///
/// # Errors
///
/// Returns a per-field `ValidationFailure` for a malformed username or email
/// or a taken username, and `PasswordPolicyViolation` for a weak password.
pub fn register_account(
    persistence: &mut Persistence,
    request: RegisterAccountRequest,
) -> Result<RegisterAccountResponse, ApiError> {
    validate_username(&request.username).map_err(translate_domain_error)?;
    validate_email(&request.email).map_err(translate_domain_error)?;

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &request.username,
        &request.email,
    )?;

    if persistence
        .get_account_by_username(&request.username)
        .map_err(translate_persistence_error)?
        .is_some()
    {
        return Err(ApiError::ValidationFailure {
            field: String::from("username"),
            message: format!("Username '{}' is already taken", request.username.to_lowercase()),
        });
    }

    let now_str: String = format_instant(OffsetDateTime::now_utc())?;
    let user_id: i64 = persistence
        .create_account(
            &request.username,
            &request.email,
            &request.password,
            Role::Rider.as_str(),
            &now_str,
        )
        .map_err(translate_persistence_error)?;

    let username: String = request.username.to_lowercase();
    info!(user_id, username = %username, "Registered rider account");

    Ok(RegisterAccountResponse {
        user_id,
        message: format!("Account '{username}' registered"),
        username,
    })
}

/// Creates an account with an explicit role (admin only).
///
/// # Errors
///
/// Returns `Unauthorized` for non-admin callers, per-field
/// `ValidationFailure` for malformed input, and `PasswordPolicyViolation`
/// for a weak password.
pub fn create_account(
    persistence: &mut Persistence,
    request: CreateAccountRequest,
    actor: &AuthenticatedActor,
) -> Result<CreateAccountResponse, ApiError> {
    AuthorizationService::authorize_create_account(actor)?;

    let role: Role = Role::parse(&request.role).map_err(translate_domain_error)?;
    validate_username(&request.username).map_err(translate_domain_error)?;
    validate_email(&request.email).map_err(translate_domain_error)?;

    PasswordPolicy::default().validate(
        &request.password,
        &request.password,
        &request.username,
        &request.email,
    )?;

    if persistence
        .get_account_by_username(&request.username)
        .map_err(translate_persistence_error)?
        .is_some()
    {
        return Err(ApiError::ValidationFailure {
            field: String::from("username"),
            message: format!("Username '{}' is already taken", request.username.to_lowercase()),
        });
    }

    let now_str: String = format_instant(OffsetDateTime::now_utc())?;
    let user_id: i64 = persistence
        .create_account(
            &request.username,
            &request.email,
            &request.password,
            role.as_str(),
            &now_str,
        )
        .map_err(translate_persistence_error)?;

    let username: String = request.username.to_lowercase();
    info!(user_id, username = %username, role = %role, created_by = %actor.username, "Created account");

    Ok(CreateAccountResponse {
        user_id,
        username,
        role: role.as_str().to_string(),
    })
}

/// Changes the caller's own password.
///
/// Every session for the account is deleted afterwards, including the one
/// used to make this request; the caller must log in again.
///
/// # Errors
///
/// Returns `AuthenticationFailed` if the current password does not verify
/// and `PasswordPolicyViolation` for a weak replacement.
pub fn change_password(
    persistence: &mut Persistence,
    request: ChangePasswordRequest,
    actor: &AuthenticatedActor,
) -> Result<ChangePasswordResponse, ApiError> {
    let account = persistence
        .get_account_by_id(actor.user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Authenticated account {} is missing", actor.user_id),
        })?;

    let verified: bool = persistence
        .verify_password(&request.current_password, &account.password_hash)
        .map_err(translate_persistence_error)?;
    if !verified {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &account.username,
        &account.email,
    )?;

    persistence
        .update_password(actor.user_id, &request.new_password)
        .map_err(translate_persistence_error)?;
    persistence
        .delete_sessions_for_user(actor.user_id)
        .map_err(translate_persistence_error)?;

    info!(user_id = actor.user_id, "Password changed, sessions invalidated");

    Ok(ChangePasswordResponse {
        message: String::from("Password changed; log in again"),
    })
}

/// Creates a ride.
///
/// The rider must hold the rider role and the driver the driver role;
/// non-admin callers may only book for themselves. New rides start in
/// `scheduled` status.
///
/// # Errors
///
/// Returns `Unauthorized` when a non-admin books for someone else and a
/// per-field `ValidationFailure` for missing users, role mismatches, bad
/// coordinates, or malformed fields.
pub fn create_ride(
    persistence: &mut Persistence,
    request: CreateRideRequest,
    actor: &AuthenticatedActor,
) -> Result<RideInfo, ApiError> {
    AuthorizationService::authorize_create_ride(actor, request.rider_id)?;

    let rider: User = lookup_user_with_role(persistence, request.rider_id, Role::Rider, "rider_id")?;
    lookup_user_with_role(persistence, request.driver_id, Role::Driver, "driver_id")?;

    validate_location(&request.start_location).map_err(|e| ApiError::ValidationFailure {
        field: String::from("start_location"),
        message: e.to_string(),
    })?;
    validate_location(&request.end_location).map_err(|e| ApiError::ValidationFailure {
        field: String::from("end_location"),
        message: e.to_string(),
    })?;

    let pickup: Coordinate = build_coordinate(
        request.pickup_latitude,
        request.pickup_longitude,
        "pickup_latitude",
        "pickup_longitude",
    )?;
    let dropoff: Coordinate = build_coordinate(
        request.dropoff_latitude,
        request.dropoff_longitude,
        "dropoff_latitude",
        "dropoff_longitude",
    )?;
    validate_timestamp(&request.start_time, "start_time")?;

    let now_str: String = format_instant(OffsetDateTime::now_utc())?;
    let mut ride: Ride = Ride::new(
        request.rider_id,
        request.driver_id,
        request.start_location,
        request.end_location,
        pickup,
        dropoff,
        request.start_time,
        now_str,
    );

    let ride_id: i64 = persistence
        .create_ride(&ride)
        .map_err(translate_persistence_error)?;
    ride.ride_id = Some(ride_id);

    info!(
        ride_id,
        rider_id = ride.rider_id,
        driver_id = ride.driver_id,
        booked_by = %actor.username,
        "Ride created"
    );

    Ok(RideInfo::from_ride(&ride, rider.email))
}

/// Retrieves a single ride.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown ride and `Unauthorized` when
/// the caller is neither an admin nor the ride's rider.
pub fn get_ride(
    persistence: &mut Persistence,
    ride_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RideInfo, ApiError> {
    let ride: Ride = persistence
        .get_ride(ride_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {ride_id} does not exist"),
        })?;

    AuthorizationService::authorize_view_ride(actor, &ride)?;

    let email: String = rider_email(persistence, ride.rider_id)?;
    Ok(RideInfo::from_ride(&ride, email))
}

/// Updates a ride, applying the status lifecycle rule.
///
/// Read-only field reversion: while a ride is `in_progress` or `completed`
/// its pickup coordinates and start time keep their stored values, and while
/// `in_progress` its driver does too - requested changes to those fields are
/// silently discarded, not rejected, and the update reports success with the
/// stored values so callers can observe the outcome.
///
/// The previous status is read from the store, never from the request. When
/// the status actually changed, the ride and the driver's availability are
/// persisted in one transaction and a `"Status changed to <status>"` event
/// is appended.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown ride, `Unauthorized` when the
/// caller is neither an admin nor the assigned driver, and a per-field
/// `ValidationFailure` for a bad status, coordinate, or driver reference.
pub fn update_ride(
    persistence: &mut Persistence,
    ride_id: i64,
    request: UpdateRideRequest,
    actor: &AuthenticatedActor,
) -> Result<RideInfo, ApiError> {
    let stored: Ride = persistence
        .get_ride(ride_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {ride_id} does not exist"),
        })?;

    AuthorizationService::authorize_update_ride(actor, &stored)?;

    let previous_status: RideStatus = stored.status;
    let fields_locked: bool = matches!(
        previous_status,
        RideStatus::InProgress | RideStatus::Completed
    );
    let driver_locked: bool = previous_status == RideStatus::InProgress;

    let mut ride: Ride = stored.clone();

    if let Some(status) = &request.status {
        ride.status = status.parse().map_err(translate_domain_error)?;
    }

    // Read-only reversion happens before validation: a locked field keeps its
    // stored value no matter what the request carried.
    if !driver_locked {
        if let Some(driver_id) = request.driver_id {
            ride.driver_id = driver_id;
        }
    }
    if !fields_locked {
        if request.pickup_latitude.is_some() || request.pickup_longitude.is_some() {
            ride.pickup = build_coordinate(
                request.pickup_latitude.unwrap_or_else(|| stored.pickup.latitude()),
                request.pickup_longitude.unwrap_or_else(|| stored.pickup.longitude()),
                "pickup_latitude",
                "pickup_longitude",
            )?;
        }
        if let Some(start_time) = &request.start_time {
            validate_timestamp(start_time, "start_time")?;
            ride.start_time = start_time.clone();
        }
    }
    if request.dropoff_latitude.is_some() || request.dropoff_longitude.is_some() {
        ride.dropoff = build_coordinate(
            request.dropoff_latitude.unwrap_or_else(|| stored.dropoff.latitude()),
            request.dropoff_longitude.unwrap_or_else(|| stored.dropoff.longitude()),
            "dropoff_latitude",
            "dropoff_longitude",
        )?;
    }

    if ride.driver_id != stored.driver_id {
        lookup_user_with_role(persistence, ride.driver_id, Role::Driver, "driver_id")?;
    }

    let mut driver: User = persistence
        .get_account_by_id(ride.driver_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Ride references missing driver {}", ride.driver_id),
        })?
        .to_user()
        .map_err(translate_persistence_error)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let effect = apply_status_transition(&mut ride, &mut driver, previous_status, now)
        .map_err(translate_core_error)?;
    ride.updated_at = format_instant(now)?;

    persistence
        .persist_ride_transition(&ride, driver.is_available, effect.driver_changed())
        .map_err(translate_persistence_error)?;

    if ride.status != previous_status {
        persistence
            .append_ride_event(
                ride_id,
                &ride.updated_at,
                &format!("Status changed to {}", ride.status),
            )
            .map_err(translate_persistence_error)?;
    }

    info!(
        ride_id,
        previous_status = previous_status.as_str(),
        status = ride.status.as_str(),
        updated_by = %actor.username,
        "Ride updated"
    );

    let email: String = rider_email(persistence, ride.rider_id)?;
    Ok(RideInfo::from_ride(&ride, email))
}

/// Lists rides with filtering, ordering, scope restriction, and pagination.
///
/// Non-admin callers only ever see rides where they are the rider; the
/// restriction happens before filters and ordering. Distance ordering
/// annotates each ride with its distance from the reference coordinate, and
/// every listed ride carries its event count over the last 24 hours.
///
/// # Errors
///
/// Returns `MissingParameter` when distance ordering is requested without a
/// reference coordinate and `ValidationFailure` for an unrecognized status
/// or ordering.
pub fn list_rides(
    persistence: &mut Persistence,
    request: ListRidesRequest,
    actor: &AuthenticatedActor,
) -> Result<ListRidesResponse, ApiError> {
    let status: Option<RideStatus> = match &request.status {
        Some(value) => Some(value.parse().map_err(translate_domain_error)?),
        None => None,
    };

    let order_by: RideOrdering = match request.order_by.as_deref() {
        None => RideOrdering::Natural,
        Some("pickup_time") => RideOrdering::PickupTime,
        Some("distance") => RideOrdering::Distance,
        Some(other) => {
            return Err(ApiError::ValidationFailure {
                field: String::from("order_by"),
                message: format!("'{other}' is not a valid ordering (pickup_time, distance)"),
            });
        }
    };

    let reference: Option<Coordinate> = match (request.latitude, request.longitude) {
        (Some(latitude), Some(longitude)) => Some(build_coordinate(
            latitude,
            longitude,
            "latitude",
            "longitude",
        )?),
        _ => None,
    };

    // The distance strategy was fixed when persistence was configured. On the
    // native path the store hands rides back already ordered, so the core
    // filter runs with natural ordering and the annotation is done here.
    let native_distance: bool = order_by == RideOrdering::Distance
        && persistence.distance_strategy() == DistanceStrategy::NativeSpherical;

    let (views, options) = if native_distance {
        let reference: Coordinate = reference.ok_or_else(|| ApiError::MissingParameter {
            parameter: String::from("reference coordinate"),
        })?;
        let views: Vec<RideView> = persistence
            .list_ride_views_native_distance(&reference)
            .map_err(translate_persistence_error)?;
        let options = RideQueryOptions {
            status,
            rider_email_contains: request.email.clone(),
            order_by: RideOrdering::Natural,
            reference: Some(reference),
        };
        (views, options)
    } else {
        let views: Vec<RideView> = persistence
            .list_ride_views()
            .map_err(translate_persistence_error)?;
        let options = RideQueryOptions {
            status,
            rider_email_contains: request.email.clone(),
            order_by,
            reference,
        };
        (views, options)
    };

    let context: QueryContext = QueryContext::new(actor.user_id, actor.role);
    let mut filtered: Vec<RideView> =
        query_rides(views, &options, &context).map_err(translate_core_error)?;

    if native_distance {
        if let Some(reference) = &options.reference {
            for view in &mut filtered {
                view.distance_km = Some(distance_km(reference, &view.ride.pickup));
            }
        }
    }

    let total_count: usize = filtered.len();
    let page: u32 = request.page.unwrap_or(1).max(1);
    let page_size: u32 = request.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let offset: usize = (page as usize - 1) * page_size as usize;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let cutoff: String = format_instant(now - RECENT_EVENT_WINDOW)?;

    let mut rides: Vec<RideInfo> = Vec::new();
    for view in filtered.into_iter().skip(offset).take(page_size as usize) {
        let mut item: RideInfo = RideInfo::from_ride(&view.ride, view.rider_email.clone());
        item.distance_km = view.distance_km;
        if let Some(ride_id) = view.ride.ride_id {
            item.recent_event_count = Some(
                persistence
                    .count_recent_events(ride_id, &cutoff)
                    .map_err(translate_persistence_error)?,
            );
        }
        rides.push(item);
    }

    Ok(ListRidesResponse {
        page,
        page_size,
        total_count,
        rides,
    })
}

/// Lists a ride's events, oldest first (admin only).
///
/// # Errors
///
/// Returns `Unauthorized` for non-admin callers and `ResourceNotFound` for
/// an unknown ride.
pub fn list_ride_events(
    persistence: &mut Persistence,
    ride_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ListRideEventsResponse, ApiError> {
    AuthorizationService::authorize_list_ride_events(actor)?;

    if persistence
        .get_ride(ride_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {ride_id} does not exist"),
        });
    }

    let events: Vec<RideEventInfo> = persistence
        .list_ride_events(ride_id)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|event| RideEventInfo {
            event_id: event.event_id.unwrap_or_default(),
            ride_id: event.ride_id,
            created_at: event.created_at,
            description: event.description,
        })
        .collect();

    Ok(ListRideEventsResponse { ride_id, events })
}

/// Appends a ride event directly (admin only).
///
/// # Errors
///
/// Returns `Unauthorized` for non-admin callers, `ResourceNotFound` for an
/// unknown ride, and `ValidationFailure` for an empty description.
pub fn create_ride_event(
    persistence: &mut Persistence,
    ride_id: i64,
    request: CreateRideEventRequest,
    actor: &AuthenticatedActor,
) -> Result<RideEventInfo, ApiError> {
    AuthorizationService::authorize_create_ride_event(actor)?;

    if request.description.trim().is_empty() {
        return Err(ApiError::ValidationFailure {
            field: String::from("description"),
            message: String::from("Description cannot be empty"),
        });
    }

    if persistence
        .get_ride(ride_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {ride_id} does not exist"),
        });
    }

    let now_str: String = format_instant(OffsetDateTime::now_utc())?;
    let event_id: i64 = persistence
        .append_ride_event(ride_id, &now_str, &request.description)
        .map_err(translate_persistence_error)?;

    info!(event_id, ride_id, created_by = %actor.username, "Ride event appended");

    Ok(RideEventInfo {
        event_id,
        ride_id,
        created_at: now_str,
        description: request.description,
    })
}

/// Lists drivers with no ride currently in progress.
///
/// Any authenticated caller may use this; it feeds the driver choices
/// offered when booking a ride.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn list_available_drivers(
    persistence: &mut Persistence,
) -> Result<ListAvailableDriversResponse, ApiError> {
    let drivers: Vec<DriverInfo> = persistence
        .list_available_drivers()
        .map_err(translate_persistence_error)?
        .into_iter()
        .filter_map(|driver| {
            driver.user_id.map(|user_id| DriverInfo {
                user_id,
                username: driver.username,
                email: driver.email,
            })
        })
        .collect();

    Ok(ListAvailableDriversResponse { drivers })
}

/// Runs the trip-duration report (admin only).
///
/// # Errors
///
/// Returns `Unauthorized` for non-admin callers.
pub fn trip_duration_report(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<TripDurationReportResponse, ApiError> {
    AuthorizationService::authorize_trip_report(actor)?;

    let rows: Vec<TripDurationEntry> = persistence
        .trip_duration_report()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|row| TripDurationEntry {
            month: row.month,
            driver: row.driver,
            trips: row.trips,
        })
        .collect();

    Ok(TripDurationReportResponse { rows })
}
