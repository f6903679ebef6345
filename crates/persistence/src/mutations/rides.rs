// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride mutations.
//!
//! The important write here is `persist_ride_transition`: the ride row update
//! and the driver's availability flip commit inside ONE database transaction.
//! The system this grew out of saved them as two independent writes, so a
//! crash between them left a completed ride with a driver still marked busy.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use rideline_domain::Ride;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{ride_events, rides, users};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a new ride.
///
/// The ride's `ride_id` is ignored on the way in; the database assigns one and
/// it is returned to the caller.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride` - The ride to insert
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. the rider or driver reference
/// violates a foreign key).
pub fn create_ride(conn: &mut _, ride: &Ride) -> Result<i64, PersistenceError> {
    info!(
        rider_id = ride.rider_id,
        driver_id = ride.driver_id,
        "Creating ride"
    );

    diesel::insert_into(rides::table)
        .values((
            rides::rider_id.eq(ride.rider_id),
            rides::driver_id.eq(ride.driver_id),
            rides::status.eq(ride.status.as_str()),
            rides::start_location.eq(&ride.start_location),
            rides::end_location.eq(&ride.end_location),
            rides::pickup_latitude.eq(ride.pickup.latitude()),
            rides::pickup_longitude.eq(ride.pickup.longitude()),
            rides::dropoff_latitude.eq(ride.dropoff.latitude()),
            rides::dropoff_longitude.eq(ride.dropoff.longitude()),
            rides::start_time.eq(&ride.start_time),
            rides::end_time.eq(ride.end_time.as_deref()),
            rides::created_at.eq(&ride.created_at),
            rides::updated_at.eq(&ride.updated_at),
        ))
        .execute(conn)?;

    let ride_id: i64 = conn.get_last_insert_rowid()?;

    info!(ride_id, "Ride created successfully");
    Ok(ride_id)
}
}

backend_fn! {
/// Persists a ride update together with its driver-availability side effect,
/// atomically.
///
/// The ride row is updated with every mutable field; when `driver_changed` is
/// true the driver's `is_available` flag is written in the same transaction.
/// Either both writes commit or neither does.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride` - The ride as it should be stored (must carry a `ride_id`)
/// * `driver_is_available` - The driver's availability flag after the
///   lifecycle rule ran
/// * `driver_changed` - Whether the lifecycle rule mutated the driver
///
/// # Errors
///
/// Returns `PersistenceError::RideNotFound` if the ride does not exist, or a
/// database error if either write fails (in which case neither is applied).
pub fn persist_ride_transition(
    conn: &mut _,
    ride: &Ride,
    driver_is_available: bool,
    driver_changed: bool,
) -> Result<(), PersistenceError> {
    let ride_id: i64 = ride
        .ride_id
        .ok_or_else(|| PersistenceError::Other(String::from("Ride has no ride_id")))?;

    debug!(
        ride_id,
        status = ride.status.as_str(),
        driver_changed,
        "Persisting ride transition"
    );

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let rows_affected: usize = diesel::update(rides::table)
            .filter(rides::ride_id.eq(ride_id))
            .set((
                rides::driver_id.eq(ride.driver_id),
                rides::status.eq(ride.status.as_str()),
                rides::start_location.eq(&ride.start_location),
                rides::end_location.eq(&ride.end_location),
                rides::pickup_latitude.eq(ride.pickup.latitude()),
                rides::pickup_longitude.eq(ride.pickup.longitude()),
                rides::dropoff_latitude.eq(ride.dropoff.latitude()),
                rides::dropoff_longitude.eq(ride.dropoff.longitude()),
                rides::start_time.eq(&ride.start_time),
                rides::end_time.eq(ride.end_time.as_deref()),
                rides::updated_at.eq(&ride.updated_at),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::RideNotFound(ride_id));
        }

        if driver_changed {
            diesel::update(users::table)
                .filter(users::user_id.eq(ride.driver_id))
                .set(users::is_available.eq(i32::from(driver_is_available)))
                .execute(conn)?;
        }

        Ok(())
    })
}
}

backend_fn! {
/// Appends an audit event to a ride.
///
/// Events are immutable once inserted; there is no update or delete path.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride_id` - The ride the event belongs to
/// * `created_at` - The event timestamp (ISO 8601)
/// * `description` - Free-text description
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. the ride does not exist).
pub fn append_ride_event(
    conn: &mut _,
    ride_id: i64,
    created_at: &str,
    description: &str,
) -> Result<i64, PersistenceError> {
    debug!(ride_id, "Appending ride event");

    diesel::insert_into(ride_events::table)
        .values((
            ride_events::ride_id.eq(ride_id),
            ride_events::created_at.eq(created_at),
            ride_events::description.eq(description),
        ))
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;

    debug!(event_id, ride_id, "Ride event appended");
    Ok(event_id)
}
}
