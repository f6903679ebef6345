// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride, ride-view, and ride-event queries.
//!
//! Ride listings come back as core `RideView`s (ride + rider email) in
//! primary-key order; scope restriction, predicates, and ordering are the
//! core query filter's job. The one exception is the `MySQL`-only native
//! spherical-distance listing, which orders rides in SQL with
//! `ST_Distance_Sphere` for deployments that opt into it.

use diesel::prelude::*;
use diesel::sql_types::Double;
use diesel::{MysqlConnection, SqliteConnection};
use rideline_core::RideView;
use rideline_domain::{Coordinate, Ride, RideEvent, RideStatus};
use tracing::debug;

use crate::diesel_schema::{ride_events, rides, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for ride rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = rides)]
struct RideRow {
    ride_id: i64,
    rider_id: i64,
    driver_id: i64,
    status: String,
    start_location: String,
    end_location: String,
    pickup_latitude: f64,
    pickup_longitude: f64,
    dropoff_latitude: f64,
    dropoff_longitude: f64,
    start_time: String,
    end_time: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RideRow {
    /// Converts a stored row back into a domain `Ride`.
    ///
    /// Stored coordinates and status strings are revalidated on the way out;
    /// a value the domain rejects means the row was corrupted outside this
    /// crate's write paths.
    fn into_ride(self) -> Result<Ride, PersistenceError> {
        let status: RideStatus = self
            .status
            .parse()
            .map_err(|e: rideline_domain::DomainError| {
                PersistenceError::CorruptRecord(e.to_string())
            })?;
        let pickup: Coordinate = Coordinate::new(self.pickup_latitude, self.pickup_longitude)?;
        let dropoff: Coordinate = Coordinate::new(self.dropoff_latitude, self.dropoff_longitude)?;

        Ok(Ride::with_id(
            self.ride_id,
            self.rider_id,
            self.driver_id,
            status,
            self.start_location,
            self.end_location,
            pickup,
            dropoff,
            self.start_time,
            self.end_time,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Row struct for the native-distance listing (raw SQL, `MySQL` only).
#[derive(QueryableByName)]
struct NativeDistanceRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    ride_id: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    rider_id: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    driver_id: i64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    status: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    start_location: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    end_location: String,
    #[diesel(sql_type = Double)]
    pickup_latitude: f64,
    #[diesel(sql_type = Double)]
    pickup_longitude: f64,
    #[diesel(sql_type = Double)]
    dropoff_latitude: f64,
    #[diesel(sql_type = Double)]
    dropoff_longitude: f64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    start_time: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    end_time: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Text)]
    created_at: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    updated_at: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    rider_email: String,
}

impl NativeDistanceRow {
    fn into_ride_row(self) -> (RideRow, String) {
        (
            RideRow {
                ride_id: self.ride_id,
                rider_id: self.rider_id,
                driver_id: self.driver_id,
                status: self.status,
                start_location: self.start_location,
                end_location: self.end_location,
                pickup_latitude: self.pickup_latitude,
                pickup_longitude: self.pickup_longitude,
                dropoff_latitude: self.dropoff_latitude,
                dropoff_longitude: self.dropoff_longitude,
                start_time: self.start_time,
                end_time: self.end_time,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.rider_email,
        )
    }
}

backend_fn! {
/// Retrieves a ride by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride_id` - The ride ID
///
/// # Errors
///
/// Returns an error if the database query fails or the stored row violates a
/// domain invariant. Returns `Ok(None)` if the ride is not found.
pub fn get_ride(conn: &mut _, ride_id: i64) -> Result<Option<Ride>, PersistenceError> {
    debug!("Looking up ride by ID: {}", ride_id);

    let result: Result<RideRow, diesel::result::Error> = rides::table
        .filter(rides::ride_id.eq(ride_id))
        .select(RideRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_ride()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists every ride joined with its rider's email, in primary-key order.
///
/// This is the store's natural order; the core query filter applies scope,
/// predicates, and any requested ordering on top.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row violates a
/// domain invariant.
pub fn list_ride_views(conn: &mut _) -> Result<Vec<RideView>, PersistenceError> {
    debug!("Listing ride views in natural order");

    let rows: Vec<(RideRow, String)> = rides::table
        .inner_join(users::table.on(rides::rider_id.eq(users::user_id)))
        .select((RideRow::as_select(), users::email))
        .order_by(rides::ride_id.asc())
        .load(conn)?;

    rows.into_iter()
        .map(|(row, rider_email)| Ok(RideView::new(row.into_ride()?, rider_email)))
        .collect()
}
}

/// Lists ride views ordered by a database-native spherical distance from a
/// reference point to each ride's pickup coordinate (`MySQL` only).
///
/// `ST_Distance_Sphere` has no `SQLite` counterpart, so this query is a
/// deliberate exception to the backend-agnostic rule: it exists only in a
/// `_mysql` variant and is reachable only when the native distance strategy
/// was enabled at configuration time. Its ordering must agree with the
/// in-process haversine ranking for realistic coordinate deltas.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `reference` - The coordinate distances are measured against
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row violates a
/// domain invariant.
pub fn list_ride_views_native_distance_mysql(
    conn: &mut MysqlConnection,
    reference: &Coordinate,
) -> Result<Vec<RideView>, PersistenceError> {
    debug!("Listing ride views by native spherical distance");

    // NOTE: raw SQL is justified - Diesel has no ST_Distance_Sphere DSL.
    // POINT takes (longitude, latitude).
    let rows: Vec<NativeDistanceRow> = diesel::sql_query(
        "SELECT r.ride_id, r.rider_id, r.driver_id, r.status, \
                r.start_location, r.end_location, \
                r.pickup_latitude, r.pickup_longitude, \
                r.dropoff_latitude, r.dropoff_longitude, \
                r.start_time, r.end_time, r.created_at, r.updated_at, \
                u.email AS rider_email \
         FROM rides r \
         JOIN users u ON r.rider_id = u.user_id \
         ORDER BY ST_Distance_Sphere(\
             POINT(r.pickup_longitude, r.pickup_latitude), POINT(?, ?)), \
             r.ride_id",
    )
    .bind::<Double, _>(reference.longitude())
    .bind::<Double, _>(reference.latitude())
    .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let (ride_row, rider_email) = row.into_ride_row();
            Ok(RideView::new(ride_row.into_ride()?, rider_email))
        })
        .collect()
}

backend_fn! {
/// Lists all events for a ride, oldest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride_id` - The ride ID
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_ride_events(conn: &mut _, ride_id: i64) -> Result<Vec<RideEvent>, PersistenceError> {
    debug!("Listing events for ride ID: {}", ride_id);

    let rows: Vec<(i64, i64, String, String)> = ride_events::table
        .filter(ride_events::ride_id.eq(ride_id))
        .select((
            ride_events::event_id,
            ride_events::ride_id,
            ride_events::created_at,
            ride_events::description,
        ))
        .order_by(ride_events::event_id.asc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(event_id, ride_id, created_at, description)| {
            RideEvent::with_id(event_id, ride_id, created_at, description)
        })
        .collect())
}
}

backend_fn! {
/// Counts events recorded for a ride at or after a cutoff timestamp.
///
/// Used to annotate listings with the ride's activity over the last day.
/// ISO 8601 UTC timestamps compare chronologically as text.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ride_id` - The ride ID
/// * `since` - The cutoff timestamp (ISO 8601)
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_recent_events(
    conn: &mut _,
    ride_id: i64,
    since: &str,
) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let count: i64 = ride_events::table
        .filter(ride_events::ride_id.eq(ride_id))
        .filter(ride_events::created_at.ge(since))
        .select(count(ride_events::event_id))
        .first(conn)?;

    Ok(count)
}
}
