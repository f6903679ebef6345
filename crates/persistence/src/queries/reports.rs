// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The trip-duration report.
//!
//! Counts rides per driver per month where the time between the ride's first
//! "Status changed to in_progress" event and a "Status changed to completed"
//! event exceeded one hour.
//!
//! This is raw SQL with hand-written per-backend variants (justified):
//! timestamps are stored as ISO 8601 text, and the interval arithmetic
//! needed here differs between `SQLite` (julianday) and `MySQL`
//! (STR_TO_DATE + TIMESTAMPDIFF). Both variants truncate the month from the
//! text prefix and MUST return identical rows for identical data.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::TripDurationRow;
use crate::error::PersistenceError;

/// Raw result row for the report queries.
#[derive(QueryableByName)]
struct ReportRow {
    #[diesel(sql_type = Text)]
    month: String,
    #[diesel(sql_type = Text)]
    driver: String,
    #[diesel(sql_type = BigInt)]
    trips: i64,
}

impl ReportRow {
    fn into_row(self) -> TripDurationRow {
        TripDurationRow {
            month: self.month,
            driver: self.driver,
            trips: self.trips,
        }
    }
}

/// Runs the trip-duration report on `SQLite`.
///
/// Elapsed time is computed by converting the second-precision prefix of the
/// ISO 8601 text timestamps through `julianday`; one hour is 1/24 of a day.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn trip_duration_report_sqlite(
    conn: &mut SqliteConnection,
) -> Result<Vec<TripDurationRow>, PersistenceError> {
    debug!("Running trip-duration report (SQLite)");

    let rows: Vec<ReportRow> = diesel::sql_query(
        "SELECT substr(e.created_at, 1, 7) AS month, \
                u.username AS driver, \
                COUNT(*) AS trips \
         FROM ride_events e \
         JOIN rides r ON e.ride_id = r.ride_id \
         JOIN users u ON r.driver_id = u.user_id \
         WHERE e.description = 'Status changed to completed' \
           AND julianday(substr(e.created_at, 1, 19)) - ( \
                 SELECT MIN(julianday(substr(e2.created_at, 1, 19))) \
                 FROM ride_events e2 \
                 WHERE e2.ride_id = r.ride_id \
                   AND e2.description = 'Status changed to in_progress' \
               ) > 1.0 / 24.0 \
         GROUP BY month, driver \
         ORDER BY month, driver",
    )
    .load(conn)?;

    Ok(rows.into_iter().map(ReportRow::into_row).collect())
}

/// Runs the trip-duration report on `MySQL`/`MariaDB`.
///
/// Elapsed time is computed by parsing the second-precision prefix of the
/// ISO 8601 text timestamps with `STR_TO_DATE` and comparing via
/// `TIMESTAMPDIFF(SECOND, ...)`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn trip_duration_report_mysql(
    conn: &mut MysqlConnection,
) -> Result<Vec<TripDurationRow>, PersistenceError> {
    debug!("Running trip-duration report (MySQL)");

    let rows: Vec<ReportRow> = diesel::sql_query(
        "SELECT SUBSTRING(e.created_at, 1, 7) AS month, \
                u.username AS driver, \
                COUNT(*) AS trips \
         FROM ride_events e \
         JOIN rides r ON e.ride_id = r.ride_id \
         JOIN users u ON r.driver_id = u.user_id \
         WHERE e.description = 'Status changed to completed' \
           AND TIMESTAMPDIFF(SECOND, \
                 ( \
                   SELECT MIN(STR_TO_DATE(SUBSTRING(e2.created_at, 1, 19), \
                                          '%Y-%m-%dT%H:%i:%s')) \
                   FROM ride_events e2 \
                   WHERE e2.ride_id = r.ride_id \
                     AND e2.description = 'Status changed to in_progress' \
                 ), \
                 STR_TO_DATE(SUBSTRING(e.created_at, 1, 19), '%Y-%m-%dT%H:%i:%s') \
               ) > 3600 \
         GROUP BY month, driver \
         ORDER BY month, driver",
    )
    .load(conn)?;

    Ok(rows.into_iter().map(ReportRow::into_row).collect())
}
