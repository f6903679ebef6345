// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.
//!
//! This module contains backend-agnostic queries for retrieving accounts
//! and sessions. All queries use Diesel DSL and work across all supported
//! database backends.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use rideline_domain::User;
use tracing::debug;

use crate::data_models::{AccountData, SessionData};
use crate::diesel_schema::{rides, sessions, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for account rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct AccountRow {
    user_id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_available: i32,
    created_at: String,
    last_login_at: Option<String>,
}

impl AccountRow {
    fn into_account(self) -> AccountData {
        AccountData {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            is_available: self.is_available != 0,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

backend_fn! {
/// Retrieves an account by username.
///
/// The `username` is normalized to lowercase for case-insensitive lookup.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The username to search for
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_username(
    conn: &mut _,
    username: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    let normalized_username: String = username.to_lowercase();

    debug!("Looking up account by username: {}", normalized_username);

    let result: Result<AccountRow, diesel::result::Error> = users::table
        .filter(users::username.eq(&normalized_username))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_account())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Retrieves an account by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The user ID
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_id(
    conn: &mut _,
    user_id: i64,
) -> Result<Option<AccountData>, PersistenceError> {
    debug!("Looking up account by ID: {}", user_id);

    let result: Result<AccountRow, diesel::result::Error> = users::table
        .filter(users::user_id.eq(user_id))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_account())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Retrieves a session by token.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The session token
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists drivers that are free to take a new ride.
///
/// A driver is available when they hold the driver role and have no ride
/// currently in progress. This mirrors the driver choices the ride-creation
/// flow offers.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Errors
///
/// Returns an error if the database query fails or a stored role string is
/// unrecognized.
pub fn list_available_drivers(conn: &mut _) -> Result<Vec<User>, PersistenceError> {
    use diesel::dsl::{exists, not};

    debug!("Listing available drivers");

    let rows: Vec<AccountRow> = users::table
        .filter(users::role.eq("driver"))
        .filter(not(exists(
            rides::table
                .filter(rides::driver_id.eq(users::user_id))
                .filter(rides::status.eq("in_progress")),
        )))
        .select(AccountRow::as_select())
        .order_by(users::username.asc())
        .load(conn)?;

    rows.into_iter()
        .map(|row| row.into_account().to_user())
        .collect()
}
}

/// Verifies a password against a stored hash.
///
/// This is a backend-agnostic utility function that uses bcrypt.
///
/// # Arguments
///
/// * `password` - The plain text password to verify
/// * `password_hash` - The stored bcrypt hash
///
/// # Errors
///
/// Returns an error if password verification fails.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
