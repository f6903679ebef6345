// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.
//!
//! This module contains backend-agnostic mutations for persisting accounts
//! and sessions. Most mutations use Diesel DSL, with minimal backend-specific
//! helpers abstracted via the `PersistenceBackend` trait.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

backend_fn! {
/// Creates a new account.
///
/// The `username` is normalized to lowercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The login name (will be normalized)
/// * `email` - The contact email address
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role string (`admin`, `driver`, or `rider`)
/// * `created_at` - Creation timestamp (ISO 8601)
///
/// # Errors
///
/// Returns an error if the account cannot be created or if the username
/// already exists.
pub fn create_account(
    conn: &mut _,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    let normalized_username: String = username.to_lowercase();

    info!(
        "Creating account with username: {}, role: {}",
        normalized_username, role
    );

    // Hash the password using bcrypt
    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::username.eq(&normalized_username),
            users::email.eq(email),
            users::password_hash.eq(&password_hash),
            users::role.eq(role),
            users::is_available.eq(1),
            users::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "Account created successfully");

    Ok(user_id)
}
}

backend_fn! {
/// Sets a driver's availability flag.
///
/// This is the persistence half of the ride lifecycle's driver side effect.
/// Callers transitioning a ride's status must use `persist_ride_transition`
/// instead so the ride and driver writes commit atomically; this standalone
/// mutation exists for administrative correction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The driver's user ID
/// * `is_available` - The new availability flag
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn set_driver_availability(
    conn: &mut _,
    user_id: i64,
    is_available: bool,
) -> Result<(), PersistenceError> {
    debug!(
        "Setting is_available = {} for user ID: {}",
        is_available, user_id
    );

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::is_available.eq(i32::from(is_available)))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Updates the last login timestamp for an account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The user ID
/// * `timestamp` - The login timestamp (ISO 8601)
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut _,
    user_id: i64,
    timestamp: &str,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for user ID: {}", user_id);

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::last_login_at.eq(Some(timestamp)))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Updates an account's password.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The user ID
/// * `new_password` - The new password (will be hashed)
///
/// # Errors
///
/// Returns an error if the password cannot be hashed or the update fails.
pub fn update_password(
    conn: &mut _,
    user_id: i64,
    new_password: &str,
) -> Result<(), PersistenceError> {
    info!("Updating password for user ID: {}", user_id);

    // Hash the new password using bcrypt
    let password_hash: String = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::password_hash.eq(&password_hash))
        .execute(conn)?;

    info!("Password updated for user ID: {}", user_id);
    Ok(())
}
}

backend_fn! {
/// Creates a new session for a user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The user ID
/// * `created_at` - The creation timestamp (ISO 8601)
/// * `expires_at` - The expiration timestamp (ISO 8601)
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    user_id: i64,
    created_at: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(
        "Creating session for user ID: {} with expiration: {}",
        user_id, expires_at
    );

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(created_at),
            sessions::last_activity_at.eq(created_at),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Updates the last activity timestamp for a session.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_id` - The session ID
/// * `timestamp` - The activity timestamp (ISO 8601)
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut _,
    session_id: i64,
    timestamp: &str,
) -> Result<(), PersistenceError> {
    debug!("Updating last_activity_at for session ID: {}", session_id);

    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(timestamp))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes a session by token.
///
/// This is used for logout operations.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The session token to delete
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes all sessions that expired before the given instant.
///
/// This is a cleanup operation that should be run periodically.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `now` - The current time (ISO 8601); sessions expiring before it are
///   deleted
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut _, now: &str) -> Result<usize, PersistenceError> {
    debug!("Deleting expired sessions");

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
}

backend_fn! {
/// Deletes all sessions for a specific user.
///
/// This is used when a password is changed to invalidate all active sessions.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The user ID whose sessions should be deleted
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(conn: &mut _, user_id: i64) -> Result<usize, PersistenceError> {
    info!("Deleting all sessions for user ID: {}", user_id);

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?;

    Ok(rows_affected)
}
}
