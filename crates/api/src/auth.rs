// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization services.
//!
//! The actors here are the system's own users: admins, drivers, and riders.
//! Authorization is one explicit check per privileged action with an
//! exhaustive `Role` match, so adding a role is a compile-time-checked
//! change at every decision point.

use time::format_description::well_known::Iso8601;
use time::{Duration, OffsetDateTime};

use rideline_domain::{Ride, Role};
use rideline_persistence::{AccountData, Persistence, PersistenceError, SessionData};

use crate::error::AuthError;

/// An authenticated user with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's canonical identifier.
    pub user_id: i64,
    /// The user's login name.
    pub username: String,
    /// The role the user holds.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's canonical identifier
    /// * `username` - The user's login name
    /// * `role` - The role the user holds
    #[must_use]
    pub const fn new(user_id: i64, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }
}

/// Authorization service for enforcing role-based access control.
///
/// This service determines whether an authenticated actor has permission
/// to perform a specific action based on their role (and, for per-ride
/// actions, their relationship to the ride).
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may create accounts with an arbitrary role.
    ///
    /// Only admins; everyone else registers through the public path, which
    /// fixes the role to rider.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the admin role.
    pub fn authorize_create_account(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => Err(AuthError::Unauthorized {
                action: String::from("create_account"),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks if an actor may create a ride for the given rider.
    ///
    /// Admins may book for anyone; everyone else only for themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-admin actor books for another user.
    pub fn authorize_create_ride(
        actor: &AuthenticatedActor,
        rider_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => {
                if actor.user_id == rider_id {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("create_ride_for_other_rider"),
                        required_role: String::from("admin"),
                    })
                }
            }
        }
    }

    /// Checks if an actor may view the given ride.
    ///
    /// Admins see everything; everyone else only rides where they are the
    /// rider.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not view the ride.
    pub fn authorize_view_ride(actor: &AuthenticatedActor, ride: &Ride) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => {
                if ride.rider_id == actor.user_id {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("view_ride"),
                        required_role: String::from("admin"),
                    })
                }
            }
        }
    }

    /// Checks if an actor may update the given ride.
    ///
    /// Admins may update any ride; a driver may update the rides assigned to
    /// them. Riders cannot mutate ride state.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not update the ride.
    pub fn authorize_update_ride(actor: &AuthenticatedActor, ride: &Ride) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver => {
                if ride.driver_id == actor.user_id {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("update_ride"),
                        required_role: String::from("admin"),
                    })
                }
            }
            Role::Rider => Err(AuthError::Unauthorized {
                action: String::from("update_ride"),
                required_role: String::from("admin or assigned driver"),
            }),
        }
    }

    /// Checks if an actor may list a ride's events.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the admin role.
    pub fn authorize_list_ride_events(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => Err(AuthError::Unauthorized {
                action: String::from("list_ride_events"),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks if an actor may append a ride event directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the admin role.
    pub fn authorize_create_ride_event(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => Err(AuthError::Unauthorized {
                action: String::from("create_ride_event"),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks if an actor may run the trip-duration report.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the admin role.
    pub fn authorize_trip_report(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver | Role::Rider => Err(AuthError::Unauthorized {
                action: String::from("trip_duration_report"),
                required_role: String::from("admin"),
            }),
        }
    }
}

/// Session-based authentication service.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Authenticates a user by password and creates a session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `username` - The login name (case-insensitive)
    /// * `password` - The plain-text password
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`).
    ///
    /// # Errors
    ///
    /// Returns an error if the account is unknown, the password does not
    /// verify, or the session cannot be created. The unknown-account and
    /// wrong-password cases produce the same message so login failures do not
    /// reveal which usernames exist.
    pub fn login(
        persistence: &mut Persistence,
        username: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor), AuthError> {
        let account: AccountData = persistence
            .get_account_by_username(username)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid username or password"),
            })?;

        let verified: bool = persistence
            .verify_password(password, &account.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !verified {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid username or password"),
            });
        }

        let role: Role =
            Role::parse(&account.role).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Invalid stored role: {e}"),
            })?;

        let session_token: String = Self::generate_session_token();

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let now_str: String = Self::format_instant(now)?;
        let expires_at_str: String = Self::format_instant(now + Self::DEFAULT_SESSION_EXPIRATION)?;

        persistence
            .create_session(&session_token, account.user_id, &now_str, &expires_at_str)
            .map_err(Self::map_persistence_error)?;

        persistence
            .update_last_login(account.user_id, &now_str)
            .map_err(Self::map_persistence_error)?;

        let actor: AuthenticatedActor =
            AuthenticatedActor::new(account.user_id, account.username.clone(), role);

        Ok((session_token, actor))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// Stamps the session's last-activity timestamp on success.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `session_token` - The session token to validate
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            OffsetDateTime::parse(&session.expires_at, &Iso8601::DEFAULT).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session expiration: {e}"),
                }
            })?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        if now > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        let role: Role =
            Role::parse(&account.role).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Invalid stored role: {e}"),
            })?;

        persistence
            .update_session_activity(session.session_id, &Self::format_instant(now)?)
            .map_err(Self::map_persistence_error)?;

        Ok(AuthenticatedActor::new(
            account.user_id,
            account.username,
            role,
        ))
    }

    /// Logs out by deleting the session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `session_token` - The session token to delete
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;

        Ok(())
    }

    /// Generates an opaque session token from 128 bits of randomness.
    fn generate_session_token() -> String {
        format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
    }

    /// Formats an instant as ISO 8601 for storage.
    fn format_instant(instant: OffsetDateTime) -> Result<String, AuthError> {
        instant
            .format(&Iso8601::DEFAULT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format timestamp: {e}"),
            })
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(msg) | PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
