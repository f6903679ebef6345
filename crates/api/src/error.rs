// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use rideline_core::CoreError;
use rideline_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// An `Unauthorized` is always surfaced as a permission error, never silently
/// downgraded to an empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A request field failed validation.
    ValidationFailure {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A required parameter was not supplied for the requested operation.
    MissingParameter {
        /// The name of the missing parameter.
        parameter: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::ValidationFailure { field, message } => {
                write!(f, "Invalid value for field '{field}': {message}")
            }
            Self::MissingParameter { parameter } => {
                write!(f, "Missing required parameter: {parameter}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidLatitude(lat) => ApiError::ValidationFailure {
            field: String::from("latitude"),
            message: format!("Invalid latitude {lat}: must be between -90 and 90"),
        },
        DomainError::InvalidLongitude(lng) => ApiError::ValidationFailure {
            field: String::from("longitude"),
            message: format!("Invalid longitude {lng}: must be between -180 and 180"),
        },
        DomainError::InvalidRideStatus { status } => ApiError::ValidationFailure {
            field: String::from("status"),
            message: format!("'{status}' is not a valid ride status"),
        },
        DomainError::InvalidRole(role) => ApiError::ValidationFailure {
            field: String::from("role"),
            message: format!("'{role}' is not a valid role"),
        },
        DomainError::InvalidUsername(msg) => ApiError::ValidationFailure {
            field: String::from("username"),
            message: msg,
        },
        DomainError::InvalidEmail(msg) => ApiError::ValidationFailure {
            field: String::from("email"),
            message: msg,
        },
        DomainError::InvalidLocation(msg) => ApiError::ValidationFailure {
            field: String::from("location"),
            message: msg,
        },
        DomainError::RideNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {id} does not exist"),
        },
        DomainError::UserNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("User {id} does not exist"),
        },
        DomainError::RoleMismatch {
            user_id,
            required_role,
            actual_role,
        } => ApiError::ValidationFailure {
            field: required_role.clone(),
            message: format!(
                "User {user_id} has role {actual_role}, but {required_role} is required"
            ),
        },
        DomainError::InvalidTimestamp { value, reason } => ApiError::ValidationFailure {
            field: String::from("timestamp"),
            message: format!("Invalid timestamp '{value}': {reason}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::MissingParameter { parameter } => ApiError::MissingParameter { parameter },
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Store errors surface as server faults; the not-found cases become
/// client-visible resource errors.
#[must_use]
pub fn translate_persistence_error(err: rideline_persistence::PersistenceError) -> ApiError {
    match err {
        rideline_persistence::PersistenceError::RideNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Ride"),
            message: format!("Ride {id} does not exist"),
        },
        rideline_persistence::PersistenceError::AccountNotFound(msg) => {
            ApiError::ResourceNotFound {
                resource_type: String::from("Account"),
                message: msg,
            }
        }
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
