// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride query filtering and ordering.
//!
//! Composes the optional predicates (status equality, rider-email substring)
//! with exactly one ordering strategy, under the caller's authorization
//! scope. Scope restriction is applied BEFORE predicates and ordering so
//! out-of-scope rides leak neither counts nor positions.

use crate::distance::distance_km;
use crate::error::CoreError;
use rideline_domain::{Coordinate, Ride, RideStatus, Role};

/// A ride joined with the data the query predicates need.
///
/// `distance_km` is a transient annotation set by distance ordering; it is
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RideView {
    /// The ride.
    pub ride: Ride,
    /// The rider's email address, used by the substring predicate.
    pub rider_email: String,
    /// Distance from the reference coordinate, set iff distance ordering was
    /// requested.
    pub distance_km: Option<f64>,
}

impl RideView {
    /// Creates a view with no distance annotation.
    #[must_use]
    pub const fn new(ride: Ride, rider_email: String) -> Self {
        Self {
            ride,
            rider_email,
            distance_km: None,
        }
    }
}

/// Ordering strategies for ride queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideOrdering {
    /// Preserve the underlying store's order (insertion/primary-key order).
    #[default]
    Natural,
    /// Ascending by ride start time.
    PickupTime,
    /// Ascending by distance from a reference coordinate to the pickup
    /// point. Requires [`RideQueryOptions::reference`].
    Distance,
}

/// Filter and ordering options for a ride query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RideQueryOptions {
    /// Exact-match status filter.
    pub status: Option<RideStatus>,
    /// Case-insensitive substring filter on the rider's email.
    pub rider_email_contains: Option<String>,
    /// The ordering strategy.
    pub order_by: RideOrdering,
    /// The reference coordinate. Required iff `order_by` is `Distance`.
    pub reference: Option<Coordinate>,
}

/// The authorization scope a query runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    /// The calling user.
    pub user_id: i64,
    /// The calling user's role.
    pub role: Role,
}

impl QueryContext {
    /// Creates a new query context.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Applies scope restriction, predicates, and ordering to a collection of
/// ride views.
///
/// Non-admin callers only ever see rides where they are the rider. Predicates
/// commute and run before ordering. Distance ordering annotates every
/// surviving view with its distance and sorts ascending with a stable sort.
///
/// # Errors
///
/// Returns `CoreError::MissingParameter` if distance ordering is requested
/// without a reference coordinate.
pub fn query_rides(
    views: Vec<RideView>,
    options: &RideQueryOptions,
    context: &QueryContext,
) -> Result<Vec<RideView>, CoreError> {
    // Scope restriction comes first. Matching on the role keeps this check
    // exhaustive when new roles appear.
    let mut result: Vec<RideView> = match context.role {
        Role::Admin => views,
        Role::Driver | Role::Rider => views
            .into_iter()
            .filter(|view| view.ride.rider_id == context.user_id)
            .collect(),
    };

    if let Some(status) = options.status {
        result.retain(|view| view.ride.status == status);
    }

    if let Some(fragment) = &options.rider_email_contains {
        let needle = fragment.to_lowercase();
        result.retain(|view| view.rider_email.to_lowercase().contains(&needle));
    }

    match options.order_by {
        RideOrdering::Natural => {}
        RideOrdering::PickupTime => {
            // ISO 8601 UTC timestamps sort chronologically as strings.
            result.sort_by(|a, b| a.ride.start_time.cmp(&b.ride.start_time));
        }
        RideOrdering::Distance => {
            let reference = options.reference.ok_or_else(|| CoreError::MissingParameter {
                parameter: String::from("reference coordinate"),
            })?;
            for view in &mut result {
                view.distance_km = Some(distance_km(&reference, &view.ride.pickup));
            }
            result.sort_by(|a, b| {
                let da = a.distance_km.unwrap_or(f64::INFINITY);
                let db = b.distance_km.unwrap_or(f64::INFINITY);
                da.total_cmp(&db)
            });
        }
    }

    Ok(result)
}
