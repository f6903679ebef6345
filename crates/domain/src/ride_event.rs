// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// An append-only audit entry attached to a ride.
///
/// Events are immutable once created. The creation timestamp is assigned by
/// the persistence layer at insertion time; the surrounding application emits
/// an event whenever a notable state change occurs (the lifecycle rule itself
/// does not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideEvent {
    /// Canonical identifier. `None` before the event is persisted.
    pub event_id: Option<i64>,
    /// The ride this event belongs to.
    pub ride_id: i64,
    /// When the event was recorded (ISO 8601, assigned at insertion).
    pub created_at: String,
    /// Free-text description of what happened.
    pub description: String,
}

impl RideEvent {
    /// Creates a new `RideEvent` without a persisted `event_id`.
    ///
    /// # Arguments
    ///
    /// * `ride_id` - The ride this event belongs to
    /// * `created_at` - The event timestamp (ISO 8601)
    /// * `description` - Free-text description
    #[must_use]
    pub const fn new(ride_id: i64, created_at: String, description: String) -> Self {
        Self {
            event_id: None,
            ride_id,
            created_at,
            description,
        }
    }

    /// Creates a `RideEvent` with an existing `event_id` (from persistence).
    #[must_use]
    pub const fn with_id(
        event_id: i64,
        ride_id: i64,
        created_at: String,
        description: String,
    ) -> Self {
        Self {
            event_id: Some(event_id),
            ride_id,
            created_at,
            description,
        }
    }
}
