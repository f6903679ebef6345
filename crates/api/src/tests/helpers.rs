// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use rideline_domain::Role;
use rideline_persistence::Persistence;

use crate::auth::AuthenticatedActor;
use crate::request_response::CreateRideRequest;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database should initialize")
}

fn create_account(persistence: &mut Persistence, username: &str, role: Role) -> AuthenticatedActor {
    let user_id = persistence
        .create_account(
            username,
            &format!("{username}@example.com"),
            "Horse-Battery-7!",
            role.as_str(),
            "2026-01-01T00:00:00.000000000Z",
        )
        .expect("account should be created");
    AuthenticatedActor::new(user_id, username.to_string(), role)
}

pub fn create_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_account(persistence, "admin", Role::Admin)
}

pub fn create_rider(persistence: &mut Persistence, username: &str) -> AuthenticatedActor {
    create_account(persistence, username, Role::Rider)
}

pub fn create_driver(persistence: &mut Persistence, username: &str) -> AuthenticatedActor {
    create_account(persistence, username, Role::Driver)
}

pub fn ride_request(rider_id: i64, driver_id: i64) -> CreateRideRequest {
    CreateRideRequest {
        rider_id,
        driver_id,
        start_location: String::from("Market St & 5th"),
        end_location: String::from("Oakland City Center"),
        pickup_latitude: 37.7749,
        pickup_longitude: -122.4194,
        dropoff_latitude: 37.8044,
        dropoff_longitude: -122.2712,
        start_time: String::from("2026-02-01T10:00:00.000000000Z"),
    }
}

pub fn ride_request_with_pickup(
    rider_id: i64,
    driver_id: i64,
    latitude: f64,
    longitude: f64,
) -> CreateRideRequest {
    let mut request = ride_request(rider_id, driver_id);
    request.pickup_latitude = latitude;
    request.pickup_longitude = longitude;
    request
}
