// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::query::RideView;
use rideline_domain::{Coordinate, Ride, RideStatus};

pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid test coordinate")
}

pub fn ride(ride_id: i64, rider_id: i64, status: RideStatus, start_time: &str) -> Ride {
    let mut ride = Ride::new(
        rider_id,
        100,
        String::from("Location A"),
        String::from("Location B"),
        coord(37.7749, -122.4194),
        coord(37.8044, -122.2712),
        start_time.to_string(),
        String::from("2026-01-01T00:00:00.000000000Z"),
    );
    ride.ride_id = Some(ride_id);
    ride.status = status;
    ride
}

pub fn view(ride_id: i64, rider_id: i64, email: &str, status: RideStatus) -> RideView {
    RideView::new(
        ride(ride_id, rider_id, status, "2026-01-01T10:00:00.000000000Z"),
        email.to_string(),
    )
}

pub fn view_with_pickup(ride_id: i64, rider_id: i64, email: &str, pickup: Coordinate) -> RideView {
    let mut r = ride(
        ride_id,
        rider_id,
        RideStatus::Scheduled,
        "2026-01-01T10:00:00.000000000Z",
    );
    r.pickup = pickup;
    RideView::new(r, email.to_string())
}

pub fn ride_ids(views: &[RideView]) -> Vec<i64> {
    views.iter().filter_map(|v| v.ride.ride_id).collect()
}
