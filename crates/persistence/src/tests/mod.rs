// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the persistence crate.
//!
//! Every test runs against a unique in-memory `SQLite` database. MariaDB
//! validation lives in `backend_validation_tests` behind `#[ignore]`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod backend_validation_tests;

use crate::Persistence;
use rideline_domain::{Coordinate, Ride};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database should initialize")
}

pub fn create_rider(persistence: &mut Persistence, username: &str, email: &str) -> i64 {
    persistence
        .create_account(
            username,
            email,
            "Horse-Battery-7!",
            "rider",
            "2026-01-01T00:00:00.000000000Z",
        )
        .expect("rider account should be created")
}

pub fn create_driver(persistence: &mut Persistence, username: &str) -> i64 {
    persistence
        .create_account(
            username,
            &format!("{username}@rideline.test"),
            "Horse-Battery-7!",
            "driver",
            "2026-01-01T00:00:00.000000000Z",
        )
        .expect("driver account should be created")
}

pub fn sample_ride(rider_id: i64, driver_id: i64) -> Ride {
    Ride::new(
        rider_id,
        driver_id,
        String::from("Market St & 5th"),
        String::from("Oakland City Center"),
        Coordinate::new(37.7749, -122.4194).expect("valid pickup"),
        Coordinate::new(37.8044, -122.2712).expect("valid dropoff"),
        String::from("2026-02-01T10:00:00.000000000Z"),
        String::from("2026-01-15T09:00:00.000000000Z"),
    )
}
