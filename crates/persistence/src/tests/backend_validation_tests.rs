// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for multi-database support.
//!
//! These tests validate that the persistence layer works correctly
//! across different database backends (`SQLite`, MariaDB/MySQL).
//!
//! ## Test Execution
//!
//! - `SQLite` tests run normally via `cargo test`
//! - MariaDB/MySQL tests are marked `#[ignore]` and run only via
//!   `cargo xtask test-mariadb`
//!
//! ## Infrastructure Requirements
//!
//! `MariaDB` tests require:
//! - `DATABASE_URL` environment variable (set by xtask)
//! - `RIDELINE_TEST_BACKEND=mariadb` environment variable
//! - Running `MariaDB` instance (provisioned by xtask)
//!
//! Tests fail fast if required infrastructure is missing.
//!
//! ## What These Tests Validate
//!
//! These tests focus on infrastructure and schema compatibility, not business
//! logic: migration application, foreign key enforcement, and the agreement
//! between the native spherical-distance ordering and the in-process
//! haversine ranking. Business logic is validated by the standard test suite
//! running against `SQLite`.

use diesel::MysqlConnection;
use diesel::prelude::*;
use std::env;

use crate::backend::mysql;
use crate::{Persistence, PersistenceError};
use rideline_core::rank_by_distance;
use rideline_domain::{Coordinate, Ride};

/// Helper to get the `MariaDB` connection URL from environment.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

/// Helper to verify we're running in the `MariaDB` test environment.
///
/// # Panics
///
/// Panics if `RIDELINE_TEST_BACKEND` is not set to `mariadb`.
fn verify_mariadb_test_environment() {
    let backend = env::var("RIDELINE_TEST_BACKEND").expect(
        "RIDELINE_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "RIDELINE_TEST_BACKEND must be 'mariadb'");
}

fn ride_with_pickup(rider_id: i64, driver_id: i64, lat: f64, lng: f64) -> Ride {
    Ride::new(
        rider_id,
        driver_id,
        String::from("A"),
        String::from("B"),
        Coordinate::new(lat, lng).unwrap(),
        Coordinate::new(37.8715, -122.2730).unwrap(),
        String::from("2026-02-01T10:00:00.000000000Z"),
        String::from("2026-01-15T09:00:00.000000000Z"),
    )
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = MysqlConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_cleanly() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = mysql::initialize_database(&url);
    assert!(
        result.is_ok(),
        "Failed to initialize MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_foreign_keys_enforced() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut persistence = Persistence::new_with_mysql(&url).unwrap();
    persistence.verify_foreign_key_enforcement().unwrap();

    // A ride referencing a missing driver must be rejected.
    let rider = persistence
        .create_account(
            "fk_rider",
            "fk_rider@rideline.test",
            "Horse-Battery-7!",
            "rider",
            "2026-01-01T00:00:00.000000000Z",
        )
        .unwrap();
    let result = persistence.create_ride(&ride_with_pickup(rider, 999_999, 37.7749, -122.4194));
    assert!(result.is_err());
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_duplicate_username_rejected() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut persistence = Persistence::new_with_mysql(&url).unwrap();
    persistence
        .create_account(
            "uniq_user",
            "uniq@rideline.test",
            "Horse-Battery-7!",
            "rider",
            "2026-01-01T00:00:00.000000000Z",
        )
        .unwrap();

    let result = persistence.create_account(
        "UNIQ_USER",
        "other@rideline.test",
        "Horse-Battery-7!",
        "rider",
        "2026-01-01T00:00:00.000000000Z",
    );
    assert!(result.is_err());
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_native_distance_ordering_agrees_with_haversine() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut persistence = Persistence::new_with_mysql(&url).unwrap();
    persistence.enable_native_distance().unwrap();

    let rider = persistence
        .create_account(
            "dist_rider",
            "dist@rideline.test",
            "Horse-Battery-7!",
            "rider",
            "2026-01-01T00:00:00.000000000Z",
        )
        .unwrap();
    let driver = persistence
        .create_account(
            "dist_driver",
            "dist_driver@rideline.test",
            "Horse-Battery-7!",
            "driver",
            "2026-01-01T00:00:00.000000000Z",
        )
        .unwrap();

    // Downtown SF, Oakland, Berkeley - distinct distances from the reference.
    for (lat, lng) in [
        (37.8044, -122.2712),
        (37.7749, -122.4194),
        (37.8715, -122.2730),
    ] {
        persistence
            .create_ride(&ride_with_pickup(rider, driver, lat, lng))
            .unwrap();
    }

    let reference = Coordinate::new(37.7750, -122.4195).unwrap();
    let native = persistence.list_ride_views_native_distance(&reference).unwrap();

    let rides: Vec<Ride> = native.iter().map(|v| v.ride.clone()).collect();
    let haversine = rank_by_distance(&reference, rides.clone());

    let native_ids: Vec<Option<i64>> = rides.iter().map(|r| r.ride_id).collect();
    let haversine_ids: Vec<Option<i64>> = haversine.iter().map(|r| r.ride.ride_id).collect();
    assert_eq!(
        native_ids, haversine_ids,
        "native and haversine orderings must agree"
    );
}

#[test]
fn test_sqlite_rejects_native_distance_strategy() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    match persistence.enable_native_distance() {
        Err(PersistenceError::NativeDistanceUnsupported) => {}
        other => panic!("Expected NativeDistanceUnsupported, got {other:?}"),
    }
}
