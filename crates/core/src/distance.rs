// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Great-circle distance computation and distance-ascending ride ranking.
//!
//! The haversine formula here is the reference implementation for distance
//! ordering. The persistence layer may order rides with a database-native
//! spherical-distance function instead; that path must produce the same
//! relative ordering for realistic coordinate deltas and is selected once at
//! configuration time, never per query.

use rideline_domain::{Coordinate, Ride};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A ride annotated with its transient distance from a reference point.
///
/// The distance is never persisted; recompute to re-rank after any
/// reference-point or ride-set change.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRide {
    /// The ride.
    pub ride: Ride,
    /// Great-circle distance from the reference point to the ride's pickup
    /// coordinate, in kilometers.
    pub distance_km: f64,
}

/// Computes the haversine great-circle distance between two coordinates, in
/// kilometers.
///
/// Symmetric under swapping the arguments, zero for identical coordinates,
/// and monotonically increasing with angular separation.
#[must_use]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let from_lat = from.latitude().to_radians();
    let from_lng = from.longitude().to_radians();
    let to_lat = to.latitude().to_radians();
    let to_lng = to.longitude().to_radians();

    let dlat = from_lat - to_lat;
    let dlng = from_lng - to_lng;

    let a = (dlat / 2.0).sin().powi(2) + to_lat.cos() * from_lat.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Ranks rides by ascending distance from a reference point to each ride's
/// pickup coordinate.
///
/// The sort is stable: rides at equal distance keep their original relative
/// order.
///
/// # Arguments
///
/// * `reference` - The coordinate distances are measured against
/// * `rides` - The rides to rank
#[must_use]
pub fn rank_by_distance(reference: &Coordinate, rides: Vec<Ride>) -> Vec<RankedRide> {
    let mut ranked: Vec<RankedRide> = rides
        .into_iter()
        .map(|ride| {
            let distance = distance_km(reference, &ride.pickup);
            RankedRide {
                ride,
                distance_km: distance,
            }
        })
        .collect();

    // Distances are finite for valid coordinates; total_cmp keeps the sort
    // deterministic regardless.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
