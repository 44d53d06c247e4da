//! WGS84 → KMA forecast-grid projection.
//!
//! The short-term forecast API addresses locations by integer (nx, ny)
//! cells on a 5 km Lambert Conformal Conic grid, not by lat/lon. The
//! parameters below are the agency's published grid definition and must
//! not be tuned: the mapping has to reproduce the official cell table
//! bit-for-bit (Seoul City Hall is (60, 127)).

use crate::model::{GeoPoint, GridCell};
use std::f64::consts::PI;

/// Earth radius used by the grid definition, km.
const EARTH_RADIUS_KM: f64 = 6371.00877;
/// Grid spacing, km.
const GRID_SPACING_KM: f64 = 5.0;
/// First standard parallel, degrees.
const STD_PARALLEL_1: f64 = 30.0;
/// Second standard parallel, degrees.
const STD_PARALLEL_2: f64 = 60.0;
/// Projection origin longitude, degrees.
const ORIGIN_LON: f64 = 126.0;
/// Projection origin latitude, degrees.
const ORIGIN_LAT: f64 = 38.0;
/// Grid index of the projection origin, X.
const ORIGIN_X: f64 = 43.0;
/// Grid index of the projection origin, Y.
const ORIGIN_Y: f64 = 136.0;

/// Projects a geographic point onto the KMA forecast grid.
///
/// Total and pure: every real-world coordinate maps to some integer
/// cell, possibly outside the provider's coverage. Whether the cell is
/// servable is the provider's concern, not the projection's.
pub fn project(point: GeoPoint) -> GridCell {
    let re = EARTH_RADIUS_KM / GRID_SPACING_KM;
    let slat1 = STD_PARALLEL_1.to_radians();
    let slat2 = STD_PARALLEL_2.to_radians();
    let olon = ORIGIN_LON.to_radians();
    let olat = ORIGIN_LAT.to_radians();

    // Cone constant from the two standard parallels.
    let sn = (slat1.cos() / slat2.cos()).ln()
        / ((PI * 0.25 + slat2 * 0.5).tan() / (PI * 0.25 + slat1 * 0.5).tan()).ln();
    let sf = (PI * 0.25 + slat1 * 0.5).tan().powf(sn) * slat1.cos() / sn;

    // Projected radii for the origin latitude and the input latitude.
    let ro = re * sf / (PI * 0.25 + olat * 0.5).tan().powf(sn);
    let ra = re * sf / (PI * 0.25 + point.lat.to_radians() * 0.5).tan().powf(sn);

    let mut theta = point.lon.to_radians() - olon;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta *= sn;

    let x = ra * theta.sin() + ORIGIN_X;
    let y = ro - ra * theta.cos() + ORIGIN_Y;

    // The grid definition rounds half away from zero.
    GridCell {
        nx: x.round() as i32,
        ny: y.round() as i32,
    }
}
