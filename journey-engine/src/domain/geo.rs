//! Coordinates and spherical distance helpers.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_010.0;

/// Error returned when a coordinate is outside the valid lat/lon range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lon}): {reason}")]
pub struct InvalidCoordinate {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, checking it is finite and in range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        let coordinate = Self { lat, lon };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check the coordinate is finite and in range.
    pub fn validate(&self) -> Result<(), InvalidCoordinate> {
        let err = |reason| InvalidCoordinate {
            lat: self.lat,
            lon: self.lon,
            reason,
        };
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(err("not a finite number"));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(err("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(err("longitude out of range"));
        }
        Ok(())
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }

    /// Initial bearing towards `other` in whole degrees clockwise from
    /// north, in `[0, 360)`.
    pub fn bearing_to(&self, other: &Coordinate) -> u16 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlon = (other.lon - self.lon).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
        (degrees.round() as u16) % 360
    }

    /// Distance in meters from this point to the segment `a`-`b`.
    ///
    /// Uses a local equirectangular projection, which is accurate for the
    /// short segments found in street networks.
    pub fn distance_to_segment(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        let cos_lat = self.lat.to_radians().cos();
        let project = |c: &Coordinate| {
            (
                (c.lon - self.lon).to_radians() * cos_lat * EARTH_RADIUS_M,
                (c.lat - self.lat).to_radians() * EARTH_RADIUS_M,
            )
        };
        let (ax, ay) = project(a);
        let (bx, by) = project(b);
        let (dx, dy) = (bx - ax, by - ay);
        let len2 = dx * dx + dy * dy;
        let t = if len2 == 0.0 {
            0.0
        } else {
            (-(ax * dx + ay * dy) / len2).clamp(0.0, 1.0)
        };
        let (px, py) = (ax + t * dx, ay + t * dy);
        (px * px + py * py).sqrt()
    }
}

/// Smallest absolute difference between two bearings, in `[0, 180]`.
pub fn bearing_difference(a: u16, b: u16) -> u16 {
    let diff = (i32::from(a) - i32::from(b)).rem_euclid(360);
    diff.min(360 - diff) as u16
}
