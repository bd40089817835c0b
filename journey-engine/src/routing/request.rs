//! Routing requests and their validation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, InvalidCoordinate, TraverseMode, TraverseModeSet};
use crate::graph::LinkRequirements;

/// Configuration errors, surfaced before any search starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// A required location is absent
    #[error("request has no {0} location")]
    MissingLocation(&'static str),

    /// A coordinate is malformed
    #[error(transparent)]
    InvalidLocation(#[from] InvalidCoordinate),

    /// A vertex label does not exist in the network
    #[error("no vertex with label {0:?}")]
    UnknownVertex(String),

    /// No vertex close enough to a coordinate
    #[error("no network vertex near ({lat}, {lon})")]
    LocationNotFound { lat: f64, lon: f64 },

    /// The mode set is empty
    #[error("no travel modes selected")]
    EmptyModeSet,

    /// The selected modes can never form a journey
    #[error("unusable mode combination: {0}")]
    UnreachableModes(&'static str),

    /// A numeric parameter is out of range
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

/// A place a journey starts, ends or passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Location {
    /// A vertex addressed by its label.
    Vertex { label: String },
    /// A point, linked to the nearest suitable vertex.
    Coordinate { lat: f64, lon: f64 },
}

impl Location {
    pub fn vertex(label: &str) -> Self {
        Location::Vertex {
            label: label.to_string(),
        }
    }

    pub fn coordinate(lat: f64, lon: f64) -> Self {
        Location::Coordinate { lat, lon }
    }

    fn validate(&self) -> Result<(), RequestError> {
        match self {
            Location::Vertex { label } if label.is_empty() => Err(RequestError::UnknownVertex(label.clone())),
            Location::Vertex { .. } => Ok(()),
            Location::Coordinate { lat, lon } => {
                Coordinate::new(*lat, *lon)?;
                Ok(())
            }
        }
    }
}

fn enabled() -> bool {
    true
}

/// Everything a search needs to know about what the traveller wants.
///
/// Requests are plain values. The engine clones a request before changing
/// anything internally, so a caller's request is never altered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRequest {
    pub from: Option<Location>,
    pub to: Option<Location>,
    pub intermediate_places: Vec<Location>,

    pub date_time: DateTime<Utc>,
    /// Search backwards from an arrival time.
    pub arrive_by: bool,
    pub modes: TraverseModeSet,

    /// Speeds in m/s.
    pub walk_speed: f64,
    pub bike_speed: f64,
    pub car_speed: f64,
    /// Fastest plausible transit speed in m/s, used by heuristics.
    pub max_transit_speed: f64,

    /// Weight multipliers per second of each activity.
    pub walk_reluctance: f64,
    pub bike_reluctance: f64,
    pub car_reluctance: f64,
    pub wait_reluctance: f64,

    /// Weight added on every boarding.
    pub board_cost: f64,
    /// Extra weight on every boarding after the first.
    pub transfer_penalty: f64,
    pub elevator_board_time: i64,
    pub elevator_board_cost: f64,
    /// Multiplier on the turn cost at intersections.
    pub turn_cost_factor: f64,

    /// Meters of walking allowed; infinite by default.
    pub max_walk_distance: f64,
    pub max_transfers: u32,
    /// Longest journey considered, seconds.
    pub max_duration_secs: Option<i64>,
    /// Longest wait before the first boarding, seconds.
    pub clamp_initial_wait_secs: Option<i64>,

    pub wheelchair: bool,
    pub drive_on_right: bool,
    /// Number of successive departures considered when boarding.
    pub board_alternatives: usize,
    pub banned_trips: BTreeSet<String>,

    /// Cleared internally for batch searches.
    #[serde(skip, default = "enabled")]
    pub(crate) resource_limits: bool,
}

impl Default for RoutingRequest {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            intermediate_places: Vec::new(),
            date_time: Utc::now(),
            arrive_by: false,
            modes: TraverseModeSet::walk_and_transit(),
            walk_speed: 1.33,
            bike_speed: 5.0,
            car_speed: 40.0,
            max_transit_speed: 50.0,
            walk_reluctance: 2.0,
            bike_reluctance: 1.0,
            car_reluctance: 1.0,
            wait_reluctance: 1.0,
            board_cost: 600.0,
            transfer_penalty: 0.0,
            elevator_board_time: 90,
            elevator_board_cost: 90.0,
            turn_cost_factor: 1.0,
            max_walk_distance: f64::INFINITY,
            max_transfers: 2,
            max_duration_secs: None,
            clamp_initial_wait_secs: None,
            wheelchair: false,
            drive_on_right: true,
            board_alternatives: 1,
            banned_trips: BTreeSet::new(),
            resource_limits: true,
        }
    }
}

impl RoutingRequest {
    /// A depart-at request between two locations.
    pub fn new(from: Location, to: Location, date_time: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            date_time,
            ..Self::default()
        }
    }

    /// Check every parameter that does not need the network.
    pub fn validate(&self) -> Result<(), RequestError> {
        for location in self
            .from
            .iter()
            .chain(self.to.iter())
            .chain(self.intermediate_places.iter())
        {
            location.validate()?;
        }

        if self.modes.is_empty() {
            return Err(RequestError::EmptyModeSet);
        }
        if !self.modes.has_street() {
            return Err(RequestError::UnreachableModes(
                "transit needs a street mode to reach stops",
            ));
        }
        if self.street_modes().iter().count() > 1 {
            return Err(RequestError::UnreachableModes(
                "a search uses a single street mode",
            ));
        }
        if self.modes.has_transit() && !self.modes.contains(TraverseMode::Walk) {
            return Err(RequestError::UnreachableModes(
                "transit needs walking to and from stops",
            ));
        }

        positive("walk_speed", self.walk_speed)?;
        positive("bike_speed", self.bike_speed)?;
        positive("car_speed", self.car_speed)?;
        positive("max_transit_speed", self.max_transit_speed)?;
        non_negative("walk_reluctance", self.walk_reluctance)?;
        non_negative("bike_reluctance", self.bike_reluctance)?;
        non_negative("car_reluctance", self.car_reluctance)?;
        non_negative("wait_reluctance", self.wait_reluctance)?;
        non_negative("board_cost", self.board_cost)?;
        non_negative("transfer_penalty", self.transfer_penalty)?;
        non_negative("elevator_board_cost", self.elevator_board_cost)?;
        non_negative("turn_cost_factor", self.turn_cost_factor)?;

        if self.max_walk_distance.is_nan() || self.max_walk_distance < 0.0 {
            return Err(RequestError::InvalidParameter {
                name: "max_walk_distance",
                reason: "must be a non-negative number",
            });
        }
        if self.elevator_board_time < 0 {
            return Err(RequestError::InvalidParameter {
                name: "elevator_board_time",
                reason: "must not be negative",
            });
        }
        if self.max_duration_secs.is_some_and(|d| d <= 0) {
            return Err(RequestError::InvalidParameter {
                name: "max_duration_secs",
                reason: "must be positive",
            });
        }
        if self.clamp_initial_wait_secs.is_some_and(|c| c < 0) {
            return Err(RequestError::InvalidParameter {
                name: "clamp_initial_wait_secs",
                reason: "must not be negative",
            });
        }
        if self.board_alternatives == 0 {
            return Err(RequestError::InvalidParameter {
                name: "board_alternatives",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// A copy with max transfers and max walk distance switched off.
    pub fn without_resource_limits(&self) -> Self {
        Self {
            resource_limits: false,
            ..self.clone()
        }
    }

    /// Whether max transfers and max walk distance are enforced.
    pub fn resource_limits_enabled(&self) -> bool {
        self.resource_limits
    }

    /// Travel speed for a street mode, in m/s.
    pub fn speed(&self, mode: TraverseMode) -> f64 {
        match mode {
            TraverseMode::Walk => self.walk_speed,
            TraverseMode::Bicycle => self.bike_speed,
            TraverseMode::Car => self.car_speed,
            _ => self.max_transit_speed,
        }
    }

    /// Weight per second spent travelling in `mode`.
    pub fn reluctance(&self, mode: TraverseMode) -> f64 {
        match mode {
            TraverseMode::Walk => self.walk_reluctance,
            TraverseMode::Bicycle => self.bike_reluctance,
            TraverseMode::Car => self.car_reluctance,
            _ => 1.0,
        }
    }

    /// Street modes the request allows.
    pub fn street_modes(&self) -> TraverseModeSet {
        self.modes.intersection(TraverseModeSet::all_street())
    }

    /// The street mode a search travels in. A valid request allows
    /// exactly one.
    pub fn initial_street_mode(&self) -> TraverseMode {
        let street = self.street_modes();
        if street.contains(TraverseMode::Walk) {
            TraverseMode::Walk
        } else {
            street.iter().next().unwrap_or(TraverseMode::Walk)
        }
    }

    pub fn is_banned(&self, trip_id: &str) -> bool {
        self.banned_trips.contains(trip_id)
    }

    /// Requirements for linking request locations into the network.
    pub fn link_requirements(&self) -> LinkRequirements {
        LinkRequirements {
            modes: self.street_modes(),
            wheelchair: self.wheelchair,
            ..LinkRequirements::default()
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), RequestError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RequestError::InvalidParameter {
            name,
            reason: "must be a positive number",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), RequestError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RequestError::InvalidParameter {
            name,
            reason: "must be a non-negative number",
        })
    }
}
