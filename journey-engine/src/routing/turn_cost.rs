//! Intersection turn costs.
//!
//! Turning at an intersection costs expected seconds. Drivers pay by turn
//! direction and signalization; everyone else pays by how sharp the turn is.

use crate::domain::TraverseMode;
use crate::graph::{HasGeometry, Vertex};

/// Direction of a turn, from the turn angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Right,
    Left,
    Straight,
}

pub const MIN_RIGHT_TURN_ANGLE: u16 = 45;
pub const MAX_RIGHT_TURN_ANGLE: u16 = 135;
pub const MIN_LEFT_TURN_ANGLE: u16 = 225;
pub const MAX_LEFT_TURN_ANGLE: u16 = 315;

/// Classify a turn angle in `[0, 360)`.
///
/// Right turns are `[45, 135)`, left turns `[225, 315)`.
pub fn turn_direction(turn_angle: u16) -> TurnDirection {
    if (MIN_RIGHT_TURN_ANGLE..MAX_RIGHT_TURN_ANGLE).contains(&turn_angle) {
        TurnDirection::Right
    } else if (MIN_LEFT_TURN_ANGLE..MAX_LEFT_TURN_ANGLE).contains(&turn_angle) {
        TurnDirection::Left
    } else {
        TurnDirection::Straight
    }
}

/// Turn angle from the bearing arriving at the intersection to the bearing
/// leaving it, expressed as one clockwise turn in `[0, 360)`.
///
/// When driving on the left the angle is mirrored, so a "right" turn is
/// always the one that does not cross oncoming traffic.
pub fn turn_angle(into_intersection: u16, out_of_intersection: u16, drive_on_right: bool) -> u16 {
    let mut out = i32::from(out_of_intersection);
    let into = i32::from(into_intersection);
    if out < into {
        out += 360;
    }
    let angle = out - into;
    let angle = if drive_on_right { angle } else { 360 - angle };
    (angle % 360) as u16
}

/// Computes the expected seconds spent crossing an intersection.
pub trait IntersectionCostModel: Send + Sync {
    /// Cost of going from `from` onto `to` across `vertex`.
    ///
    /// Speeds are in m/s for the respective edges.
    fn traversal_cost(
        &self,
        vertex: &Vertex,
        from: &dyn HasGeometry,
        to: &dyn HasGeometry,
        mode: TraverseMode,
        from_speed: f64,
        to_speed: f64,
    ) -> f64;
}

/// Fixed expected delays per turn type.
#[derive(Debug, Clone)]
pub struct SimpleIntersectionCostModel {
    pub drive_on_right: bool,
    pub right_at_signal: f64,
    pub right_no_signal: f64,
    pub left_at_signal: f64,
    pub left_no_signal: f64,
    pub straight_at_signal: f64,
    pub straight_no_signal: f64,
    /// Cars on two fast roads meeting without a signal are assumed to be on
    /// a grade-separated junction.
    pub highway_speed: f64,
    /// Multiplier for the non-driving model.
    pub non_driving_factor: f64,
}

impl SimpleIntersectionCostModel {
    pub fn new(drive_on_right: bool) -> Self {
        Self {
            drive_on_right,
            right_at_signal: 15.0,
            right_no_signal: 8.0,
            left_at_signal: 15.0,
            left_no_signal: 8.0,
            straight_at_signal: 15.0,
            straight_no_signal: 5.0,
            highway_speed: 25.0,
            non_driving_factor: 1.0,
        }
    }

    fn driving_cost(
        &self,
        vertex: &Vertex,
        from: &dyn HasGeometry,
        to: &dyn HasGeometry,
        from_speed: f64,
        to_speed: f64,
    ) -> f64 {
        let angle = turn_angle(from.out_angle(), to.in_angle(), self.drive_on_right);
        let direction = turn_direction(angle);
        let cost = if vertex.has_traffic_light() {
            match direction {
                TurnDirection::Right => self.right_at_signal,
                TurnDirection::Left => self.left_at_signal,
                TurnDirection::Straight => self.straight_at_signal,
            }
        } else {
            if from_speed > self.highway_speed && to_speed > self.highway_speed {
                return 0.0;
            }
            match direction {
                TurnDirection::Right => self.right_no_signal,
                TurnDirection::Left => self.left_no_signal,
                TurnDirection::Straight => self.straight_no_signal,
            }
        };
        cost.max(0.0)
    }

    /// Sharper turns cost more; faster travellers pay less.
    fn non_driving_cost(&self, from: &dyn HasGeometry, to: &dyn HasGeometry, to_speed: f64) -> f64 {
        let delta = (i32::from(to.in_angle()) - i32::from(from.out_angle())).abs();
        let delta = if delta > 180 { 360 - delta } else { delta };
        self.non_driving_factor * (f64::from(delta) / 20.0) / to_speed
    }
}

impl Default for SimpleIntersectionCostModel {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IntersectionCostModel for SimpleIntersectionCostModel {
    fn traversal_cost(
        &self,
        vertex: &Vertex,
        from: &dyn HasGeometry,
        to: &dyn HasGeometry,
        mode: TraverseMode,
        from_speed: f64,
        to_speed: f64,
    ) -> f64 {
        if vertex.inferred_free_flowing() {
            return 0.0;
        }
        if mode.is_driving() {
            self.driving_cost(vertex, from, to, from_speed, to_speed)
        } else {
            self.non_driving_cost(from, to, to_speed)
        }
    }
}
