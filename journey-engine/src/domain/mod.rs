//! Domain types shared by the network model and the search engine.
//!
//! All types enforce their invariants at construction time where there is
//! one to enforce.

mod alert;
mod geo;
mod mode;

pub use alert::{Alert, AlertEffect};
pub use geo::{Coordinate, EARTH_RADIUS_M, InvalidCoordinate, bearing_difference};
pub use mode::{TraverseMode, TraverseModeSet};
