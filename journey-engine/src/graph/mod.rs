//! The street/transit network.
//!
//! A [`Graph`] is an immutable snapshot: arenas of vertices, edges and trip
//! patterns addressed by stable ids. Changes go through a [`GraphEditor`]
//! and are published by swapping the snapshot held in a [`SharedGraph`].

mod edge;
mod editor;
mod error;
mod network;
mod pattern;
mod shared;
mod spatial;
mod vertex;

pub use edge::{
    AlightEdge, BoardEdge, DwellEdge, Edge, EdgeId, EdgeKind, ElevationProfile, ElevatorEdge,
    HasElevationProfile, HasGeometry, HopEdge, StreetEdge, TransferEdge,
};
pub use editor::GraphEditor;
pub use error::GraphError;
pub use network::Graph;
pub use pattern::{PatternId, TripPattern, TripTimes};
pub use shared::SharedGraph;
pub use spatial::{
    CandidateEdge, CandidateEdgeBundle, LinearSpatialIndex, LinkRequirements, SpatialIndex,
};
pub use vertex::{Vertex, VertexId, VertexKind};
