//! Per-search routing context.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Coordinate;
use crate::graph::{Graph, LinearSpatialIndex, SpatialIndex, VertexId};

use super::request::{Location, RequestError, RoutingRequest};
use super::state::State;
use super::turn_cost::{IntersectionCostModel, SimpleIntersectionCostModel};

/// Time window used by batch searches that do not set a maximum duration.
pub const DEFAULT_BATCH_MAX_DURATION_SECS: i64 = 2 * 60 * 60;

/// How a search explores the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Towards one target, ordered by weight plus heuristic.
    GoalDirected,
    /// From one origin to everything, ordered by elapsed time.
    Batch,
}

/// A normalized request bound to one network snapshot.
///
/// Holds its own clone of the request. The search origin and target are
/// oriented for the search direction: an arrive-by search starts at the
/// request's destination and searches towards its origin.
pub struct RoutingContext {
    pub graph: Arc<Graph>,
    pub request: RoutingRequest,
    pub mode: SearchMode,
    pub origin: VertexId,
    pub target: Option<VertexId>,
    /// Epoch seconds.
    pub start_time: i64,
    /// States beyond this clock time are dropped.
    pub worst_time: Option<i64>,
    pub intersection_model: Arc<dyn IntersectionCostModel>,
    target_coordinate: Option<Coordinate>,
}

impl RoutingContext {
    /// Context for a search between the request's two locations.
    pub fn goal_directed(graph: Arc<Graph>, request: &RoutingRequest) -> Result<Self, RequestError> {
        Self::with_index(graph, request, SearchMode::GoalDirected, &LinearSpatialIndex)
    }

    /// Context for an earliest-arrival search from the request's origin
    /// (its destination, for arrive-by) to every reachable vertex.
    ///
    /// Max transfers and max walk distance are disabled on the context's copy
    /// of the request; a time window bounds the search instead.
    pub fn batch(graph: Arc<Graph>, request: &RoutingRequest) -> Result<Self, RequestError> {
        Self::with_index(graph, request, SearchMode::Batch, &LinearSpatialIndex)
    }

    /// Build a context, linking coordinates through `index`.
    pub fn with_index(
        graph: Arc<Graph>,
        request: &RoutingRequest,
        mode: SearchMode,
        index: &dyn SpatialIndex,
    ) -> Result<Self, RequestError> {
        request.validate()?;

        let mut request = match mode {
            SearchMode::GoalDirected => request.clone(),
            SearchMode::Batch => request.without_resource_limits(),
        };

        let (origin_location, target_location, origin_name) = if request.arrive_by {
            (request.to.as_ref(), request.from.as_ref(), "destination")
        } else {
            (request.from.as_ref(), request.to.as_ref(), "origin")
        };
        let origin_location = origin_location.ok_or(RequestError::MissingLocation(origin_name))?;
        let origin = resolve(&graph, origin_location, &request, index)?;

        let target = match mode {
            SearchMode::Batch => None,
            SearchMode::GoalDirected => {
                let name = if request.arrive_by { "origin" } else { "destination" };
                let location = target_location.ok_or(RequestError::MissingLocation(name))?;
                Some(resolve(&graph, location, &request, index)?)
            }
        };
        let target_coordinate = target
            .and_then(|t| graph.vertex(t))
            .map(|v| v.coordinate);

        let start_time = request.date_time.timestamp();
        let max_duration = match mode {
            SearchMode::Batch => Some(
                request
                    .max_duration_secs
                    .unwrap_or(DEFAULT_BATCH_MAX_DURATION_SECS),
            ),
            SearchMode::GoalDirected => request.max_duration_secs,
        };
        let extra_wait = request.clamp_initial_wait_secs.unwrap_or(0);
        let worst_time = max_duration.map(|duration| {
            let window = duration + extra_wait;
            if request.arrive_by {
                start_time - window
            } else {
                start_time + window
            }
        });

        // Batch searches never wait longer than their window for a first
        // boarding.
        if matches!(mode, SearchMode::Batch) && request.clamp_initial_wait_secs.is_none() {
            request.clamp_initial_wait_secs = max_duration;
        }

        debug!(
            ?origin,
            ?target,
            ?mode,
            arrive_by = request.arrive_by,
            generation = graph.generation(),
            "routing context ready"
        );

        let intersection_model: Arc<dyn IntersectionCostModel> =
            Arc::new(SimpleIntersectionCostModel::new(request.drive_on_right));

        Ok(Self {
            graph,
            request,
            mode,
            origin,
            target,
            start_time,
            worst_time,
            intersection_model,
            target_coordinate,
        })
    }

    /// Replace the intersection cost model.
    pub fn with_intersection_model(mut self, model: Arc<dyn IntersectionCostModel>) -> Self {
        self.intersection_model = model;
        self
    }

    pub fn is_arrive_by(&self) -> bool {
        self.request.arrive_by
    }

    pub fn target_coordinate(&self) -> Option<Coordinate> {
        self.target_coordinate
    }

    /// Whether a clock time falls outside the search window.
    ///
    /// A time exactly at the cutoff is inside the window.
    pub fn beyond_worst_time(&self, time: i64) -> bool {
        match self.worst_time {
            None => false,
            Some(worst) if self.request.arrive_by => time < worst,
            Some(worst) => time > worst,
        }
    }

    /// Whether a state breaks the request's transfer or walking limits.
    ///
    /// Always false when resource limits are disabled.
    pub fn exceeds_resource_limits(&self, state: &State) -> bool {
        if !self.request.resource_limits_enabled() {
            return false;
        }
        state.transfers() > self.request.max_transfers
            || state.walk_distance() > self.request.max_walk_distance
    }

    /// Whether a state should be dropped before entering the tree.
    pub fn rejects(&self, state: &State) -> bool {
        self.beyond_worst_time(state.time()) || self.exceeds_resource_limits(state)
    }
}

/// Link a request location to a vertex.
pub fn resolve(
    graph: &Graph,
    location: &Location,
    request: &RoutingRequest,
    index: &dyn SpatialIndex,
) -> Result<VertexId, RequestError> {
    match location {
        Location::Vertex { label } => graph
            .vertex_by_label(label)
            .map(|v| v.id)
            .ok_or_else(|| RequestError::UnknownVertex(label.clone())),
        Location::Coordinate { lat, lon } => {
            let coordinate = Coordinate::new(*lat, *lon)?;
            index
                .nearest_vertex(graph, &coordinate, &request.link_requirements())
                .ok_or(RequestError::LocationNotFound {
                    lat: *lat,
                    lon: *lon,
                })
        }
    }
}
