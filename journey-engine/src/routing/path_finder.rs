//! Planning several itineraries for one request.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::graph::{Graph, LinearSpatialIndex, SpatialIndex};

use super::context::{RoutingContext, SearchMode};
use super::heuristic::{DefaultHeuristicFactory, HeuristicFactory, RemainingWeightHeuristic};
use super::path::GraphPath;
use super::request::{Location, RequestError, RoutingRequest};
use super::search::{Search, SearchResult};
use super::termination::CancellationFlag;

/// Itineraries found for one request.
#[derive(Debug, Default)]
pub struct PlanResult {
    /// Best first: earliest arrival for depart-at requests, latest
    /// departure for arrive-by ones, then lowest weight.
    pub paths: Vec<GraphPath>,
    /// At least one round ran out of time or was cancelled.
    pub aborted: bool,
    /// Searches run.
    pub rounds: usize,
}

/// Runs retry rounds of goal-directed search over one snapshot.
///
/// Each round bans the trips of the path found before, so the next round
/// has to find something different. Requests with intermediate places are
/// planned as a chain of legs instead.
pub struct PathFinder<'a> {
    graph: Arc<Graph>,
    config: &'a EngineConfig,
    factory: &'a dyn HeuristicFactory,
    index: &'a dyn SpatialIndex,
    cancellation: Option<CancellationFlag>,
}

impl<'a> PathFinder<'a> {
    pub fn new(graph: Arc<Graph>, config: &'a EngineConfig) -> Self {
        Self {
            graph,
            config,
            factory: &DefaultHeuristicFactory,
            index: &LinearSpatialIndex,
            cancellation: None,
        }
    }

    pub fn with_heuristic_factory(mut self, factory: &'a dyn HeuristicFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_spatial_index(mut self, index: &'a dyn SpatialIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Plan `request`. Configuration errors are returned before any search.
    pub fn plan(&self, request: &RoutingRequest) -> Result<PlanResult, RequestError> {
        request.validate()?;
        let deadline = Instant::now() + self.config.search_timeout();
        let result = if request.intermediate_places.is_empty() {
            self.plan_rounds(request, deadline)?
        } else {
            self.plan_legs(request, deadline)?
        };
        debug!(
            paths = result.paths.len(),
            rounds = result.rounds,
            aborted = result.aborted,
            generation = self.graph.generation(),
            "plan finished"
        );
        Ok(result)
    }

    fn run_round(
        &self,
        request: &RoutingRequest,
        heuristic: &mut dyn RemainingWeightHeuristic,
        deadline: Instant,
    ) -> Result<SearchResult, RequestError> {
        let ctx = RoutingContext::with_index(self.graph.clone(), request, SearchMode::GoalDirected, self.index)?;
        let mut search = Search::new(&ctx)
            .heuristic(heuristic)
            .deadline(deadline)
            .work_interval(self.config.heuristic_work_interval);
        if let Some(flag) = &self.cancellation {
            search = search.cancellation(flag.clone());
        }
        Ok(search.run())
    }

    fn plan_rounds(&self, request: &RoutingRequest, deadline: Instant) -> Result<PlanResult, RequestError> {
        let mut heuristic = self.factory.heuristic_for(request);
        let mut round_request = request.clone();
        let mut result = PlanResult::default();

        while result.rounds < self.config.num_itineraries {
            if result.rounds > 0 {
                heuristic.reset();
            }
            result.rounds += 1;
            let outcome = self.run_round(&round_request, heuristic.as_mut(), deadline)?;
            result.aborted |= outcome.aborted;
            let Some(path) = outcome.best_path() else {
                break;
            };
            let trips = path.trip_ids(&self.graph);
            debug!(
                round = result.rounds,
                weight = path.weight(),
                trips = trips.len(),
                "itinerary found"
            );
            result.paths.push(path);
            // Without trips to ban, another round finds the same path.
            if trips.is_empty() || outcome.aborted {
                break;
            }
            round_request
                .banned_trips
                .extend(trips.iter().map(|t| t.to_string()));
        }

        sort_paths(&mut result.paths, request.arrive_by);
        Ok(result)
    }

    /// One leg per pair of consecutive places, each starting when the
    /// previous one ends (or, arriving by, ending when the next one starts).
    fn plan_legs(&self, request: &RoutingRequest, deadline: Instant) -> Result<PlanResult, RequestError> {
        let from = request
            .from
            .as_ref()
            .ok_or(RequestError::MissingLocation("origin"))?;
        let to = request
            .to
            .as_ref()
            .ok_or(RequestError::MissingLocation("destination"))?;
        let mut places: Vec<&Location> = vec![from];
        places.extend(request.intermediate_places.iter());
        places.push(to);

        let mut legs: Vec<(&Location, &Location)> = places.windows(2).map(|w| (w[0], w[1])).collect();
        if request.arrive_by {
            legs.reverse();
        }

        let mut result = PlanResult::default();
        let mut time = request.date_time;
        let mut joined: Option<GraphPath> = None;
        for (leg_from, leg_to) in legs {
            let leg_request = RoutingRequest {
                from: Some(leg_from.clone()),
                to: Some(leg_to.clone()),
                intermediate_places: Vec::new(),
                date_time: time,
                ..request.clone()
            };
            let mut heuristic = self.factory.heuristic_for(&leg_request);
            result.rounds += 1;
            let outcome = self.run_round(&leg_request, heuristic.as_mut(), deadline)?;
            result.aborted |= outcome.aborted;
            let Some(path) = outcome.best_path() else {
                debug!(leg = result.rounds, "no path for leg");
                return Ok(result);
            };

            let next = if request.arrive_by {
                path.start_time()
            } else {
                path.end_time()
            };
            time = DateTime::<Utc>::from_timestamp(next, 0).unwrap_or(time);
            joined = Some(match joined {
                None => path,
                Some(so_far) if request.arrive_by => path.join(so_far),
                Some(so_far) => so_far.join(path),
            });
        }

        result.paths.extend(joined);
        Ok(result)
    }
}

fn sort_paths(paths: &mut [GraphPath], arrive_by: bool) {
    paths.sort_by(|a, b| {
        let by_time = if arrive_by {
            b.start_time().cmp(&a.start_time())
        } else {
            a.end_time().cmp(&b.end_time())
        };
        by_time.then_with(|| a.weight().total_cmp(&b.weight()))
    });
}
