//! Scenario tests for the search engine.

use std::sync::Arc;
use std::time::Instant;

use proptest::prelude::*;

use super::*;
use crate::config::EngineConfig;
use crate::domain::{Alert, AlertEffect, TraverseMode, TraverseModeSet};
use crate::fixtures::{self, at, hm};
use crate::graph::{EdgeKind, Graph, GraphEditor, SharedGraph, StreetEdge, VertexId, VertexKind};
use crate::updater::{
    AlertPatch, AlertPatchTask, AlertTarget, GraphWriter, GraphWriterTask, RemoveAlertsTask,
    UpdaterError,
};

fn vertex(graph: &Graph, label: &str) -> VertexId {
    graph.vertex_by_label(label).unwrap().id
}

fn trip_names(graph: &Graph, path: &GraphPath) -> Vec<String> {
    path.trip_ids(graph).iter().map(|t| t.to_string()).collect()
}

fn labels(graph: &Graph, path: &GraphPath) -> Vec<String> {
    path.vertices()
        .iter()
        .map(|v| graph.vertex(*v).unwrap().label.to_string())
        .collect()
}

/// Walking only, without turn costs, so street weights add up exactly.
fn walk_request(from: &str, to: &str) -> RoutingRequest {
    RoutingRequest {
        modes: TraverseModeSet::of(&[TraverseMode::Walk]),
        turn_cost_factor: 0.0,
        ..RoutingRequest::new(Location::vertex(from), Location::vertex(to), at(hm(8, 0)))
    }
}

fn commute(secs: i64) -> RoutingRequest {
    RoutingRequest::new(Location::vertex("home"), Location::vertex("work"), at(secs))
}

fn dijkstra(graph: Arc<Graph>, request: &RoutingRequest) -> SearchResult {
    let ctx = RoutingContext::goal_directed(graph, request).unwrap();
    let mut heuristic = TrivialHeuristic;
    Search::new(&ctx).heuristic(&mut heuristic).run()
}

// ========== street search ==========

#[test]
fn walks_across_grid() {
    let graph = Arc::new(fixtures::grid(4, 4));
    let result = search(graph.clone(), &walk_request("0,0", "3,3")).unwrap();

    assert!(!result.aborted);
    let path = result.best_path().unwrap();
    let names = labels(&graph, &path);
    assert_eq!(names.first().map(String::as_str), Some("0,0"));
    assert_eq!(names.last().map(String::as_str), Some("3,3"));
    assert_eq!(path.edges.len(), 6);
    assert!((445..=455).contains(&path.duration_secs()));
    assert!((path.walk_distance() - 600.0).abs() < 1.0);
    assert_eq!(path.boardings(), 0);
}

#[test]
fn coordinates_link_to_nearest_vertex() {
    let graph = Arc::new(fixtures::bus_line());
    let near_home = fixtures::point(0.1, 0.0);
    let request = RoutingRequest {
        from: Some(Location::coordinate(near_home.lat, near_home.lon)),
        ..commute(hm(7, 55))
    };
    let path = search(graph.clone(), &request).unwrap().best_path().unwrap();
    assert_eq!(labels(&graph, &path)[0], "home");
}

#[test]
fn configuration_errors_surface_before_search() {
    let graph = Arc::new(fixtures::bus_line());

    let request = RoutingRequest::new(Location::vertex("home"), Location::vertex("office"), at(0));
    assert_eq!(
        search(graph.clone(), &request).unwrap_err(),
        RequestError::UnknownVertex("office".into())
    );

    let request = RoutingRequest {
        to: None,
        ..commute(0)
    };
    assert_eq!(
        search(graph.clone(), &request).unwrap_err(),
        RequestError::MissingLocation("destination")
    );

    // Batch searches need no destination.
    assert!(earliest_arrival(graph, &request).is_ok());
}

// ========== heuristics ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn euclidean_search_is_optimal(x0 in 0usize..5, y0 in 0usize..5, x1 in 0usize..5, y1 in 0usize..5) {
        let graph = Arc::new(fixtures::grid(5, 5));
        let request = walk_request(&format!("{x0},{y0}"), &format!("{x1},{y1}"));

        let exact = dijkstra(graph.clone(), &request).best_path().unwrap();
        let guided = search(graph.clone(), &request).unwrap().best_path().unwrap();
        prop_assert!((exact.weight() - guided.weight()).abs() < 1e-6);

        let ctx = RoutingContext::goal_directed(graph, &request).unwrap();
        let mut heuristic = EuclideanHeuristic::new();
        heuristic
            .initialize(&State::initial(&ctx), ctx.target.unwrap(), &ctx, None)
            .unwrap();
        for state in &exact.states {
            let remaining = exact.weight() - state.weight();
            prop_assert!(heuristic.estimate(state, &ctx) <= remaining + 1e-6);
        }
    }
}

#[test]
fn euclidean_bound_holds_with_transit() {
    let graph = Arc::new(fixtures::bus_line());
    let request = commute(hm(7, 55));
    let best = dijkstra(graph.clone(), &request).best_path().unwrap();

    let ctx = RoutingContext::goal_directed(graph.clone(), &request).unwrap();
    let mut heuristic = EuclideanHeuristic::new();
    heuristic
        .initialize(&State::initial(&ctx), ctx.target.unwrap(), &ctx, None)
        .unwrap();
    for state in &best.states {
        assert!(heuristic.estimate(state, &ctx) <= best.weight() - state.weight() + 1e-6);
    }

    let guided = search(graph, &request).unwrap().best_path().unwrap();
    assert!((guided.weight() - best.weight()).abs() < 1e-6);
}

#[test]
fn reverse_heuristic_is_admissible() {
    let graph = Arc::new(fixtures::bus_line());
    let request = commute(hm(7, 55));
    let best = dijkstra(graph.clone(), &request).best_path().unwrap();

    let ctx = RoutingContext::goal_directed(graph, &request).unwrap();
    let origin = State::initial(&ctx);
    let mut heuristic = ReverseSearchHeuristic::new(4);
    heuristic
        .initialize(&origin, ctx.target.unwrap(), &ctx, None)
        .unwrap();

    // Walk, board, two hops, walk: a real bound, not zero.
    let estimate = heuristic.estimate(&origin, &ctx);
    assert!(estimate > 1000.0);
    for state in &best.states {
        assert!(heuristic.estimate(state, &ctx) <= best.weight() - state.weight() + 1e-6);
    }

    let result = Search::new(&ctx).heuristic(&mut heuristic).work_interval(1).run();
    let guided = result.best_path().unwrap();
    assert!((guided.weight() - best.weight()).abs() < 1e-6);
}

#[test]
fn reverse_heuristic_respects_setup_deadline() {
    let graph = Arc::new(fixtures::grid(6, 6));
    let ctx = RoutingContext::goal_directed(graph, &walk_request("0,0", "5,5")).unwrap();
    let mut heuristic = ReverseSearchHeuristic::new(1);

    let err = heuristic
        .initialize(&State::initial(&ctx), ctx.target.unwrap(), &ctx, Some(Instant::now()))
        .unwrap_err();
    assert_eq!(err, HeuristicError::DeadlineExceeded);
}

/// Refuses to set up.
struct BrokenHeuristic;

impl RemainingWeightHeuristic for BrokenHeuristic {
    fn initialize(
        &mut self,
        _origin: &State,
        target: VertexId,
        _ctx: &RoutingContext,
        _abort_deadline: Option<Instant>,
    ) -> Result<(), HeuristicError> {
        Err(HeuristicError::UnknownTarget(target))
    }

    fn estimate_forward(&self, _state: &State, _ctx: &RoutingContext) -> f64 {
        f64::INFINITY
    }

    fn estimate_reverse(&self, _state: &State, _ctx: &RoutingContext) -> f64 {
        f64::INFINITY
    }
}

#[test]
fn failed_heuristic_setup_falls_back_to_dijkstra() {
    let graph = Arc::new(fixtures::grid(4, 4));
    let request = walk_request("0,0", "3,2");
    let exact = dijkstra(graph.clone(), &request).best_path().unwrap();

    let ctx = RoutingContext::goal_directed(graph, &request).unwrap();
    let mut heuristic = BrokenHeuristic;
    let result = Search::new(&ctx).heuristic(&mut heuristic).run();

    assert!(!result.aborted);
    assert!((result.best_path().unwrap().weight() - exact.weight()).abs() < 1e-6);
}

// ========== transit ==========

#[test]
fn takes_the_bus_when_it_is_cheaper() {
    let graph = Arc::new(fixtures::bus_line());
    let path = search(graph.clone(), &commute(hm(7, 55)))
        .unwrap()
        .best_path()
        .unwrap();

    assert_eq!(
        labels(&graph, &path)
            .into_iter()
            .filter(|l| !l.starts_with('p'))
            .collect::<Vec<_>>(),
        vec!["home", "A", "B", "work"]
    );
    assert_eq!(path.boardings(), 1);
    assert_eq!(trip_names(&graph, &path), vec![format!("R1-{}", hm(8, 0))]);
    assert_eq!(path.routes(&graph).len(), 1);
    assert_eq!(&*path.routes(&graph)[0], "R1");
    // Bus reaches B at 08:10, then a 100 m walk.
    assert!(path.end_time() > at(hm(8, 10)).timestamp());
    assert!(path.end_time() < at(hm(8, 12)).timestamp());
    assert!((path.walk_distance() - 200.0).abs() < 1.0);
}

#[test]
fn arrive_by_reads_origin_to_destination() {
    let graph = Arc::new(fixtures::bus_line());
    let request = RoutingRequest {
        arrive_by: true,
        ..commute(hm(8, 30))
    };
    let result = search(graph.clone(), &request).unwrap();
    assert_eq!(result.origin, vertex(&graph, "work"));
    let path = result.best_path().unwrap();

    let names = labels(&graph, &path);
    assert_eq!(names.first().map(String::as_str), Some("home"));
    assert_eq!(names.last().map(String::as_str), Some("work"));
    assert_eq!(path.end_time(), at(hm(8, 30)).timestamp());
    // The 08:10 bus reaches B at 08:20; the 08:20 one would be too late.
    assert_eq!(trip_names(&graph, &path), vec![format!("R1-{}", hm(8, 10))]);
    assert!(path.start_time() < at(hm(8, 10)).timestamp());
    assert!(path.start_time() > at(hm(8, 8)).timestamp());
    assert_eq!(path.boardings(), 1);
    assert_eq!(path.edges.len(), path.states.len() - 1);
}

#[test]
fn transfer_limit_applies_to_goal_directed_search_only() {
    let graph = Arc::new(fixtures::relay(5));
    let request = RoutingRequest {
        max_transfers: 3,
        ..RoutingRequest::new(Location::vertex("S0"), Location::vertex("S5"), at(hm(7, 55)))
    };

    // Five boardings are four transfers.
    let result = search(graph.clone(), &request).unwrap();
    assert!(!result.aborted);
    assert!(result.best_path().is_none());

    let relaxed = RoutingRequest {
        max_transfers: 4,
        ..request.clone()
    };
    let path = search(graph.clone(), &relaxed).unwrap().best_path().unwrap();
    assert_eq!(path.boardings(), 5);
    assert_eq!(path.end_time(), at(hm(8, 24)).timestamp());

    let batch = earliest_arrival(graph.clone(), &request).unwrap();
    let s5 = vertex(&graph, "S5");
    let reached = batch.spt.best_state(s5).unwrap();
    assert_eq!(reached.boardings(), 5);
    assert_eq!(reached.time(), at(hm(8, 24)).timestamp());
    assert!(request.resource_limits_enabled());
    assert_eq!(request.max_transfers, 3);
}

fn long_street(length: f64) -> Arc<Graph> {
    let mut editor = GraphEditor::new();
    let a = fixtures::intersection(&mut editor, "start", 0.0, 0.0);
    let b = fixtures::intersection(&mut editor, "end", 0.1, 0.0);
    editor
        .add_edge(a, b, EdgeKind::Street(StreetEdge::new("long", length, 90)))
        .unwrap();
    editor
        .add_edge(b, a, EdgeKind::Street(StreetEdge::new("long", length, 270)))
        .unwrap();
    Arc::new(editor.finish())
}

#[test]
fn worst_time_boundary_is_inclusive() {
    let request = RoutingRequest {
        walk_speed: 1.0,
        max_duration_secs: Some(3600),
        ..walk_request("start", "end")
    };

    let path = search(long_street(3600.0), &request)
        .unwrap()
        .best_path()
        .unwrap();
    assert_eq!(path.duration_secs(), 3600);

    let result = search(long_street(3601.0), &request).unwrap();
    assert!(!result.aborted);
    assert!(result.best_path().is_none());

    let arrive_by = RoutingRequest {
        arrive_by: true,
        ..request
    };
    assert!(search(long_street(3600.0), &arrive_by).unwrap().best_path().is_some());
    assert!(search(long_street(3601.0), &arrive_by).unwrap().best_path().is_none());
}

// ========== shortest-path tree ==========

#[test]
fn states_on_different_trips_coexist() {
    let graph = Arc::new(fixtures::bus_line());
    let request = RoutingRequest {
        board_alternatives: 2,
        ..commute(hm(7, 55))
    };
    let result = search(graph.clone(), &request).unwrap();

    // The 08:00 trip beats the 08:10 one everywhere, but they stay apart.
    let depart = result.spt.states_at(vertex(&graph, "p0:depart:0"));
    assert_eq!(depart.len(), 2);
    assert_ne!(depart[0].trip(), depart[1].trip());
}

#[test]
fn tree_holds_no_dominated_states() {
    let graph = Arc::new(fixtures::bus_line());
    let request = RoutingRequest {
        board_alternatives: 3,
        ..commute(hm(7, 50))
    };
    let ctx = RoutingContext::goal_directed(graph, &request).unwrap();
    let result = Search::new(&ctx).termination(&NeverTerminate).run();

    for v in result.spt.reached_vertices() {
        let states = result.spt.states_at(v);
        for (i, a) in states.iter().enumerate() {
            for (j, b) in states.iter().enumerate() {
                assert!(i == j || !DominanceFunction::Pareto.dominates(a, b), "{a:?} dominates {b:?}");
            }
        }
    }
    assert!(result.spt.state_count() > result.spt.vertex_count());
}

#[test]
fn single_state_dominance_keeps_one_per_vertex() {
    let graph = Arc::new(fixtures::bus_line());
    let ctx = RoutingContext::goal_directed(graph.clone(), &commute(hm(7, 50))).unwrap();
    let result = Search::new(&ctx)
        .dominance(DominanceFunction::MinimumWeight)
        .termination(&NeverTerminate)
        .run();
    assert_eq!(result.spt.dominance(), DominanceFunction::MinimumWeight);
    assert_eq!(result.spt.state_count(), result.spt.vertex_count());

    let batch = earliest_arrival(graph.clone(), &commute(hm(7, 50))).unwrap();
    assert_eq!(batch.spt.dominance(), DominanceFunction::EarliestArrival);
    assert_eq!(batch.spt.state_count(), batch.spt.vertex_count());
    // Earliest arrival at work is by bus, even though walking weighs less
    // per state on the way out.
    let work = batch.spt.best_state(vertex(&graph, "work")).unwrap();
    assert_eq!(work.boardings(), 1);
}

#[test]
fn batch_search_reaches_whole_grid() {
    let graph = Arc::new(fixtures::grid(4, 4));
    let result = earliest_arrival(graph.clone(), &walk_request("0,0", "3,3")).unwrap();

    assert!(result.target.is_none());
    assert_eq!(result.spt.reached_vertices().len(), 16);
    let corner = result.spt.get_paths(vertex(&graph, "3,3"));
    assert_eq!(corner.len(), 1);
    assert_eq!(corner[0].edges.len(), 6);
}

#[test]
fn search_is_deterministic() {
    let graph = Arc::new(fixtures::grid(5, 5));
    let request = RoutingRequest {
        turn_cost_factor: 1.0,
        ..walk_request("0,0", "4,3")
    };
    let first = search(graph.clone(), &request).unwrap();
    let second = search(graph, &request).unwrap();

    let a = first.best_path().unwrap();
    let b = second.best_path().unwrap();
    assert_eq!(a.edges, b.edges);
    assert_eq!(a.weight(), b.weight());
    assert_eq!(first.visited, second.visited);
    assert_eq!(first.spt.reached_vertices(), second.spt.reached_vertices());
}

// ========== stopping early ==========

#[test]
fn deadline_aborts_with_partial_tree() {
    let graph = Arc::new(fixtures::grid(6, 6));
    let ctx = RoutingContext::goal_directed(graph, &walk_request("0,0", "5,5")).unwrap();
    let mut heuristic = EuclideanHeuristic::new();
    let result = Search::new(&ctx)
        .heuristic(&mut heuristic)
        .deadline(Instant::now())
        .run();

    assert!(result.aborted);
    assert_eq!(result.visited, 0);
    assert_eq!(result.spt.state_count(), 1);
    assert!(result.best_path().is_none());
}

#[test]
fn cancellation_aborts() {
    let graph = Arc::new(fixtures::grid(6, 6));
    let ctx = RoutingContext::goal_directed(graph, &walk_request("0,0", "5,5")).unwrap();
    let flag = CancellationFlag::new();
    flag.cancel();

    let result = Search::new(&ctx).cancellation(flag.clone()).run();
    assert!(flag.is_cancelled());
    assert!(result.aborted);
    assert!(result.best_path().is_none());
}

#[test]
fn visitor_sees_every_step() {
    let graph = Arc::new(fixtures::grid(4, 4));
    let ctx = RoutingContext::goal_directed(graph, &walk_request("0,0", "3,3")).unwrap();
    let mut counts = CountingVisitor::default();
    let result = Search::new(&ctx).visitor(&mut counts).run();

    assert_eq!(counts.vertices, result.visited);
    assert!(counts.edges >= counts.enqueued);
    // Everything expanded except the initial state was enqueued first.
    assert!(counts.enqueued + 1 >= counts.vertices);
    assert!(counts.enqueued > 0);
}

// ========== path finder ==========

#[test]
fn retry_rounds_ban_used_trips() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig::default();
    let plan = PathFinder::new(graph.clone(), &config)
        .plan(&commute(hm(7, 55)))
        .unwrap();

    assert_eq!(plan.rounds, 3);
    assert!(!plan.aborted);
    let trips: Vec<Vec<String>> = plan.paths.iter().map(|p| trip_names(&graph, p)).collect();
    assert_eq!(
        trips,
        vec![
            vec![format!("R1-{}", hm(8, 0))],
            vec![format!("R1-{}", hm(8, 10))],
            vec![format!("R1-{}", hm(8, 20))],
        ]
    );
    assert!(plan.paths.windows(2).all(|w| w[0].end_time() <= w[1].end_time()));
}

#[test]
fn retry_rounds_stop_at_a_trip_free_path() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig {
        num_itineraries: 20,
        ..EngineConfig::default()
    };
    let plan = PathFinder::new(graph.clone(), &config)
        .plan(&commute(hm(7, 55)))
        .unwrap();

    // Buses until 08:50 beat walking the whole way; after that walking wins
    // and there is nothing left to ban.
    assert_eq!(plan.rounds, 7);
    assert_eq!(plan.paths.len(), 7);
    assert_eq!(plan.paths.iter().filter(|p| p.boardings() == 0).count(), 1);
    assert!(plan.paths.windows(2).all(|w| w[0].end_time() <= w[1].end_time()));
}

#[test]
fn reverse_heuristic_factory_finds_the_same_plan() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig::default();
    let factory = ModeAwareHeuristicFactory::default();

    let euclidean = PathFinder::new(graph.clone(), &config)
        .plan(&commute(hm(7, 55)))
        .unwrap();
    let reverse = PathFinder::new(graph, &config)
        .with_heuristic_factory(&factory)
        .plan(&commute(hm(7, 55)))
        .unwrap();

    assert_eq!(euclidean.paths.len(), reverse.paths.len());
    for (a, b) in euclidean.paths.iter().zip(&reverse.paths) {
        assert!((a.weight() - b.weight()).abs() < 1e-6);
    }
}

#[test]
fn arrive_by_plans_sort_latest_departure_first() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig::default();
    let request = RoutingRequest {
        arrive_by: true,
        ..commute(hm(8, 45))
    };
    let plan = PathFinder::new(graph, &config).plan(&request).unwrap();

    assert_eq!(plan.paths.len(), 3);
    assert!(plan.paths.windows(2).all(|w| w[0].start_time() >= w[1].start_time()));
    assert!(plan.paths.iter().all(|p| p.end_time() <= at(hm(8, 45)).timestamp()));
}

#[test]
fn intermediate_places_chain_legs() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig::default();
    let request = RoutingRequest {
        intermediate_places: vec![Location::vertex("M")],
        ..commute(hm(7, 55))
    };
    let plan = PathFinder::new(graph.clone(), &config).plan(&request).unwrap();

    assert_eq!(plan.rounds, 2);
    assert_eq!(plan.paths.len(), 1);
    let path = &plan.paths[0];
    let names = labels(&graph, path);
    assert_eq!(names.first().map(String::as_str), Some("home"));
    assert_eq!(names.last().map(String::as_str), Some("work"));
    assert_eq!(names.iter().filter(|l| *l == "M").count(), 1);
    // Off at M, back on the same bus.
    assert_eq!(path.boardings(), 2);
    assert!(path.end_time() < at(hm(8, 12)).timestamp());
    assert_eq!(path.edges.len(), path.states.len() - 1);
}

#[test]
fn cancelled_plan_reports_abort() {
    let graph = Arc::new(fixtures::bus_line());
    let config = EngineConfig::default();
    let flag = CancellationFlag::new();
    flag.cancel();
    let plan = PathFinder::new(graph, &config)
        .with_cancellation(flag)
        .plan(&commute(hm(7, 55)))
        .unwrap();

    assert!(plan.aborted);
    assert!(plan.paths.is_empty());
    assert_eq!(plan.rounds, 1);
}

// ========== concurrent updates ==========

fn closure(n: u64) -> AlertPatch {
    AlertPatch {
        alert: Alert {
            feed_id: "stress".into(),
            id: format!("c{n}"),
            header: "Stop closed".into(),
            effect: AlertEffect::NoService,
            active_from: None,
            active_until: None,
        },
        targets: vec![AlertTarget::Stop {
            stop_id: "A".into(),
        }],
    }
}

struct AddShortcut(u64);

impl GraphWriterTask for AddShortcut {
    fn name(&self) -> &str {
        "add-shortcut"
    }

    fn run(&self, editor: &mut GraphEditor) -> Result<(), UpdaterError> {
        let home = editor
            .graph()
            .vertex_by_label("home")
            .map(|v| v.id)
            .ok_or_else(|| UpdaterError::Task("no home".into()))?;
        let shortcut = editor.add_vertex(
            &format!("shortcut-{}", self.0),
            fixtures::point(0.0, 1.0 + self.0 as f64),
            VertexKind::intersection(),
        )?;
        editor.add_street_pair(home, shortcut, "shortcut", TraverseModeSet::all_street())?;
        Ok(())
    }
}

struct RemoveVertex(String);

impl GraphWriterTask for RemoveVertex {
    fn name(&self) -> &str {
        "remove-vertex"
    }

    fn run(&self, editor: &mut GraphEditor) -> Result<(), UpdaterError> {
        let id = editor
            .graph()
            .vertex_by_label(&self.0)
            .map(|v| v.id)
            .ok_or_else(|| UpdaterError::Task(format!("no vertex {}", self.0)))?;
        editor.remove_vertex(id)?;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn searches_stay_consistent_while_the_network_changes() {
    const SEARCHERS: i64 = 8;
    const ROUNDS: i64 = 25;
    const EDITS: u64 = 20;

    let shared = SharedGraph::new(fixtures::bus_line());
    let (writer, handle) = GraphWriter::spawn(shared.clone(), 4);

    let searchers: Vec<_> = (0..SEARCHERS)
        .map(|i| {
            let shared = shared.clone();
            tokio::task::spawn_blocking(move || {
                let mut generations = Vec::new();
                for round in 0..ROUNDS {
                    let graph = shared.snapshot();
                    let request = commute(hm(7, 40) + (i * ROUNDS + round) * 7);
                    let result = search(graph.clone(), &request).unwrap();
                    let path = result.best_path().unwrap();
                    assert!(path.weight().is_finite());
                    assert!(path.edges.iter().all(|e| graph.edge(*e).is_some()));
                    assert!(path.vertices().iter().all(|v| graph.vertex(*v).is_some()));
                    generations.push(graph.generation());
                }
                generations
            })
        })
        .collect();

    for n in 0..EDITS {
        let generation = match n % 4 {
            0 => writer.execute(AlertPatchTask::new(vec![closure(n)])).await,
            1 => writer.execute(AddShortcut(n)).await,
            2 => {
                writer
                    .execute(RemoveAlertsTask {
                        feed_id: "stress".into(),
                        alert_ids: vec![format!("c{}", n - 2)],
                    })
                    .await
            }
            _ => writer.execute(RemoveVertex(format!("shortcut-{}", n - 2))).await,
        }
        .unwrap();
        assert_eq!(generation, n + 2);
    }

    for searcher in searchers {
        let generations = searcher.await.unwrap();
        assert!(generations.windows(2).all(|w| w[0] <= w[1]));
    }

    writer.shutdown().await.unwrap();
    handle.await.unwrap();
    let graph = shared.snapshot();
    assert_eq!(graph.generation(), EDITS + 1);
    assert!(graph.edges().all(|e| e.alerts.is_empty()));
    assert!(graph.vertices().all(|v| !v.label.starts_with("shortcut")));
}
