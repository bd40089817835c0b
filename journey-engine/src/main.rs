use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use journey_engine::config::EngineConfig;
use journey_engine::domain::{Coordinate, TraverseMode, TraverseModeSet};
use journey_engine::graph::{Graph, GraphEditor, GraphError, SharedGraph, TripTimes, VertexId, VertexKind};
use journey_engine::routing::{Location, ModeAwareHeuristicFactory, PathFinder, RoutingRequest};
use journey_engine::updater::{HttpFeedConfig, HttpFeedSource, UpdaterManager};

/// Read a numeric environment variable, ignoring malformed values.
fn env_number<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring malformed value");
            None
        }
    }
}

fn place(editor: &mut GraphEditor, label: &str, lat: f64, lon: f64, kind: VertexKind) -> Result<VertexId, GraphError> {
    editor.add_vertex(label, Coordinate { lat, lon }, kind)
}

fn station(editor: &mut GraphEditor, label: &str, lat: f64, lon: f64) -> Result<VertexId, GraphError> {
    let kind = VertexKind::TransitStop {
        stop_id: Arc::from(label),
        zone: Some(Arc::from("1")),
        wheelchair_boarding: true,
    };
    place(editor, label, lat, lon, kind)
}

/// A small demonstration network: two neighbourhoods joined by streets and
/// a tram running every ten minutes through the day.
fn demo_network() -> Result<Graph, GraphError> {
    let mut editor = GraphEditor::new();
    let streets = TraverseModeSet::all_street();

    let home = place(&mut editor, "home", 51.5000, -0.1000, VertexKind::intersection())?;
    let corner = place(&mut editor, "corner", 51.5000, -0.0700, VertexKind::intersection())?;
    let office = place(&mut editor, "office", 51.5000, -0.0400, VertexKind::intersection())?;
    let west = station(&mut editor, "Westgate", 51.5005, -0.0990)?;
    let market = station(&mut editor, "Market", 51.5005, -0.0700)?;
    let east = station(&mut editor, "Eastgate", 51.5005, -0.0410)?;

    editor.add_street_pair(home, corner, "High Street", streets)?;
    editor.add_street_pair(corner, office, "High Street", streets)?;
    editor.add_street_pair(home, west, "Station Approach", streets)?;
    editor.add_street_pair(corner, market, "Market Lane", streets)?;
    editor.add_street_pair(east, office, "Dock Road", streets)?;

    let trips = (0..)
        .map(|i| 6 * 3600 + i * 600)
        .take_while(|start| *start <= 23 * 3600)
        .map(|start| TripTimes::uniform(&format!("T1-{start}"), &[start, start + 240, start + 480]))
        .collect();
    editor.add_pattern("T1", TraverseMode::Tram, vec![west, market, east], trips)?;

    Ok(editor.finish())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = EngineConfig::default();
    if let Some(secs) = env_number::<u64>("ALERT_POLL_SECS") {
        config.alert_poll_secs = secs;
    }
    if let Some(secs) = env_number::<u64>("SEARCH_TIMEOUT_SECS") {
        config.search_timeout_ms = secs * 1000;
    }

    let network = demo_network().expect("demo network is well formed");
    info!(
        vertices = network.vertex_count(),
        edges = network.edge_count(),
        "network loaded"
    );
    let shared = SharedGraph::new(network);
    let mut manager = UpdaterManager::start(shared.clone(), &config);

    match std::env::var("ALERT_FEED_URL") {
        Ok(url) => match HttpFeedSource::new(HttpFeedConfig::new("alerts", url)) {
            Ok(source) => manager.add_polling("alerts", source),
            Err(err) => warn!(%err, "alert feed disabled"),
        },
        Err(_) => warn!("ALERT_FEED_URL not set, running without live alerts"),
    }

    let graph = shared.snapshot();
    let request = RoutingRequest::new(Location::vertex("home"), Location::vertex("office"), Utc::now());
    let plan_config = config.clone();
    let planned = tokio::task::spawn_blocking(move || {
        let factory = ModeAwareHeuristicFactory::from_config(&plan_config);
        let finder = PathFinder::new(graph.clone(), &plan_config).with_heuristic_factory(&factory);
        finder.plan(&request).map(|plan| (graph, plan))
    })
    .await;

    match planned {
        Ok(Ok((graph, plan))) => {
            info!(paths = plan.paths.len(), rounds = plan.rounds, aborted = plan.aborted, "demo plan");
            for path in &plan.paths {
                let trips: Vec<String> = path.trip_ids(&graph).iter().map(|t| t.to_string()).collect();
                info!(
                    minutes = path.duration_secs() / 60,
                    boardings = path.boardings(),
                    walk_m = path.walk_distance().round(),
                    trips = ?trips,
                    "itinerary"
                );
            }
        }
        Ok(Err(err)) => warn!(%err, "demo plan rejected"),
        Err(err) => warn!(%err, "demo plan panicked"),
    }

    info!("running, press ctrl-c to stop");
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "cannot listen for ctrl-c");
    }
    if let Err(err) = manager.shutdown().await {
        warn!(%err, "updater shutdown failed");
    }
    info!(generation = shared.generation(), "stopped");
}
