//! Small networks shared by tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Coordinate, TraverseMode, TraverseModeSet};
use crate::graph::{Graph, GraphEditor, TripTimes, VertexId, VertexKind};

/// Midnight UTC, 2024-03-15.
pub(crate) const DAY: i64 = 1_710_460_800;

/// Degrees per 100 m north.
const LAT_STEP: f64 = 100.0 / 111_194.93;
/// Degrees per 100 m east at latitude 51.5.
const LON_STEP: f64 = 100.0 / 69_220.0;

pub(crate) fn hm(hours: i64, minutes: i64) -> i64 {
    hours * 3600 + minutes * 60
}

/// `secs` after midnight on the test day.
pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(DAY + secs, 0).unwrap()
}

/// A point `x` hundred meters east and `y` hundred meters north of the
/// origin.
pub(crate) fn point(x: f64, y: f64) -> Coordinate {
    Coordinate {
        lat: 51.5 + y * LAT_STEP,
        lon: -0.1 + x * LON_STEP,
    }
}

pub(crate) fn intersection(editor: &mut GraphEditor, label: &str, x: f64, y: f64) -> VertexId {
    editor
        .add_vertex(label, point(x, y), VertexKind::intersection())
        .unwrap()
}

pub(crate) fn stop(editor: &mut GraphEditor, label: &str, x: f64, y: f64) -> VertexId {
    editor
        .add_vertex(
            label,
            point(x, y),
            VertexKind::TransitStop {
                stop_id: Arc::from(label),
                zone: Some(Arc::from(format!("zone-{label}"))),
                wheelchair_boarding: true,
            },
        )
        .unwrap()
}

pub(crate) fn walk_street(editor: &mut GraphEditor, a: VertexId, b: VertexId) {
    editor
        .add_street_pair(a, b, "street", TraverseModeSet::all_street())
        .unwrap();
}

/// Trips leaving the first stop every `headway` seconds from `first` to
/// `last`, taking `hop` seconds between consecutive stops.
pub(crate) fn timetable(prefix: &str, stops: usize, first: i64, last: i64, headway: i64, hop: i64) -> Vec<TripTimes> {
    (0..)
        .map(|i| first + i * headway)
        .take_while(|start| *start <= last)
        .map(|start| {
            let times: Vec<i64> = (0..stops as i64).map(|s| start + s * hop).collect();
            TripTimes::uniform(&format!("{prefix}-{start}"), &times)
        })
        .collect()
}

/// `width` by `height` intersections 100 m apart, labelled `"x,y"`, joined
/// by two-way streets.
pub(crate) fn grid(width: usize, height: usize) -> Graph {
    let mut editor = GraphEditor::new();
    let mut ids = vec![vec![VertexId(0); height]; width];
    for (x, column) in ids.iter_mut().enumerate() {
        for (y, id) in column.iter_mut().enumerate() {
            *id = intersection(&mut editor, &format!("{x},{y}"), x as f64, y as f64);
        }
    }
    for x in 0..width {
        for y in 0..height {
            if x + 1 < width {
                walk_street(&mut editor, ids[x][y], ids[x + 1][y]);
            }
            if y + 1 < height {
                walk_street(&mut editor, ids[x][y], ids[x][y + 1]);
            }
        }
    }
    editor.finish()
}

/// Home and work 3.2 km apart on a street, with a bus from stop A next to
/// home to stop B next to work via stop M.
///
/// ```text
/// home -- A ============ M ============ B -- work
///   \____________________________________/
/// ```
///
/// Buses leave A every 10 minutes from 08:00 to 09:00 and take 5 minutes
/// per hop.
pub(crate) fn bus_line() -> Graph {
    let mut editor = GraphEditor::new();
    let home = intersection(&mut editor, "home", 0.0, 0.0);
    let work = intersection(&mut editor, "work", 32.0, 0.0);
    let a = stop(&mut editor, "A", 1.0, 0.0);
    let m = stop(&mut editor, "M", 16.0, 0.0);
    let b = stop(&mut editor, "B", 31.0, 0.0);
    walk_street(&mut editor, home, a);
    walk_street(&mut editor, b, work);
    walk_street(&mut editor, home, work);
    editor
        .add_pattern(
            "R1",
            TraverseMode::Bus,
            vec![a, m, b],
            timetable("R1", 3, hm(8, 0), hm(9, 0), 600, 300),
        )
        .unwrap();
    editor.finish()
}

/// Stops `S0`..`Sn` where each `Si -> Si+1` is its own route, so reaching
/// `Sn` from `S0` takes `n` boardings.
///
/// Route `i` leaves `Si` every 5 minutes from 08:00 and takes 4 minutes.
pub(crate) fn relay(n: usize) -> Graph {
    let mut editor = GraphEditor::new();
    let stops: Vec<VertexId> = (0..=n)
        .map(|i| stop(&mut editor, &format!("S{i}"), i as f64 * 10.0, 0.0))
        .collect();
    for (i, pair) in stops.windows(2).enumerate() {
        editor
            .add_pattern(
                &format!("L{i}"),
                TraverseMode::Rail,
                pair.to_vec(),
                timetable(&format!("L{i}"), 2, hm(8, 0), hm(10, 0), 300, 240),
            )
            .unwrap();
    }
    editor.finish()
}
