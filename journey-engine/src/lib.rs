//! Multimodal journey planning over a live street and transit network.
//!
//! A network snapshot ([`graph::Graph`]) is searched by a label-correcting
//! engine ([`routing::Search`]) while updaters ([`updater`]) publish new
//! snapshots with service alerts and topology changes. Searches never see
//! a half-applied change: each one pins the snapshot it started on.

pub mod config;
pub mod domain;
pub mod graph;
pub mod routing;
pub mod updater;

#[cfg(test)]
mod fixtures;
