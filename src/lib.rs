//! Layout core for collaboration networks.
//!
//! Raw documents or a pre-built analysis payload are normalized into a
//! [`network::GraphModel`], annotated by the metrics pass, laid out by the
//! force [`sim::Simulation`], perturbed through the
//! [`interaction::DragController`], and exported as render snapshots by
//! [`encoding`].

pub mod config;
pub mod encoding;
pub mod interaction;
pub mod network;
pub mod sim;

pub use config::Config;
