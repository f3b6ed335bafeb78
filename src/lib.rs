//! Crossroad Simulation Library
//!
//! A four-way signalized intersection simulated on a grid. The engine can
//! be stepped directly or served to a remote renderer over HTTP.

pub mod server;
pub mod simulation;
