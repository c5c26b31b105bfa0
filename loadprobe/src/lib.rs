//! Load probe - drives HTTP traffic against the placemark load balancer
//!
//! Simulated users loop over two weighted tasks: "authenticate" walks the
//! login flow and leaves session state in the client's cookie store;
//! "probe-metadata" scrapes the instance marker line from the about page
//! and appends a record to the run's output file. All appends flow through
//! a single writer task so concurrent users never shear records.

pub mod config;
pub mod recorder;
pub mod runner;
pub mod tasks;
pub mod user;

pub use config::Config;
pub use recorder::{Recorder, TrafficRecord, RECORD_DELIMITER};
pub use runner::RunSummary;
pub use tasks::{Credentials, ProbeTasks, TaskKind, TaskTable};
pub use user::{ProbeStats, SimulatedUser};
