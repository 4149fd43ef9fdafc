pub mod dsa;
pub mod experiment;
pub mod optical_network;
pub mod scientific_computing;

pub use experiment::{Experiment, ExperimentResult, LoadSummary, Metrics, SimError};
