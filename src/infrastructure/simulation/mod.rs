//! In-process scenario collaborators used by the training loop

pub mod executor;
pub mod generator;
pub mod latency_model;

pub use executor::SimulatedExecutor;
pub use generator::InProcessScenarioGenerator;
