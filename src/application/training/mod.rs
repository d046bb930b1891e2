pub mod controller;

pub use controller::{TrainingConfig, TrainingController};
