pub mod trainer;

pub use trainer::{CreativeTrainer, FixedModeSelector, ModeInfo, RandomModeSelector};
