// Observer registry and fan-out
pub mod broadcasting;

// Creative (adversarial) scenario generation
pub mod creative;

// Power measurement, stress tests and leaderboard
pub mod power;

// Application wiring and shutdown
pub mod system;

// Continuous training loop
pub mod training;
