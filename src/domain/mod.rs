// Creative (adversarial) training scenarios
pub mod creative;

// Domain-specific error types
pub mod errors;

// Observer-facing broadcast messages
pub mod messages;

// Port interfaces
pub mod ports;

// Stress tests, grades and power reports
pub mod power;

// Scenarios and execution results
pub mod scenario;

// Training loop lifecycle
pub mod training;
