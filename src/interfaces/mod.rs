pub mod api;
pub mod websocket;

pub use api::{AppState, router};
