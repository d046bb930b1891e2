//! Observer registry and fan-out broadcaster for the live stream.

pub mod broadcaster;
pub mod registry;

pub use broadcaster::{Broadcaster, DeliveryReport};
pub use registry::{ObserverId, ObserverRegistry, Subscription};
