//! Demand-driven production and the subscribers that regulate it.
//!
//! Demand always flows through an explicit [`DemandSink`]: consumers call
//! `request(n)` and producers emit exactly what was asked for.

pub mod demand;
pub mod paced;
pub mod source;
pub mod window;

pub use demand::{DemandHandle, DemandReceiver, DemandSink, demand_channel};
pub use paced::{PacedStats, PacedSubscriber};
pub use source::{Emit, PayloadSource};
pub use window::{DEFAULT_WINDOW, WindowPhase, WindowStats, WindowSubscriber};
