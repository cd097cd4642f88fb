//! Particle-tracking event input

pub mod events;
pub mod reason;
pub mod table;

pub use events::{ParticleKey, TrackColumns, TrackEvent};
pub use reason::{EventReason, ReasonCode};
pub use table::EventTable;
