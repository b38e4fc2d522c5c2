//! Risk gating: stateless predicates plus the shared cooldown tracker.

pub mod cooldown;
pub mod gate;

pub use cooldown::{CooldownScope, CooldownTracker};
pub use gate::RiskGate;
