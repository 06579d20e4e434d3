pub mod analytics;
pub mod catalog;
pub mod constants;
pub mod engine;
mod kepler;
pub mod orbit_type;
pub mod orbitrisk_errors;
pub mod propagation;
mod ref_system;
pub mod risk;
pub mod screening;
pub mod snapshot;
pub mod space_weather;
pub mod time;

pub use engine::{AssessmentEngine, EngineConfig};
pub use orbitrisk_errors::OrbitRiskError;
