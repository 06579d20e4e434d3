//! # Conjunction risk
//!
//! From screened encounters to scored events and per-object risk summaries.
//!
//! ## Modules
//!
//! - [`closest_approach`]: closest approach of one pair over a bounded window, with its
//!   threshold-crossing interval.
//! - [`probability`]: closed-form probability, urgency and density-score model.
//! - [`risk_params`]: model constants and the [`RiskLevel`] tiers.
//! - [`conjunction`]: the scored per-pair [`ConjunctionEvent`].
//! - [`assessor`]: [`ConjunctionRiskAssessor`], scoring encounters and building
//!   [`RiskAssessment`]s.
//!
//! ## Edge cases
//!
//! - A closest approach stuck on the window boundary, or with degenerate relative motion, keeps
//!   its distance-based probability but reports no time of closest approach.
//! - An object without any event is LOW with probability 0, whatever its local density.
pub mod assessor;
pub mod closest_approach;
pub mod conjunction;
pub mod probability;
pub mod risk_params;

pub use assessor::{ConjunctionRiskAssessor, RiskAssessment};
pub use closest_approach::{Approach, PairMotion};
pub use conjunction::{ConjunctionEvent, TimeWindow};
pub use risk_params::{RiskLevel, RiskParams, RiskParamsBuilder, RiskThresholds};
