//! Quota policy: tiers, RAM sizes and the engine that writes workspace attributes.

pub mod attributes;
pub mod engine;
pub mod report;
pub mod tier;
pub mod units;

pub use attributes::AttributeKeys;
pub use engine::QuotaPolicy;
pub use report::{ApplyReport, RevertFailure, RevertReport};
pub use tier::{RunnerLifetime, Tier, TierLimits};
pub use units::{SizeUnit, UNSUPPORTED_PLAN, to_megabytes};
