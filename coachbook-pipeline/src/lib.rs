pub mod policy;
pub mod service;

pub use policy::{AbandonedPolicy, PipelinePolicy};
pub use service::{BookingService, StatusChangeResult, StatusSummary};
