pub mod grades;
pub mod health;

pub use grades::{class_stats, debug_sample, overall_stats, test_validation};
pub use health::{health_check, liveness, metrics_endpoint, readiness_check};
