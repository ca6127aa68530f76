use serde::{Deserialize, Serialize};

/// Aggregate over one class (or the whole collection): how many learners
/// average strictly above 50, out of how many, and the implied percentage.
///
/// Derived fresh on every request by the aggregation pipeline; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    #[serde(rename = "avgAbove50")]
    pub avg_above_50: i64,
    #[serde(rename = "totalLearners")]
    pub total_learners: i64,
    #[serde(rename = "percentageAbove50")]
    pub percentage_above_50: f64,
}
