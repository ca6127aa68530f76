use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One graded assessment item within a grade record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
}

/// One learner's performance in one class.
///
/// The collection validator constrains `class_id` to [0, 300] and `learner_id`
/// to non-negative values, but enforcement is warn-only so out-of-range
/// documents can still exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub class_id: i32,
    pub learner_id: i32,
    pub scores: Vec<ScoreEntry>,
}

impl GradeRecord {
    pub fn new(class_id: i32, learner_id: i32, scores: Vec<ScoreEntry>) -> Self {
        Self {
            id: None,
            class_id,
            learner_id,
            scores,
        }
    }

    /// Fixed record that violates every validator constraint, used by the
    /// validation-test route to confirm that enforcement stays warn-only.
    pub fn invalid_test_record() -> Self {
        Self::new(
            500,
            -1,
            vec![
                ScoreEntry {
                    kind: "exam".to_string(),
                    score: 30.0,
                },
                ScoreEntry {
                    kind: "quiz".to_string(),
                    score: 70.0,
                },
            ],
        )
    }
}
