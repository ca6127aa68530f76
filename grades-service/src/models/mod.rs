pub mod grade;

pub use grade::{GradeRecord, ScoreEntry};
