pub mod record;
pub mod stats;

pub use record::{load_records, sanitize_exam_name, ExamDataset, QuestionRecord};
pub use stats::RunStats;
