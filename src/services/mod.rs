pub mod content_reader;
pub mod explanation_reader;
pub mod metadata_reader;
pub mod visual_capture;

pub use content_reader::ContentReader;
pub use explanation_reader::{ExplanationOutcome, ExplanationReader, EXPLANATION_FAILED, EXPLANATION_NOT_FOUND};
pub use metadata_reader::{MetadataReader, QuestionMeta};
pub use visual_capture::VisualCapture;
