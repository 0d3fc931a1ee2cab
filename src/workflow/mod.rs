pub mod question_ctx;
pub mod record_assembler;

pub use question_ctx::QuestionCtx;
pub use record_assembler::RecordAssembler;
