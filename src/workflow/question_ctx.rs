//! 题目处理上下文
//!
//! 封装"我正在处理哪张卷子的第几题"这一信息

use std::fmt::Display;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 试卷在列表中的序号（从1开始，仅用于日志显示）
    pub exam_index: usize,

    /// 清洗后的试卷名
    pub exam_name: String,

    /// 题目在试卷中的序号（从1开始）
    pub question_index: usize,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(exam_index: usize, exam_name: impl Into<String>, question_index: usize) -> Self {
        Self {
            exam_index,
            exam_name: exam_name.into(),
            question_index,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 {} 题目#{}]", self.exam_index, self.question_index)
    }
}
