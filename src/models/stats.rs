/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 列表页上的试卷数（开始时的快照）
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 所有试卷累计保存的题目数
    pub questions: usize,
}

impl RunStats {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}
