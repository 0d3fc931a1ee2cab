//! 题目记录组装 - 流程层
//!
//! 核心职责：定义"一道题"的完整读取流程
//!
//! 流程顺序：
//! 1. 题目信息（领域 / 技能 / 难度）
//! 2. 材料区图片
//! 3. 题干 + 选项
//! 4. 解析（打开弹窗 → 读取 → 关闭）
//! 5. 追加记录并整体落盘

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::{ExamDataset, QuestionRecord};
use crate::services::{ContentReader, ExplanationReader, MetadataReader, VisualCapture};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 题目记录组装器
///
/// - 唯一可以修改记录列表的地方（持有 `ExamDataset`）
/// - 不持有浏览器资源，只借用 driver
/// - 单个字段失败不会中断，只有落盘失败才返回错误
pub struct RecordAssembler<'a, D: PageDriver> {
    driver: &'a D,
    dataset: ExamDataset,
    metadata: MetadataReader,
    visuals: VisualCapture,
    content: ContentReader,
    explanation: ExplanationReader,
    exam_index: usize,
    verbose_logging: bool,
}

impl<'a, D: PageDriver> RecordAssembler<'a, D> {
    pub fn new(driver: &'a D, config: &Config, dataset: ExamDataset, exam_index: usize) -> Self {
        Self {
            driver,
            dataset,
            metadata: MetadataReader::new(&config.selectors),
            visuals: VisualCapture::new(config),
            content: ContentReader::new(&config.selectors),
            explanation: ExplanationReader::new(config),
            exam_index,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 读取当前页面上的题目，追加到数据集并落盘
    pub async fn assemble(&mut self, question_index: usize, stem: &D::Element) -> Result<QuestionRecord> {
        let ctx = QuestionCtx::new(self.exam_index, self.dataset.exam_name(), question_index);
        let driver = self.driver;

        let meta = self.metadata.read(driver, &ctx).await;
        let image_paths = self
            .visuals
            .capture(driver, &ctx, self.dataset.image_directory())
            .await;
        let question_text = self.content.question_text(driver, stem, &ctx).await;
        let options = self.content.options(driver, &ctx).await;
        let solution_rationale = self.explanation.read(driver, &ctx).await;

        let record = QuestionRecord {
            id: QuestionRecord::question_id(question_index),
            question_type: meta.question_type(),
            difficulty: meta.difficulty,
            question_text,
            options,
            solution_rationale,
            image_paths,
        };

        self.dataset
            .push(record.clone())
            .await
            .with_context(|| format!("{} 保存记录失败", ctx))?;

        self.log_record(&ctx, &record);
        Ok(record)
    }

    pub fn dataset(&self) -> &ExamDataset {
        &self.dataset
    }

    fn log_record(&self, ctx: &QuestionCtx, record: &QuestionRecord) {
        info!(
            "{} ✓ 已保存 {} ({} 个选项, {} 张图片)",
            ctx,
            record.id,
            record.options.len(),
            record.image_paths.len()
        );
        if self.verbose_logging {
            info!("{} 📝 题干: {}", ctx, truncate_text(&record.question_text, 80));
        }
    }
}
