//! 试卷列表处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **打开列表**：导航到列表页，开始时记录一次试卷数量
//! 2. **逐卷处理**：每次重新定位行元素（返回列表后旧元素已失效）
//! 3. **错误隔离**：单张试卷出错只影响本卷，强制回到列表后继续下一张
//! 4. **运行日志**：每张试卷结束写一行到日志文件

use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::HarvestError;
use crate::infrastructure::{wait_present, wait_visible, Locator, PageDriver, WaitPolicy};
use crate::models::{ExamDataset, RunStats};
use crate::orchestrator::exam_processor::{ExamOutcome, ExamProcessor};
use crate::utils::logging::{append_run_log, log_listing_loaded};
use crate::workflow::RecordAssembler;

/// 试卷列表处理器
pub struct ListingProcessor<'a, D: PageDriver> {
    driver: &'a D,
    config: &'a Config,
    rows: Locator,
    stem: Locator,
    element_wait: WaitPolicy,
}

impl<'a, D: PageDriver> ListingProcessor<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self {
            driver,
            config,
            rows: Locator::parse(&config.selectors.listing_rows),
            stem: Locator::parse(&config.selectors.question_stem),
            element_wait: WaitPolicy::element(config),
        }
    }

    /// 处理列表上的全部试卷
    pub async fn run(&self) -> Result<RunStats> {
        info!("\n📋 正在打开试卷列表...");
        if !navigate_to_listing(self.driver, self.config).await {
            bail!("试卷列表未能加载: {}", self.config.listing_url);
        }

        let total = self
            .driver
            .find_all(&self.rows)
            .await
            .context("读取试卷列表失败")?
            .len();
        log_listing_loaded(total);

        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for row_index in 0..total {
            let exam_index = row_index + 1;

            let line = match self.process_exam(row_index).await {
                Ok(Some(outcome)) => {
                    stats.succeeded += 1;
                    stats.questions += outcome.questions;
                    format!("[试卷 {}] ✓ {} 道题 ({})", exam_index, outcome.questions, outcome.exit)
                }
                Ok(None) => {
                    warn!("[试卷 {}] ⚠️ 列表行数少于开始时的 {} 行，提前结束", exam_index, total);
                    break;
                }
                Err(e) => {
                    error!("[试卷 {}] ❌ 处理过程中发生错误: {:#}", exam_index, e);
                    stats.failed += 1;
                    if !navigate_to_listing(self.driver, self.config).await {
                        warn!("[试卷 {}] ⚠️ 重新打开列表失败，继续尝试下一张", exam_index);
                    }
                    format!("[试卷 {}] ✗ 失败: {:#}", exam_index, e)
                }
            };

            if let Err(e) = append_run_log(&self.config.output_log_file, &line) {
                warn!("写入运行日志失败: {}", e);
            }
        }

        Ok(stats)
    }

    /// 打开第 `row_index` 行的试卷并逐题处理
    ///
    /// 行已不存在时返回 `Ok(None)`。
    async fn process_exam(&self, row_index: usize) -> Result<Option<ExamOutcome>> {
        let exam_index = row_index + 1;

        let rows = self.driver.find_all(&self.rows).await?;
        let Some(row) = rows.into_iter().nth(row_index) else {
            return Ok(None);
        };

        let row_text = self.driver.text(&row).await.unwrap_or_default();
        let label = exam_label(exam_index, &row_text);
        log_exam_start(exam_index, &label);

        if let Err(e) = self.driver.scroll_into_view(&row).await {
            debug!("[试卷 {}] 滚动到列表行失败: {}", exam_index, e);
        }
        sleep(self.config.settle_pause()).await;

        self.driver
            .activate(&row)
            .await
            .with_context(|| format!("打开试卷失败: {}", label))?;

        wait_present(self.driver, &self.stem, self.element_wait)
            .await
            .ok_or_else(|| HarvestError::timeout(format!("{} 的第一道题", label), self.element_wait.timeout))?;

        let dataset = ExamDataset::create(Path::new(&self.config.output_dir), &label)
            .await
            .with_context(|| format!("创建试卷目录失败: {}", label))?;
        info!("[试卷 {}] 📁 输出目录: {}", exam_index, dataset.exam_dir().display());

        let mut assembler = RecordAssembler::new(self.driver, self.config, dataset, exam_index);
        let outcome = ExamProcessor::new(self.driver, self.config)
            .run(&mut assembler, row_index)
            .await;

        log_exam_complete(exam_index, &outcome);
        Ok(Some(outcome))
    }
}

/// 直接打开列表地址并等待行出现
pub(crate) async fn navigate_to_listing<D: PageDriver>(driver: &D, config: &Config) -> bool {
    if let Err(e) = driver.navigate(&config.listing_url).await {
        error!("❌ 打开试卷列表失败: {}", e);
        return false;
    }
    let rows = Locator::parse(&config.selectors.listing_rows);
    wait_visible(driver, &rows, WaitPolicy::element(config))
        .await
        .is_some()
}

/// 由列表行文本生成试卷名：`Exam_<序号>_<第一列>`
pub fn exam_label(exam_index: usize, row_text: &str) -> String {
    match row_text
        .split(['\t', '\n'])
        .map(str::trim)
        .find(|cell| !cell.is_empty())
    {
        Some(first) => format!("Exam_{}_{}", exam_index, first),
        None => format!("Exam_{}", exam_index),
    }
}

fn log_exam_start(exam_index: usize, label: &str) {
    info!("\n{}", "=".repeat(60));
    info!("[试卷 {}] 📄 开始处理: {}", exam_index, label);
    info!("{}", "=".repeat(60));
}

fn log_exam_complete(exam_index: usize, outcome: &ExamOutcome) {
    info!("\n{}", "─".repeat(60));
    info!(
        "[试卷 {}] ✓ 完成: 保存 {} 道题 ({})",
        exam_index, outcome.questions, outcome.exit
    );
    info!("{}", "─".repeat(60));
}
