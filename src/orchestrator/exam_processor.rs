//! 单张试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 逐题翻页的状态机：
//!
//! ```text
//! AwaitQuestion → QuestionReady → Advancing → AwaitQuestion …
//!       │               │             │
//!       └───────────────┴─────────────┴──→ ExamDone
//! ```
//!
//! 翻页后页面可能仍显示上一题，题干和材料都和上次相同时只暂停重试，不计数也不读取。
//! 只比题干不够：相邻两题常用同一句题干，只是材料不同。
//! 找不到"下一题"按钮即视为本卷结束。

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::{wait_present, wait_stale, wait_visible, Locator, PageDriver, WaitPolicy};
use crate::orchestrator::listing_processor::navigate_to_listing;
use crate::workflow::RecordAssembler;

/// 翻页状态，每张试卷重新开始，不落盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// 当前题号，从 1 开始
    pub question_index: usize,
    /// 上一次读取的题干文本
    pub last_seen_stem_text: String,
    /// 上一次读取的材料文本，没有材料时为空
    pub last_seen_stimulus_text: String,
    /// 试卷在列表中的行号（从 0 开始）
    pub exam_row_index: usize,
}

impl PaginationState {
    pub fn new(exam_row_index: usize) -> Self {
        Self {
            question_index: 1,
            last_seen_stem_text: String::new(),
            last_seen_stimulus_text: String::new(),
            exam_row_index,
        }
    }

    /// 页面是否仍是上一题：题干非空，且题干和材料都没变
    pub fn is_repeat(&self, stem_text: &str, stimulus_text: &str) -> bool {
        !stem_text.is_empty()
            && stem_text == self.last_seen_stem_text
            && stimulus_text == self.last_seen_stimulus_text
    }
}

/// 状态机状态，携带当前题干元素
#[derive(Debug)]
pub enum ExamState<E> {
    AwaitQuestion,
    QuestionReady(E),
    Advancing(E),
    ExamDone(ExitReason),
}

/// 试卷结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 等待题干超时
    QuestionTimeout,
    /// 没有"下一题"按钮
    NoNextControl,
    /// 记录保存失败
    ExtractionFailed,
    /// 点击"下一题"失败
    NavigationFailed,
    /// 题干和材料一直停留在上一题
    StuckOnDuplicate,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitReason::QuestionTimeout => "等待题目超时",
            ExitReason::NoNextControl => "已到最后一题",
            ExitReason::ExtractionFailed => "记录保存失败",
            ExitReason::NavigationFailed => "翻页失败",
            ExitReason::StuckOnDuplicate => "页面停留在重复题目",
        };
        f.write_str(text)
    }
}

/// 单张试卷的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamOutcome {
    pub questions: usize,
    pub exit: ExitReason,
}

/// 单张试卷处理器
pub struct ExamProcessor<'a, D: PageDriver> {
    driver: &'a D,
    config: &'a Config,
    stem: Locator,
    stimulus: Locator,
    next: Locator,
    back: Locator,
    listing_rows: Locator,
    element_wait: WaitPolicy,
    stale_wait: WaitPolicy,
}

impl<'a, D: PageDriver> ExamProcessor<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        let selectors = &config.selectors;
        Self {
            driver,
            config,
            stem: Locator::parse(&selectors.question_stem),
            stimulus: Locator::parse(&selectors.question_stimulus),
            next: Locator::parse(&selectors.next_button),
            back: Locator::parse(&selectors.back_to_listing),
            listing_rows: Locator::parse(&selectors.listing_rows),
            element_wait: WaitPolicy::element(config),
            stale_wait: WaitPolicy::stale(config),
        }
    }

    /// 处理当前打开的试卷，结束后回到列表页
    pub async fn run(&self, assembler: &mut RecordAssembler<'_, D>, exam_row_index: usize) -> ExamOutcome {
        let exam_index = exam_row_index + 1;
        let mut pagination = PaginationState::new(exam_row_index);
        let mut duplicate_polls = 0usize;
        let mut state = ExamState::AwaitQuestion;

        let exit = loop {
            state = match state {
                ExamState::AwaitQuestion => {
                    match wait_present(self.driver, &self.stem, self.element_wait).await {
                        Some(stem) => ExamState::QuestionReady(stem),
                        None => ExamState::ExamDone(ExitReason::QuestionTimeout),
                    }
                }

                ExamState::QuestionReady(stem) => {
                    let stem_text = self.driver.text(&stem).await.unwrap_or_default();
                    let stem_text = stem_text.trim();
                    let stimulus_text = self.stimulus_text().await;

                    if pagination.is_repeat(stem_text, &stimulus_text) {
                        duplicate_polls += 1;
                        if duplicate_polls > self.config.max_duplicate_polls {
                            warn!(
                                "[试卷 {}] ⚠️ 题目 {} 连续 {} 次与上一题相同，结束本卷",
                                exam_index, pagination.question_index, duplicate_polls
                            );
                            ExamState::ExamDone(ExitReason::StuckOnDuplicate)
                        } else {
                            debug!("[试卷 {}] 页面仍显示上一题，稍后重试", exam_index);
                            sleep(self.config.duplicate_pause()).await;
                            ExamState::AwaitQuestion
                        }
                    } else {
                        duplicate_polls = 0;
                        pagination.last_seen_stem_text = stem_text.to_string();
                        pagination.last_seen_stimulus_text = stimulus_text;

                        match assembler.assemble(pagination.question_index, &stem).await {
                            Ok(_) => ExamState::Advancing(stem),
                            Err(e) => {
                                error!("[试卷 {}] ❌ 题目 {} 处理失败: {:#}", exam_index, pagination.question_index, e);
                                ExamState::ExamDone(ExitReason::ExtractionFailed)
                            }
                        }
                    }
                }

                ExamState::Advancing(stem) => self.advance(&mut pagination, stem).await,

                ExamState::ExamDone(reason) => break reason,
            };
        };

        info!("[试卷 {}] 🏁 本卷结束: {}", exam_index, exit);
        self.return_to_listing(exam_index).await;

        ExamOutcome {
            questions: assembler.dataset().len(),
            exit,
        }
    }

    /// 材料区文本，没有材料或读取失败时为空
    async fn stimulus_text(&self) -> String {
        match self.driver.find_one(&self.stimulus).await {
            Ok(Some(stimulus)) => self
                .driver
                .text(&stimulus)
                .await
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    async fn advance(&self, pagination: &mut PaginationState, stem: D::Element) -> ExamState<D::Element> {
        let exam_index = pagination.exam_row_index + 1;

        let next = match self.driver.find_one(&self.next).await {
            Ok(Some(next)) => next,
            Ok(None) => return ExamState::ExamDone(ExitReason::NoNextControl),
            Err(e) => {
                warn!("[试卷 {}] ⚠️ 查找下一题按钮失败: {}", exam_index, e);
                return ExamState::ExamDone(ExitReason::NoNextControl);
            }
        };

        if let Err(e) = self.driver.activate(&next).await {
            error!("[试卷 {}] ❌ 点击下一题失败: {}", exam_index, e);
            return ExamState::ExamDone(ExitReason::NavigationFailed);
        }
        pagination.question_index += 1;

        // 超时不算失败，重复题干检测会兜底
        if !wait_stale(self.driver, &stem, self.stale_wait).await {
            debug!("[试卷 {}] 旧题干未失效，继续等待新题目", exam_index);
        }
        ExamState::AwaitQuestion
    }

    /// 优先点"返回列表"，不行再直接打开列表地址
    async fn return_to_listing(&self, exam_index: usize) -> bool {
        match self.driver.find_one(&self.back).await {
            Ok(Some(back)) => match self.driver.activate(&back).await {
                Ok(()) => {
                    if wait_visible(self.driver, &self.listing_rows, self.element_wait)
                        .await
                        .is_some()
                    {
                        debug!("[试卷 {}] 已通过返回按钮回到列表", exam_index);
                        return true;
                    }
                    warn!("[试卷 {}] ⚠️ 点击返回后列表未出现", exam_index);
                }
                Err(e) => warn!("[试卷 {}] ⚠️ 点击返回按钮失败: {}", exam_index, e),
            },
            Ok(None) => debug!("[试卷 {}] 没有返回按钮", exam_index),
            Err(e) => warn!("[试卷 {}] ⚠️ 查找返回按钮失败: {}", exam_index, e),
        }

        navigate_to_listing(self.driver, self.config).await
    }
}
