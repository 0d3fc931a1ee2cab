//! 解析读取 - 业务能力层
//!
//! 打开解析弹窗 → 读取 → 关闭。失败时写入固定的错误占位串，不向上传播。

use tracing::{debug, warn};

use crate::config::Config;
use crate::infrastructure::{wait_visible, Locator, PageDriver, WaitPolicy};
use crate::markup::clean;
use crate::workflow::QuestionCtx;

/// 页面上没有解析入口
pub const EXPLANATION_NOT_FOUND: &str = "Error: Explanation UI not found.";
/// 有入口但弹窗没出现或读不到
pub const EXPLANATION_FAILED: &str = "Error: Failed to extract explanation.";

/// 解析读取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationOutcome {
    Text(String),
    UiNotFound,
    Failed(String),
}

impl ExplanationOutcome {
    /// 写入记录的字段值
    pub fn into_field(self) -> String {
        match self {
            ExplanationOutcome::Text(text) => text,
            ExplanationOutcome::UiNotFound => EXPLANATION_NOT_FOUND.to_string(),
            ExplanationOutcome::Failed(_) => EXPLANATION_FAILED.to_string(),
        }
    }
}

/// 解析读取服务
pub struct ExplanationReader {
    button: Locator,
    dialog: Locator,
    policy: WaitPolicy,
}

impl ExplanationReader {
    pub fn new(config: &Config) -> Self {
        Self {
            button: Locator::parse(&config.selectors.explanation_button),
            dialog: Locator::parse(&config.selectors.explanation_dialog),
            policy: WaitPolicy::element(config),
        }
    }

    pub async fn read<D: PageDriver>(&self, driver: &D, ctx: &QuestionCtx) -> String {
        let outcome = self.open_and_read(driver).await;

        // 无论成功与否都关闭弹窗
        if let Err(e) = driver.press_escape().await {
            debug!("{} 关闭解析弹窗失败: {}", ctx, e);
        }

        match &outcome {
            ExplanationOutcome::Text(_) => debug!("{} ✓ 解析读取成功", ctx),
            ExplanationOutcome::UiNotFound => warn!("{} ⚠️ 未找到解析入口", ctx),
            ExplanationOutcome::Failed(reason) => warn!("{} ⚠️ 解析读取失败: {}", ctx, reason),
        }
        outcome.into_field()
    }

    async fn open_and_read<D: PageDriver>(&self, driver: &D) -> ExplanationOutcome {
        let buttons = match driver.find_all(&self.button).await {
            Ok(buttons) => buttons,
            Err(e) => return ExplanationOutcome::Failed(e.to_string()),
        };
        // 最后一个匹配通常才是真正的按钮，前面的可能是正文里的同名文字
        let Some(button) = buttons.last() else {
            return ExplanationOutcome::UiNotFound;
        };

        if let Err(e) = driver.script_click(button).await {
            return ExplanationOutcome::Failed(e.to_string());
        }

        let Some(dialog) = wait_visible(driver, &self.dialog, self.policy).await else {
            return ExplanationOutcome::Failed("解析弹窗未出现".to_string());
        };

        match driver.inner_html(&dialog).await {
            Ok(html) => ExplanationOutcome::Text(clean(&html)),
            Err(e) => ExplanationOutcome::Failed(e.to_string()),
        }
    }
}
