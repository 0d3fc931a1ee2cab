//! 题干与选项读取 - 业务能力层

use tracing::{debug, warn};

use crate::config::Selectors;
use crate::error::HarvestResult;
use crate::infrastructure::{Locator, PageDriver};
use crate::markup::clean;
use crate::workflow::QuestionCtx;

/// 选项标签，最多 4 个
pub const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 和选项共用按钮样式的界面控件
const CONTROL_CHROME: &[&str] = &["mark for review", "mark", "review", "unmark"];

/// 题干与选项读取服务
pub struct ContentReader {
    stimulus: Locator,
    options: Locator,
}

impl ContentReader {
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            stimulus: Locator::parse(&selectors.question_stimulus),
            options: Locator::parse(&selectors.answer_options),
        }
    }

    /// 材料 + 题干；读取失败时退回题干原文
    pub async fn question_text<D: PageDriver>(
        &self,
        driver: &D,
        stem: &D::Element,
        ctx: &QuestionCtx,
    ) -> String {
        match self.read_cleaned(driver, stem).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{} ⚠️ 读取材料失败，使用题干原文: {}", ctx, e);
                driver.text(stem).await.unwrap_or_default()
            }
        }
    }

    async fn read_cleaned<D: PageDriver>(&self, driver: &D, stem: &D::Element) -> HarvestResult<String> {
        let stem_text = clean(&driver.inner_html(stem).await?);
        let stimulus_text = match driver.find_one(&self.stimulus).await? {
            Some(stimulus) => clean(&driver.inner_html(&stimulus).await?),
            None => String::new(),
        };
        Ok(merge_question_text(&stimulus_text, &stem_text))
    }

    /// 按文档顺序取至多 4 个选项，统一加 "A) " 这样的前缀
    pub async fn options<D: PageDriver>(&self, driver: &D, ctx: &QuestionCtx) -> Vec<String> {
        let candidates = match driver.find_all(&self.options).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("{} ⚠️ 查找选项失败: {}", ctx, e);
                return Vec::new();
            }
        };

        let mut options = Vec::new();
        for element in candidates {
            if options.len() == OPTION_LABELS.len() {
                break;
            }
            let text = match driver.inner_html(&element).await {
                Ok(html) => clean(&html),
                Err(e) => {
                    debug!("{} 读取选项失败: {}", ctx, e);
                    continue;
                }
            };
            if text.is_empty() || is_control_chrome(&text) {
                continue;
            }
            options.push(format_option(OPTION_LABELS[options.len()], &text));
        }
        options
    }
}

/// 题干已包含在材料里时只保留材料
pub fn merge_question_text(stimulus: &str, stem: &str) -> String {
    if stimulus.contains(stem) {
        stimulus.to_string()
    } else {
        format!("{} {}", stimulus, stem).trim().to_string()
    }
}

pub fn format_option(label: char, text: &str) -> String {
    format!("{}) {}", label, strip_label(label, text))
}

/// 去掉源文本里重复的同名标签："A) x"、"(A) x"、"A. x"、"A x"
fn strip_label(label: char, text: &str) -> &str {
    let rest = text.strip_prefix('(').unwrap_or(text);
    let Some(rest) = rest.strip_prefix(label) else {
        return text;
    };
    let rest = rest
        .strip_prefix(|c: char| matches!(c, ')' | '.' | ':'))
        .unwrap_or(rest);
    if !rest.starts_with(char::is_whitespace) {
        return text;
    }
    match rest.trim_start() {
        "" => text,
        stripped => stripped,
    }
}

fn is_control_chrome(text: &str) -> bool {
    let normalized = text
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    CONTROL_CHROME.contains(&normalized.as_str())
}
