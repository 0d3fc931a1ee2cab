//! 题目信息读取 - 业务能力层
//!
//! 信息面板可有可无，缺什么就留空，从不报错

use tracing::{debug, warn};

use crate::config::Selectors;
use crate::infrastructure::{Locator, PageDriver};
use crate::workflow::QuestionCtx;

/// 题目信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionMeta {
    pub domain: String,
    pub skill: String,
    pub difficulty: String,
}

impl QuestionMeta {
    /// "领域: 技能"，任一为空时去掉多余的分隔符
    pub fn question_type(&self) -> String {
        format!("{}: {}", self.domain.trim(), self.skill.trim())
            .trim_matches(|c: char| c == ':' || c.is_whitespace())
            .to_string()
    }
}

/// 题目信息读取服务
pub struct MetadataReader {
    panel: Locator,
    domain: Locator,
    skill: Locator,
    difficulty: Locator,
}

impl MetadataReader {
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            panel: Locator::parse(&selectors.info_panel),
            domain: Locator::parse(&selectors.meta_domain),
            skill: Locator::parse(&selectors.meta_skill),
            difficulty: Locator::parse(&selectors.meta_difficulty),
        }
    }

    pub async fn read<D: PageDriver>(&self, driver: &D, ctx: &QuestionCtx) -> QuestionMeta {
        match driver.find_one(&self.panel).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("{} 没有信息面板", ctx);
                return QuestionMeta::default();
            }
            Err(e) => {
                warn!("{} ⚠️ 读取信息面板失败: {}", ctx, e);
                return QuestionMeta::default();
            }
        }

        QuestionMeta {
            domain: read_field(driver, &self.domain, false).await,
            skill: read_field(driver, &self.skill, false).await,
            // 难度常以图形展示，文字为空时取 aria-label
            difficulty: read_field(driver, &self.difficulty, true).await,
        }
    }
}

async fn read_field<D: PageDriver>(driver: &D, locator: &Locator, aria_fallback: bool) -> String {
    let element = match driver.find_one(locator).await {
        Ok(Some(element)) => element,
        _ => return String::new(),
    };

    let text = squash(&driver.text(&element).await.unwrap_or_default());
    if !text.is_empty() || !aria_fallback {
        return text;
    }

    driver
        .attribute(&element, "aria-label")
        .await
        .ok()
        .flatten()
        .map(|label| squash(&label))
        .unwrap_or_default()
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
