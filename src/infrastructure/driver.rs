//! 浏览器能力接口 - 基础设施层
//!
//! 上层只通过 `PageDriver` 操作页面，不直接接触 chromiumoxide。

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::HarvestResult;

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    /// 以 `/` 或 `(` 开头的按 XPath 处理
    pub fn parse(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed.starts_with('/') || trimmed.starts_with('(') {
            Locator::XPath(trimmed.to_string())
        } else {
            Locator::Css(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// 浏览器页面能力
///
/// 职责：
/// - 唯一接触浏览器会话的接口
/// - 不认识题目 / 试卷
/// - 查找不到元素返回 `Ok(None)` / 空列表，不视为错误
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 元素句柄
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> HarvestResult<()>;

    async fn find_one(&self, locator: &Locator) -> HarvestResult<Option<Self::Element>>;

    async fn find_all(&self, locator: &Locator) -> HarvestResult<Vec<Self::Element>>;

    /// 原生点击
    async fn click(&self, element: &Self::Element) -> HarvestResult<()>;

    /// 脚本点击 `element.click()`
    async fn script_click(&self, element: &Self::Element) -> HarvestResult<()>;

    async fn text(&self, element: &Self::Element) -> HarvestResult<String>;

    async fn attribute(&self, element: &Self::Element, name: &str)
        -> HarvestResult<Option<String>>;

    async fn inner_html(&self, element: &Self::Element) -> HarvestResult<String>;

    async fn is_displayed(&self, element: &Self::Element) -> HarvestResult<bool>;

    /// 渲染宽度（CSS 像素）
    async fn rendered_width(&self, element: &Self::Element) -> HarvestResult<f64>;

    /// 元素是否仍挂在文档上
    async fn is_attached(&self, element: &Self::Element) -> HarvestResult<bool>;

    async fn scroll_into_view(&self, element: &Self::Element) -> HarvestResult<()>;

    /// 元素截图写入 PNG 文件
    async fn capture_png(&self, element: &Self::Element, path: &Path) -> HarvestResult<()>;

    /// 发送 Escape 键（关闭弹窗）
    async fn press_escape(&self) -> HarvestResult<()>;

    /// 点击，原生点击失败时退回脚本点击
    async fn activate(&self, element: &Self::Element) -> HarvestResult<()> {
        match self.click(element).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("原生点击失败，改用脚本点击: {}", e);
                self.script_click(element).await
            }
        }
    }
}
