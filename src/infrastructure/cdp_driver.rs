//! Chrome DevTools 实现 - 基础设施层
//!
//! 持有唯一的 page 资源，把 `PageDriver` 能力翻译成 CDP 调用

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Element, Page};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{HarvestError, HarvestResult};
use crate::infrastructure::driver::{Locator, PageDriver};

/// CDP 驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露查找 / 点击 / 读取 / 截图能力
/// - 不认识题目 / 试卷
pub struct CdpDriver {
    page: Page,
}

impl CdpDriver {
    /// 创建新的驱动
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 在页面上执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> HarvestResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 以元素为 `this` 调用 JS 函数
    async fn call_on(&self, element: &Element, function: &str) -> HarvestResult<JsonValue> {
        let returns = element.call_js_fn(function, false).await?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> HarvestResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn find_one(&self, locator: &Locator) -> HarvestResult<Option<Element>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> HarvestResult<Vec<Element>> {
        let found = match locator {
            Locator::Css(css) => self.page.find_elements(css.as_str()).await,
            Locator::XPath(xpath) => self.page.find_xpaths(xpath.as_str()).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            // CDP 对"没有匹配"也可能返回错误，统一视为空
            Err(e) => {
                debug!("查找 {} 无结果: {}", locator, e);
                Ok(Vec::new())
            }
        }
    }

    async fn click(&self, element: &Element) -> HarvestResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn script_click(&self, element: &Element) -> HarvestResult<()> {
        self.call_on(element, "function() { this.click(); }").await?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> HarvestResult<String> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> HarvestResult<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn inner_html(&self, element: &Element) -> HarvestResult<String> {
        Ok(element.inner_html().await?.unwrap_or_default())
    }

    async fn is_displayed(&self, element: &Element) -> HarvestResult<bool> {
        let value = self
            .call_on(
                element,
                r#"function() {
                    const style = window.getComputedStyle(this);
                    if (style.display === 'none' || style.visibility === 'hidden') return false;
                    return this.getClientRects().length > 0;
                }"#,
            )
            .await?;
        value
            .as_bool()
            .ok_or_else(|| HarvestError::Script(format!("可见性检查返回了非布尔值: {}", value)))
    }

    async fn rendered_width(&self, element: &Element) -> HarvestResult<f64> {
        let value = self
            .call_on(element, "function() { return this.getBoundingClientRect().width; }")
            .await?;
        value
            .as_f64()
            .ok_or_else(|| HarvestError::Script(format!("宽度检查返回了非数值: {}", value)))
    }

    async fn is_attached(&self, element: &Element) -> HarvestResult<bool> {
        // 节点被回收后调用会直接失败，同样视为已脱离
        match self.call_on(element, "function() { return this.isConnected; }").await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(_) => Ok(false),
        }
    }

    async fn scroll_into_view(&self, element: &Element) -> HarvestResult<()> {
        self.call_on(
            element,
            "function() { this.scrollIntoView({block: 'center'}); }",
        )
        .await?;
        Ok(())
    }

    async fn capture_png(&self, element: &Element, path: &Path) -> HarvestResult<()> {
        let bytes = element.screenshot(CaptureScreenshotFormat::Png).await?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| HarvestError::file(path, e))?;
        Ok(())
    }

    async fn press_escape(&self) -> HarvestResult<()> {
        let body = self.page.find_element("body").await?;
        if body.press_key("Escape").await.is_err() {
            self.eval(
                "document.dispatchEvent(new KeyboardEvent('keydown', {key: 'Escape', bubbles: true}))",
            )
            .await?;
        }
        Ok(())
    }
}
