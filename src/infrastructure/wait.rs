//! 有界等待 - 基础设施层
//!
//! 所有等待都有超时；超时返回 `None` / `false`，由调用方走兜底分支。

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::Config;
use crate::infrastructure::driver::{Locator, PageDriver};

/// 超时 + 轮询间隔
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }

    /// 等待元素出现
    pub fn element(config: &Config) -> Self {
        Self::new(config.wait_timeout(), config.poll_interval())
    }

    /// 等待旧元素失效
    pub fn stale(config: &Config) -> Self {
        Self::new(config.stale_timeout(), config.poll_interval())
    }
}

/// 反复探测直到返回 `Some` 或超时
///
/// 至少探测一次，超时为 0 时也一样。
pub async fn wait_for<T, F, Fut>(policy: WaitPolicy, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + policy.timeout;
    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(policy.poll).await;
    }
}

/// 等待元素存在于文档中
pub async fn wait_present<D: PageDriver>(
    driver: &D,
    locator: &Locator,
    policy: WaitPolicy,
) -> Option<D::Element> {
    wait_for(policy, || async move { driver.find_one(locator).await.ok().flatten() }).await
}

/// 等待第一个可见的匹配元素
pub async fn wait_visible<D: PageDriver>(
    driver: &D,
    locator: &Locator,
    policy: WaitPolicy,
) -> Option<D::Element> {
    wait_for(policy, || async move {
        let candidates = driver.find_all(locator).await.ok()?;
        for element in candidates {
            if driver.is_displayed(&element).await.unwrap_or(false) {
                return Some(element);
            }
        }
        None
    })
    .await
}

/// 等待元素脱离文档；返回是否在超时前脱离
pub async fn wait_stale<D: PageDriver>(driver: &D, element: &D::Element, policy: WaitPolicy) -> bool {
    wait_for(policy, || async move {
        match driver.is_attached(element).await {
            Ok(true) => None,
            _ => Some(()),
        }
    })
    .await
    .is_some()
}
