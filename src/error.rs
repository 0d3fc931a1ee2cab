use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 采集过程中的错误类型
///
/// 只覆盖有明确边界的失败：浏览器、等待、持久化、配置。
/// 流程层统一用 `anyhow::Result` 携带上下文。
#[derive(Debug, Error)]
pub enum HarvestError {
    /// 浏览器协议调用失败
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// 脚本执行返回了无法识别的结果
    #[error("执行脚本失败: {0}")]
    Script(String),

    /// 等待条件超时
    #[error("等待 {what} 超时 ({timeout:?})")]
    Timeout { what: String, timeout: Duration },

    /// 必需的页面元素不存在
    #[error("元素不存在: {0}")]
    ElementNotFound(String),

    /// 文件读写失败
    #[error("文件错误 ({path}): {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化失败
    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML 配置解析失败
    #[error("TOML 解析失败: {0}")]
    Toml(#[from] toml::de::Error),

    /// 配置值非法
    #[error("配置错误: {0}")]
    Config(String),
}

impl HarvestError {
    /// 创建文件错误
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建超时错误
    pub fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        HarvestError::Timeout {
            what: what.into(),
            timeout,
        }
    }
}

/// 采集结果类型
pub type HarvestResult<T> = Result<T, HarvestError>;
