use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, HarvestResult};

/// 默认配置文件名（可用 HARVEST_CONFIG 覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 登录页地址（手动登录）
    pub login_url: String,
    /// 试卷列表页地址
    pub listing_url: String,
    /// 输出根目录，每张试卷一个子目录
    pub output_dir: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// true: 启动新浏览器；false: 连接已有浏览器的调试端口
    pub launch_browser: bool,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 浏览器可执行文件路径，为空时由 chromiumoxide 自动查找
    pub chrome_executable: Option<String>,
    /// 等待元素出现的超时（毫秒）
    pub wait_timeout_ms: u64,
    /// 等待旧题干失效的超时（毫秒）
    pub stale_timeout_ms: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 读到重复题干后的暂停（毫秒）
    pub duplicate_pause_ms: u64,
    /// 截图、点击前的稳定等待（毫秒）
    pub settle_pause_ms: u64,
    /// 同一题干连续重复读取的上限，超过视为本卷结束
    pub max_duplicate_polls: usize,
    /// 图片最小渲染宽度，过滤装饰性元素
    pub min_visual_width: f64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 页面选择器
    pub selectors: Selectors,
}

/// 页面选择器
///
/// 以 `/` 或 `(` 开头的视为 XPath，其余为 CSS。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub listing_rows: String,
    pub question_stem: String,
    pub question_stimulus: String,
    pub stimulus_visuals: String,
    pub answer_options: String,
    pub next_button: String,
    pub back_to_listing: String,
    pub explanation_button: String,
    pub explanation_dialog: String,
    pub info_panel: String,
    pub meta_domain: String,
    pub meta_skill: String,
    pub meta_difficulty: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            listing_rows: "tbody tr".to_string(),
            question_stem: ".question-stem".to_string(),
            question_stimulus: ".question-stimulus".to_string(),
            stimulus_visuals: ".question-stimulus img, .question-stimulus svg, .question-stimulus canvas".to_string(),
            answer_options: "div[role='button']".to_string(),
            next_button: "//a[contains(text(),'Next')]".to_string(),
            back_to_listing: "//a[contains(text(),'Back to Practice Tests')]".to_string(),
            explanation_button: "//*[contains(text(),'Explanation')]".to_string(),
            explanation_dialog: "//div[@role='dialog']".to_string(),
            info_panel: ".question-info".to_string(),
            meta_domain: ".question-info .domain".to_string(),
            meta_skill: ".question-info .skill".to_string(),
            meta_difficulty: ".question-info .difficulty".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: "https://example.com/login".to_string(),
            listing_url: "https://example.com/practice-tests".to_string(),
            output_dir: "SAT_Question_Corpus".to_string(),
            output_log_file: "harvest_log.txt".to_string(),
            launch_browser: true,
            browser_debug_port: 9222,
            chrome_executable: None,
            wait_timeout_ms: 10_000,
            stale_timeout_ms: 10_000,
            poll_interval_ms: 200,
            duplicate_pause_ms: 500,
            settle_pause_ms: 300,
            max_duplicate_polls: 20,
            min_visual_width: 50.0,
            verbose_logging: false,
            selectors: Selectors::default(),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 配置文件路径：`HARVEST_CONFIG`，否则 `harvest.toml`
    pub fn config_path() -> PathBuf {
        std::env::var("HARVEST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// 默认值 → 配置文件（若存在）→ 环境变量
    ///
    /// 在日志初始化之前调用，本身不打日志；读取了哪个文件由 `log_startup` 报告。
    pub fn load() -> HarvestResult<Self> {
        let path = Self::config_path();
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取
    pub fn from_file(path: &Path) -> HarvestResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HarvestError::file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 文本解析，缺省字段取默认值
    pub fn from_toml_str(content: &str) -> HarvestResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        let default = self;
        Self {
            login_url: std::env::var("LOGIN_URL").unwrap_or(default.login_url),
            listing_url: std::env::var("LISTING_URL").unwrap_or(default.listing_url),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            launch_browser: std::env::var("LAUNCH_BROWSER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.launch_browser),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            wait_timeout_ms: std::env::var("WAIT_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.wait_timeout_ms),
            stale_timeout_ms: std::env::var("STALE_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.stale_timeout_ms),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            duplicate_pause_ms: std::env::var("DUPLICATE_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.duplicate_pause_ms),
            settle_pause_ms: std::env::var("SETTLE_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_pause_ms),
            max_duplicate_polls: std::env::var("MAX_DUPLICATE_POLLS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_duplicate_polls),
            min_visual_width: std::env::var("MIN_VISUAL_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_visual_width),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            selectors: default.selectors,
        }
    }

    /// 检查时间参数
    pub fn validate(&self) -> HarvestResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(HarvestError::Config("poll_interval_ms 必须大于 0".to_string()));
        }
        if self.wait_timeout_ms == 0 || self.stale_timeout_ms == 0 {
            return Err(HarvestError::Config("超时时间必须大于 0".to_string()));
        }
        if self.listing_url.trim().is_empty() {
            return Err(HarvestError::Config("listing_url 不能为空".to_string()));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn stale_timeout(&self) -> Duration {
        Duration::from_millis(self.stale_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn duplicate_pause(&self) -> Duration {
        Duration::from_millis(self.duplicate_pause_ms)
    }

    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }
}
