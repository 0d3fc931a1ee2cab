//! 应用入口 - 编排层
//!
//! 唯一持有 Browser 的模块：初始化日志文件、启动或连接浏览器、
//! 等待手动登录，然后交给 `ListingProcessor`。

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::CdpDriver;
use crate::orchestrator::listing_processor::ListingProcessor;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    driver: CdpDriver,
}

impl App {
    /// 初始化应用，浏览器停在登录页
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let (browser, page) = if config.launch_browser {
            browser::launch_browser(&config, &config.login_url).await?
        } else {
            browser::connect_to_browser_and_page(config.browser_debug_port, &config.login_url).await?
        };

        Ok(Self {
            config,
            _browser: browser,
            driver: CdpDriver::new(page),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        wait_for_manual_login().await?;

        let stats = ListingProcessor::new(&self.driver, &self.config).run().await?;

        print_final_stats(&stats, &self.config);
        Ok(())
    }
}

/// 登录需要人工完成，按回车后继续
async fn wait_for_manual_login() -> Result<()> {
    info!("🔐 请在浏览器中完成登录，然后回到这里按回车继续...");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("读取标准输入失败")?;
    info!("✓ 继续执行");
    Ok(())
}
