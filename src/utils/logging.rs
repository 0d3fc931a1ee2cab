/// 日志工具模块
///
/// 提供日志初始化、运行日志文件和输出格式化的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::RunStats;

/// 安装终端日志
///
/// 优先使用 `RUST_LOG`；未设置时按 `verbose` 选择级别。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,exam_harvest=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题目采集日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行，带时间戳
pub fn append_run_log(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "{} {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目采集模式");
    let config_path = Config::config_path();
    if config_path.exists() {
        info!("📄 配置文件: {}", config_path.display());
    } else {
        info!("📄 未找到配置文件 {}，使用默认配置", config_path.display());
    }
    if config.launch_browser {
        info!("🌐 浏览器: 启动新窗口");
    } else {
        info!("🌐 浏览器: 连接调试端口 {}", config.browser_debug_port);
    }
    info!("📋 试卷列表: {}", config.listing_url);
    info!("📁 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录试卷列表加载信息
///
/// # 参数
/// - `total`: 试卷总数
pub fn log_listing_loaded(total: usize) {
    info!("✓ 列表上共有 {} 张试卷", total);
    info!("💡 逐张处理，每道题保存后立即落盘\n");
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("📝 题目: {}", stats.questions);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
