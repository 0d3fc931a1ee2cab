//! # Exam Harvest
//!
//! 从浏览器渲染的练习题页面采集题目，逐卷导出为 JSON + PNG
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，数据只向下流动：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 页面能力接口，测试中可替换为内存实现
//! - `CdpDriver` - 基于 chromiumoxide 的实现
//! - `wait` - 有界轮询等待
//!
//! ### ② 文本处理层（Markup）
//! - `markup/math` - MathML → 线性记法（`\frac{a}{b}`、`x^2`、`sqrt(x)`）
//! - `markup/cleanup` - 渲染 HTML → 干净文本
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能读什么"，只处理当前页面上的一道题
//! - `MetadataReader` / `VisualCapture` / `ContentReader` / `ExplanationReader`
//!
//! ### ④ 流程层（Workflow）
//! - `QuestionCtx` - 上下文封装（试卷序号 + 题号）
//! - `RecordAssembler` - 一道题的完整读取流程，追加记录并落盘
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/listing_processor` - 遍历试卷列表，按卷隔离错误
//! - `orchestrator/exam_processor` - 单张试卷的翻页状态机
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod markup;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_browser};
pub use config::{Config, Selectors};
pub use error::{HarvestError, HarvestResult};
pub use infrastructure::{CdpDriver, Locator, PageDriver};
pub use models::{ExamDataset, QuestionRecord, RunStats};
pub use orchestrator::{App, ExamOutcome, ExamProcessor, ExitReason, ListingProcessor};
pub use workflow::{QuestionCtx, RecordAssembler};
