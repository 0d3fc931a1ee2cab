//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责遍历和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 管理浏览器资源（Browser、CdpDriver）
//! - 等待手动登录
//!
//! ### `listing_processor` - 试卷列表处理器
//! - 遍历列表页上的所有试卷
//! - 单卷出错时强制回到列表，继续下一张
//! - 汇总统计信息
//!
//! ### `exam_processor` - 单张试卷处理器
//! - 逐题翻页的状态机
//! - 重复题干检测
//! - 结束后返回列表
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! listing_processor (处理所有试卷)
//!     ↓
//! exam_processor (处理单张试卷的所有题目)
//!     ↓
//! workflow::RecordAssembler (处理单道题)
//!     ↓
//! services (能力层：metadata / visual / content / explanation)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod app;
pub mod exam_processor;
pub mod listing_processor;

// 重新导出主要类型
pub use app::App;
pub use exam_processor::{ExamOutcome, ExamProcessor, ExamState, ExitReason, PaginationState};
pub use listing_processor::{exam_label, ListingProcessor};
